use ratatui::crossterm::event::KeyEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    GoToPage(usize),
    Sort,
    Search,
    CycleFilter,
    ClearFilter,
    ClearAllFilters,
    NextDataset,
    Enter,
    Exit,
    Help,
    Resize(usize, usize),
    RawKey(KeyEvent),
}

pub const HELP_TEXT: &str = "\
q          quit
j/k ↑/↓    select row
h/l ←/→    select column
n/p        next / previous page
g/G        first / last page
1-9        jump to page
s          sort by selected column (asc, desc, off)
/          search
f          next filter value for selected column
F          reset filter of selected column
x          reset all filters
Enter      copy selected row to clipboard
Tab        next dataset
?          this help
Esc        close popup";
