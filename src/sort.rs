use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Descending is the ascending ordering reversed, not a comparator of its own.
    pub fn apply(self, ascending: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ascending,
            SortDirection::Descending => ascending.reverse(),
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }
    }
}

/// Sort state of a view, advanced by clicking column headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SortState {
    #[default]
    Unsorted,
    Ascending(String),
    Descending(String),
}

impl SortState {
    /// Same column: ascending -> descending -> unsorted.
    /// Another column always starts ascending.
    pub fn click(&self, column: &str) -> SortState {
        match self {
            SortState::Ascending(c) if c == column => SortState::Descending(c.clone()),
            SortState::Descending(c) if c == column => SortState::Unsorted,
            _ => SortState::Ascending(column.to_string()),
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            SortState::Unsorted => None,
            SortState::Ascending(c) | SortState::Descending(c) => Some(c),
        }
    }

    pub fn direction(&self) -> Option<SortDirection> {
        match self {
            SortState::Unsorted => None,
            SortState::Ascending(_) => Some(SortDirection::Ascending),
            SortState::Descending(_) => Some(SortDirection::Descending),
        }
    }

    /// Direction for `column`, if it is the sorted one.
    pub fn direction_of(&self, column: &str) -> Option<SortDirection> {
        if self.column() == Some(column) {
            self.direction()
        } else {
            None
        }
    }
}
