use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use arboard::Clipboard;
use tracing::{debug, info, trace, warn};

use rosterview::column::ColumnDescriptor;
use rosterview::datasets::Dataset;
use rosterview::domain::{TVConfig, TVError};
use rosterview::loader::LoadedTable;
use rosterview::pipeline::FilterSelection;
use rosterview::record::Record;
use rosterview::render::RenderedView;
use rosterview::store::{SchoolStore, Session};
use rosterview::view::TableView;

use crate::inputter::{InputResult, Inputter};
use crate::message::{HELP_TEXT, Message};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    SEARCH,
    POPUP,
}

/// Where the records of the current view come from.
enum Source {
    Store {
        store: SchoolStore,
        session: Session,
        datasets: Vec<Dataset>,
        current: usize,
    },
    File {
        name: String,
    },
}

type SharedClipboard = Rc<RefCell<Option<Clipboard>>>;

pub struct UIData {
    pub name: String,
    pub view: RenderedView,
    pub selected_row: usize,
    pub selected_column: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub searching: bool,
    pub cmdinput: InputResult,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

pub struct Model {
    config: TVConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    source: Source,
    view: TableView,
    cursor_row: usize,
    cursor_column: usize,
    input: Inputter,
    last_input: InputResult,
    clipboard: SharedClipboard,
    last_copy: Rc<RefCell<Option<String>>>,
    status_message: String,
    last_status_message_update: Instant,
    ui_size: (usize, usize),
    uidata: UIData,
}

impl Model {
    pub fn from_store(
        config: &TVConfig,
        store: SchoolStore,
        session: Session,
        initial: Option<Dataset>,
    ) -> Result<Self, TVError> {
        let datasets = Dataset::visible_for(session.role);
        let current = initial
            .and_then(|d| datasets.iter().position(|&x| x == d))
            .unwrap_or(0);
        let dataset = datasets[current];
        let records = dataset.records(&store, &session);
        let greeting = format!("Welcome {} ({:?})", session.display_name, session.role);
        let source = Source::Store {
            store,
            session,
            datasets,
            current,
        };
        let mut model = Self::init(config, source, records, dataset.columns())?;
        model.set_status_message(greeting);
        Ok(model)
    }

    pub fn from_table(config: &TVConfig, table: LoadedTable) -> Result<Self, TVError> {
        let source = Source::File { name: table.name };
        let mut model = Self::init(config, source, table.records, table.columns)?;
        model.set_status_message("Press ? for help");
        Ok(model)
    }

    fn init(
        config: &TVConfig,
        source: Source,
        records: Vec<Record>,
        columns: Vec<ColumnDescriptor>,
    ) -> Result<Self, TVError> {
        let clipboard: SharedClipboard = Rc::new(RefCell::new(match Clipboard::new() {
            Ok(c) => Some(c),
            Err(e) => {
                warn!("Clipboard unavailable: {e}");
                None
            }
        }));
        let last_copy = Rc::new(RefCell::new(None));
        let view = Self::build_view(config, records, columns, &clipboard, &last_copy)?;

        let mut model = Self {
            config: config.clone(),
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            source,
            view,
            cursor_row: 0,
            cursor_column: 0,
            input: Inputter::default(),
            last_input: InputResult::default(),
            clipboard,
            last_copy,
            status_message: String::new(),
            last_status_message_update: Instant::now(),
            ui_size: (0, 0),
            uidata: UIData::empty(),
        };
        model.update_uidata();
        Ok(model)
    }

    fn build_view(
        config: &TVConfig,
        records: Vec<Record>,
        columns: Vec<ColumnDescriptor>,
        clipboard: &SharedClipboard,
        last_copy: &Rc<RefCell<Option<String>>>,
    ) -> Result<TableView, TVError> {
        let clipboard = Rc::clone(clipboard);
        let last_copy = Rc::clone(last_copy);
        let row_columns = columns.clone();
        let view = TableView::new(Arc::new(records), columns, config.view.clone())?
            .with_row_handler(move |record| {
                let row = record.to_csv_row(&row_columns);
                trace!("Row content: {}", row);
                let outcome = match clipboard.borrow_mut().as_mut() {
                    Some(c) => match c.set_text(row.clone()) {
                        Ok(_) => format!("Copied row: {row}"),
                        Err(e) => {
                            warn!("Error copying to clipboard: {e:?}");
                            format!("Could not copy row: {e}")
                        }
                    },
                    None => format!("Selected row: {row}"),
                };
                *last_copy.borrow_mut() = Some(outcome);
            });
        Ok(view)
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::SEARCH
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    #[cfg(test)]
    pub fn view(&self) -> &TableView {
        &self.view
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), TVError> {
        let Some(msg) = message else {
            return Ok(());
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveDown => self.move_row(1),
                Message::MoveUp => self.move_row(-1),
                Message::MoveLeft => self.cursor_column = self.cursor_column.saturating_sub(1),
                Message::MoveRight => {
                    let last = self.view.columns().len().saturating_sub(1);
                    self.cursor_column = std::cmp::min(self.cursor_column + 1, last);
                }
                Message::NextPage => self.view.next_page(),
                Message::PreviousPage => self.view.previous_page(),
                Message::FirstPage => self.view.first_page(),
                Message::LastPage => self.view.last_page(),
                Message::GoToPage(page) => self.view.go_to_page(page),
                Message::Sort => self.sort_current_column(),
                Message::Search => self.enter_search_mode(),
                Message::CycleFilter => self.cycle_filter(),
                Message::ClearFilter => self.clear_filter(),
                Message::ClearAllFilters => {
                    self.view.clear_filters();
                    self.set_status_message("Filters cleared");
                }
                Message::NextDataset => self.next_dataset()?,
                Message::Enter => self.activate_row(),
                Message::Exit => {
                    if !self.view.state().search_query.is_empty() {
                        self.view.set_search_query("");
                        self.set_status_message("Search cleared");
                    }
                }
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::RawKey(_) => (),
            },
            Modus::SEARCH => match msg {
                Message::RawKey(key) => self.search_input(key),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter | Message::Help => self.close_popup(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                _ => (),
            },
        }
        self.clamp_cursor();
        self.update_uidata();
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn move_row(&mut self, step: isize) {
        self.cursor_row = self.cursor_row.saturating_add_signed(step);
    }

    fn clamp_cursor(&mut self) {
        let rows = self.view.slice().rows.len();
        self.cursor_row = std::cmp::min(self.cursor_row, rows.saturating_sub(1));
        let columns = self.view.columns().len();
        self.cursor_column = std::cmp::min(self.cursor_column, columns.saturating_sub(1));
    }

    fn current_column(&self) -> Option<&ColumnDescriptor> {
        self.view.columns().get(self.cursor_column)
    }

    fn sort_current_column(&mut self) {
        let Some(column) = self.current_column() else {
            return;
        };
        let (key, header, sortable) = (column.key.clone(), column.header.clone(), column.sortable);
        if !sortable {
            self.set_status_message(format!("{header} can not be sorted"));
            return;
        }
        self.view.click_header(&key);
        let message = match self.view.state().sort.direction_of(&key) {
            Some(direction) => format!("Sorted by {header} {}", direction.arrow()),
            None => "Sort off".to_string(),
        };
        self.set_status_message(message);
    }

    fn cycle_filter(&mut self) {
        let Some(column) = self.current_column() else {
            return;
        };
        let (key, header) = (column.key.clone(), column.header.clone());
        let Some(options) = self.view.filter_options(&key) else {
            self.set_status_message(format!("{header} has no filter"));
            return;
        };
        let next = match self.view.filter_selection(&key) {
            FilterSelection::All => options.first().cloned(),
            FilterSelection::Value(current) => options
                .iter()
                .position(|o| *o == current)
                .and_then(|idx| options.get(idx + 1))
                .cloned(),
        };
        let (selection, label) = match next {
            Some(value) => (FilterSelection::Value(value.clone()), value),
            None => (FilterSelection::All, "all".to_string()),
        };
        self.view.set_filter(&key, selection);
        self.set_status_message(format!("{header}: {label}"));
    }

    fn clear_filter(&mut self) {
        let Some(column) = self.current_column() else {
            return;
        };
        let key = column.key.clone();
        self.view.set_filter(&key, FilterSelection::All);
    }

    fn activate_row(&mut self) {
        if self.view.activate_row(self.cursor_row) {
            let outcome = self.last_copy.borrow_mut().take();
            if let Some(outcome) = outcome {
                self.set_status_message(outcome);
            }
        }
    }

    fn next_dataset(&mut self) -> Result<(), TVError> {
        let Source::Store {
            store,
            session,
            datasets,
            current,
        } = &mut self.source
        else {
            return Ok(());
        };
        if datasets.len() < 2 {
            return Ok(());
        }
        *current = (*current + 1) % datasets.len();
        let dataset = datasets[*current];
        let records = dataset.records(store, session);
        info!("Switching to dataset {dataset}");
        self.view = Self::build_view(
            &self.config,
            records,
            dataset.columns(),
            &self.clipboard,
            &self.last_copy,
        )?;
        self.cursor_row = 0;
        self.cursor_column = 0;
        self.set_status_message(format!("{dataset}"));
        Ok(())
    }

    fn enter_search_mode(&mut self) {
        trace!("Entering search mode ...");
        self.previous_modus = self.modus;
        self.modus = Modus::SEARCH;
        self.input.set(&self.view.state().search_query);
        self.last_input = self.input.get();
    }

    fn search_input(&mut self, key: ratatui::crossterm::event::KeyEvent) {
        self.last_input = self.input.read(key);
        if self.last_input.changed {
            self.view.set_search_query(self.last_input.input.clone());
        }
        if self.last_input.finished {
            self.modus = self.previous_modus;
            self.previous_modus = Modus::SEARCH;
            let found = self.view.slice().total_count;
            debug!("Search {:?} found {found} records", self.last_input.input);
            if self.last_input.canceled || self.last_input.input.is_empty() {
                self.set_status_message("Search cleared");
            } else {
                self.set_status_message(format!("Found {found} results"));
            }
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn close_popup(&mut self) {
        trace!("Close popup ...");
        self.modus = self.previous_modus;
        self.previous_modus = Modus::POPUP;
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.ui_size.0, width, self.ui_size.1, height
        );
        self.ui_size = (width, height);
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_status_message_update = self.last_status_message_update;
    }

    fn source_name(&self) -> String {
        match &self.source {
            Source::Store {
                datasets, current, ..
            } => datasets
                .iter()
                .enumerate()
                .map(|(idx, d)| {
                    if idx == *current {
                        format!("[{d}]")
                    } else {
                        d.to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
            Source::File { name } => name.clone(),
        }
    }

    fn update_uidata(&mut self) {
        self.uidata = UIData {
            name: self.source_name(),
            view: self.view.render(),
            selected_row: self.cursor_row,
            selected_column: self.cursor_column,
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            searching: self.modus == Modus::SEARCH,
            cmdinput: self.last_input.clone(),
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        }
    }
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            view: RenderedView {
                search: rosterview::render::SearchBox {
                    placeholder: String::new(),
                    query: String::new(),
                },
                filters: Vec::new(),
                headers: Vec::new(),
                body: rosterview::render::Body::Rows(Vec::new()),
                pagination: None,
                total_results: 0,
            },
            selected_row: 0,
            selected_column: 0,
            show_popup: false,
            popup_message: String::new(),
            searching: false,
            cmdinput: InputResult::default(),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use rosterview::store::Role;

    use super::*;

    fn admin_model() -> Model {
        let store = SchoolStore::seeded();
        let session = store.authenticate("admin@school.test", "admin123").unwrap();
        Model::from_store(&TVConfig::default(), store, session, None).unwrap()
    }

    fn send(model: &mut Model, messages: &[Message]) {
        for m in messages {
            model.update(Some(m.clone())).unwrap();
        }
    }

    fn type_search(model: &mut Model, text: &str) {
        send(model, &[Message::Search]);
        for c in text.chars() {
            let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE);
            send(model, &[Message::RawKey(key)]);
        }
    }

    #[test]
    fn search_is_live_while_typing() {
        let mut model = admin_model();
        type_search(&mut model, "ibra");
        assert!(model.raw_keyevents());
        assert_eq!(model.get_uidata().view.total_results, 1);
        assert_eq!(model.get_uidata().view.search.query, "ibra");
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        send(&mut model, &[Message::RawKey(esc)]);
        assert!(!model.raw_keyevents());
        assert_eq!(model.get_uidata().view.total_results, 12);
    }

    #[test]
    fn filter_cycles_through_values_and_back_to_all() {
        let mut model = admin_model();
        // Adm. No, Name, Surname, Class
        send(&mut model, &[Message::MoveRight, Message::MoveRight, Message::MoveRight]);
        send(&mut model, &[Message::CycleFilter]);
        assert_eq!(model.get_uidata().view.total_results, 5);
        send(&mut model, &[Message::CycleFilter]);
        assert_eq!(model.get_uidata().view.total_results, 7);
        send(&mut model, &[Message::CycleFilter]);
        assert_eq!(model.get_uidata().view.total_results, 12);
        assert!(model.view().state().filters.is_empty());
    }

    #[test]
    fn paging_and_cursor_stay_in_range() {
        let mut model = admin_model();
        for _ in 0..20 {
            send(&mut model, &[Message::MoveDown]);
        }
        assert_eq!(model.get_uidata().selected_row, 9);
        send(&mut model, &[Message::NextPage]);
        assert_eq!(model.view().current_page(), 2);
        assert_eq!(model.get_uidata().selected_row, 1);
        send(&mut model, &[Message::GoToPage(9)]);
        assert_eq!(model.view().current_page(), 2);
    }

    #[test]
    fn sort_key_cycles_header() {
        let mut model = admin_model();
        send(&mut model, &[Message::Sort]);
        assert_eq!(model.get_uidata().status_message, "Sorted by Adm. No ▲");
        send(&mut model, &[Message::Sort, Message::Sort]);
        assert_eq!(model.get_uidata().status_message, "Sort off");
        send(&mut model, &[Message::MoveRight, Message::Sort]);
        assert_eq!(model.get_uidata().status_message, "Name can not be sorted");
    }

    #[test]
    fn tab_switches_between_visible_datasets() {
        let mut model = admin_model();
        assert_eq!(model.get_uidata().name, "[Students] Teachers Fees");
        send(&mut model, &[Message::NextDataset]);
        assert_eq!(model.get_uidata().name, "Students [Teachers] Fees");
        assert_eq!(model.get_uidata().view.headers[1].label, "Subject");

        let store = SchoolStore::seeded();
        let session = store
            .authenticate("fatima.ibrahim@school.test", "student123")
            .unwrap();
        assert_eq!(session.role, Role::Student);
        let mut model = Model::from_store(&TVConfig::default(), store, session, None).unwrap();
        send(&mut model, &[Message::NextDataset]);
        assert_eq!(model.get_uidata().name, "[Fees]");
        assert_eq!(model.get_uidata().view.total_results, 2);
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = admin_model();
        send(&mut model, &[Message::Help]);
        assert!(model.get_uidata().show_popup);
        send(&mut model, &[Message::NextPage]);
        assert_eq!(model.view().current_page(), 1);
        send(&mut model, &[Message::Exit]);
        assert!(!model.get_uidata().show_popup);
    }

    #[test]
    fn quit_sets_status() {
        let mut model = admin_model();
        send(&mut model, &[Message::Quit]);
        assert_eq!(model.status, Status::QUITTING);
    }
}
