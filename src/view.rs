use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::column::{ColumnDescriptor, validate_columns, validate_records};
use crate::domain::{TVError, ViewConfig};
use crate::pagination::{Pagination, clamp_page, total_pages};
use crate::pipeline::{
    FilterOptions, FilterSelection, ViewState, VisibleSlice, derive_rows, derive_view,
    filter_options,
};
use crate::record::Record;
use crate::render::{
    Body, FilterOption, FilterSelector, HeaderCell, RenderedRow, RenderedView, SearchBox,
};

pub type RowHandler = Box<dyn FnMut(&Record)>;

/// A searchable, filterable, sortable and paginated view over shared records.
///
/// The records are only read. Every mutation of the view state keeps
/// `current_page` inside `[1, total_pages]`.
pub struct TableView {
    records: Arc<Vec<Record>>,
    columns: Vec<ColumnDescriptor>,
    config: ViewConfig,
    state: ViewState,
    options: Vec<FilterOptions>,
    on_row_click: Option<RowHandler>,
}

impl TableView {
    pub fn new(
        records: Arc<Vec<Record>>,
        columns: Vec<ColumnDescriptor>,
        config: ViewConfig,
    ) -> Result<Self, TVError> {
        if config.page_size == 0 {
            return Err(TVError::InvalidPageSize);
        }
        validate_columns(&columns)?;
        validate_records(&records, &columns)?;
        let options = filter_options(&records, &columns);
        debug!(
            "New table view: {} records, {} columns, page size {}",
            records.len(),
            columns.len(),
            config.page_size
        );
        Ok(Self {
            records,
            columns,
            config,
            state: ViewState::default(),
            options,
            on_row_click: None,
        })
    }

    pub fn with_row_handler<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&Record) + 'static,
    {
        self.on_row_click = Some(Box::new(handler));
        self
    }

    pub fn records(&self) -> &Arc<Vec<Record>> {
        &self.records
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn is_row_clickable(&self) -> bool {
        self.on_row_click.is_some()
    }

    /// Swap the underlying records. The view state is kept.
    pub fn set_records(&mut self, records: Arc<Vec<Record>>) -> Result<(), TVError> {
        validate_records(&records, &self.columns)?;
        self.options = filter_options(&records, &self.columns);
        self.records = records;
        debug!("Records replaced, now {}", self.records.len());
        self.clamp_page();
        Ok(())
    }

    /// Swap the columns. Filters and sort on removed columns are dropped.
    pub fn set_columns(&mut self, columns: Vec<ColumnDescriptor>) -> Result<(), TVError> {
        validate_columns(&columns)?;
        validate_records(&self.records, &columns)?;
        self.state
            .filters
            .retain(|key, _| columns.iter().any(|c| &c.key == key && c.filterable));
        if let Some(key) = self.state.sort.column()
            && !columns.iter().any(|c| c.key == key && c.sortable)
        {
            self.state.sort = Default::default();
        }
        self.options = filter_options(&self.records, &columns);
        self.columns = columns;
        self.clamp_page();
        Ok(())
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
        self.state.current_page = 1;
        trace!("Search query: {:?}", self.state.search_query);
    }

    /// Ignored for columns that are not filterable.
    pub fn set_filter(&mut self, key: &str, selection: FilterSelection) {
        if !self.column(key).is_some_and(|c| c.filterable) {
            trace!("Column {key} is not filterable");
            return;
        }
        trace!("Filter {key} = {selection:?}");
        match selection {
            FilterSelection::All => self.state.filters.remove(key),
            selection => self.state.filters.insert(key.to_string(), selection),
        };
        self.state.current_page = 1;
    }

    pub fn clear_filters(&mut self) {
        self.state.filters.clear();
        self.state.current_page = 1;
    }

    pub fn filter_selection(&self, key: &str) -> FilterSelection {
        self.state.filters.get(key).cloned().unwrap_or_default()
    }

    /// Distinct values of a filterable column over all records.
    pub fn filter_options(&self, key: &str) -> Option<&[String]> {
        self.options
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.values.as_slice())
    }

    /// Header click. Ignored for columns that are not sortable.
    pub fn click_header(&mut self, key: &str) {
        if !self.column(key).is_some_and(|c| c.sortable) {
            trace!("Column {key} is not sortable");
            return;
        }
        self.state.sort = self.state.sort.click(key);
        debug!("Sort state: {:?}", self.state.sort);
        self.clamp_page();
    }

    pub fn total_pages(&self) -> usize {
        let count = derive_rows(&self.records, &self.columns, &self.state).len();
        total_pages(count, self.config.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.state.current_page
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.state.current_page = clamp_page(page, self.total_pages());
    }

    pub fn next_page(&mut self) {
        let total = self.total_pages();
        if self.state.current_page < total {
            self.state.current_page += 1;
        }
    }

    pub fn previous_page(&mut self) {
        if self.state.current_page > 1 {
            self.state.current_page -= 1;
        }
    }

    pub fn first_page(&mut self) {
        self.state.current_page = 1;
    }

    pub fn last_page(&mut self) {
        self.state.current_page = self.total_pages();
    }

    pub fn slice(&self) -> VisibleSlice<'_> {
        derive_view(
            &self.records,
            &self.columns,
            &self.state,
            self.config.page_size,
        )
    }

    /// Pass the record at `index` of the current page to the row handler.
    pub fn activate_row(&mut self, index: usize) -> bool {
        let Some(record) = derive_view(
            &self.records,
            &self.columns,
            &self.state,
            self.config.page_size,
        )
        .rows
        .get(index)
        .copied() else {
            return false;
        };
        match self.on_row_click.as_mut() {
            Some(handler) => {
                handler(record);
                true
            }
            None => false,
        }
    }

    pub fn render(&self) -> RenderedView {
        let slice = self.slice();
        let placeholder = &self.config.empty_cell;
        let clickable = self.is_row_clickable();

        let filters = self
            .options
            .iter()
            .filter_map(|o| {
                let column = self.column(&o.key)?;
                let options = std::iter::once(FilterOption::All)
                    .chain(o.values.iter().cloned().map(FilterOption::Value))
                    .collect();
                Some(FilterSelector {
                    key: o.key.clone(),
                    header: column.header.clone(),
                    options,
                    selected: self.filter_selection(&o.key),
                })
            })
            .collect();

        let headers = self
            .columns
            .iter()
            .map(|c| HeaderCell {
                key: c.key.clone(),
                label: c.header.clone(),
                sortable: c.sortable,
                direction: self.state.sort.direction_of(&c.key),
            })
            .collect();

        let body = if slice.rows.is_empty() {
            Body::Empty {
                colspan: self.columns.len(),
                message: self.config.empty_message.clone(),
            }
        } else {
            Body::Rows(
                slice
                    .rows
                    .iter()
                    .map(|r| RenderedRow {
                        cells: self.columns.iter().map(|c| c.cell(r, placeholder)).collect(),
                        clickable,
                    })
                    .collect(),
            )
        };

        RenderedView {
            search: SearchBox {
                placeholder: self.config.search_placeholder.clone(),
                query: self.state.search_query.clone(),
            },
            filters,
            headers,
            body,
            pagination: Pagination::new(slice.current_page, slice.total_pages),
            total_results: slice.total_count,
        }
    }

    fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    fn clamp_page(&mut self) {
        self.state.current_page = clamp_page(self.state.current_page, self.total_pages());
    }
}

impl fmt::Debug for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableView")
            .field("records", &self.records.len())
            .field("columns", &self.columns)
            .field("config", &self.config)
            .field("state", &self.state)
            .field("on_row_click", &self.on_row_click.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::sort::{SortDirection, SortState};
    use crate::value::{ColumnKind, Value};

    fn student(n: usize, class: &str, surname: &str, status: &str) -> Record {
        Record::new()
            .with("id", n as i64)
            .with("surname", surname)
            .with("class", class)
            .with("status", Value::Enum(status.to_string()))
    }

    fn student_columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::number("id", "ID").sortable(true),
            ColumnDescriptor::text("surname", "Surname").sortable(true),
            ColumnDescriptor::text("class", "Class").filterable(true),
            ColumnDescriptor::enumeration("status", "Status", ["active", "pending"])
                .filterable(true),
        ]
    }

    fn twelve_students() -> Arc<Vec<Record>> {
        let mut records = Vec::new();
        for n in 1..=5 {
            records.push(student(n, "JSS 1A", &format!("One{n}"), "active"));
        }
        for n in 6..=12 {
            let (surname, status) = if n == 9 {
                ("Ibrahim".to_string(), "pending")
            } else {
                (format!("Two{n}"), "active")
            };
            records.push(student(n, "JSS 2A", &surname, status));
        }
        Arc::new(records)
    }

    fn view() -> TableView {
        TableView::new(twelve_students(), student_columns(), ViewConfig::default()).unwrap()
    }

    fn column(view: &RenderedView, idx: usize) -> Vec<String> {
        view.body.rows().iter().map(|r| r.cells[idx].clone()).collect()
    }

    #[test]
    fn twelve_records_make_two_pages() {
        let mut v = view();
        let page = v.render();
        assert_eq!(page.body.rows().len(), 10);
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.total, 2);
        assert!(!pagination.has_previous);
        assert!(pagination.has_next);

        v.next_page();
        let page = v.render();
        assert_eq!(page.body.rows().len(), 2);
        assert_eq!(column(&page, 0), vec!["11", "12"]);
        assert!(!page.pagination.unwrap().has_next);
    }

    #[test]
    fn paging_stops_at_the_ends() {
        let mut v = view();
        v.previous_page();
        assert_eq!(v.current_page(), 1);
        v.next_page();
        v.next_page();
        assert_eq!(v.current_page(), 2);
        v.go_to_page(9);
        assert_eq!(v.current_page(), 2);
        v.go_to_page(0);
        assert_eq!(v.current_page(), 1);
        v.last_page();
        assert_eq!(v.current_page(), 2);
        v.first_page();
        assert_eq!(v.current_page(), 1);
    }

    #[test]
    fn status_filter_hides_pending_student() {
        let mut v = view();
        v.set_filter("status", FilterSelection::Value("active".into()));
        let page = v.render();
        assert_eq!(page.total_results, 11);
        v.set_search_query("ibra");
        assert!(v.render().body.is_empty());
    }

    #[test]
    fn search_matches_surname_substring() {
        let mut v = view();
        v.set_search_query("ibra");
        let page = v.render();
        assert_eq!(column(&page, 1), vec!["Ibrahim"]);
        assert_eq!(page.search.query, "ibra");
    }

    #[test]
    fn query_and_filter_reset_page() {
        let mut v = view();
        v.next_page();
        v.set_search_query("");
        assert_eq!(v.current_page(), 1);
        v.next_page();
        v.set_filter("class", FilterSelection::Value("JSS 2A".into()));
        assert_eq!(v.current_page(), 1);
    }

    #[test]
    fn filter_on_unfilterable_column_is_ignored() {
        let mut v = view();
        v.set_filter("surname", FilterSelection::Value("Ibrahim".into()));
        assert!(v.state().filters.is_empty());
        assert_eq!(v.render().total_results, 12);
    }

    #[test]
    fn selecting_all_removes_filter() {
        let mut v = view();
        v.set_filter("class", FilterSelection::Value("JSS 1A".into()));
        assert_eq!(v.render().total_results, 5);
        v.set_filter("class", FilterSelection::All);
        assert!(v.state().filters.is_empty());
        assert_eq!(v.render().total_results, 12);
    }

    #[test]
    fn filter_options_do_not_narrow() {
        let mut v = view();
        let before = v.render().filters;
        v.set_filter("class", FilterSelection::Value("JSS 1A".into()));
        v.set_search_query("One1");
        let after = v.render().filters;
        assert_eq!(before[1].options, after[1].options);
        assert_eq!(before[0].options, after[0].options);
        assert_eq!(
            after[0].options,
            vec![
                FilterOption::All,
                FilterOption::Value("JSS 1A".into()),
                FilterOption::Value("JSS 2A".into())
            ]
        );
        assert_eq!(after[0].selected, FilterSelection::Value("JSS 1A".into()));
        assert_eq!(v.filter_options("status"), Some(&["active".to_string(), "pending".to_string()][..]));
    }

    #[test]
    fn three_clicks_restore_original_order() {
        let mut v = view();
        let original = column(&v.render(), 1);

        v.click_header("surname");
        let page = v.render();
        assert_eq!(page.headers[1].direction, Some(SortDirection::Ascending));
        assert_eq!(column(&page, 1)[0], "Ibrahim");

        v.click_header("surname");
        assert_eq!(v.state().sort, SortState::Descending("surname".into()));
        assert_eq!(column(&v.render(), 1)[0], "Two8");

        v.click_header("surname");
        let page = v.render();
        assert_eq!(page.headers[1].direction, None);
        assert_eq!(column(&page, 1), original);
    }

    #[test]
    fn numeric_column_sorts_numerically() {
        let records: Vec<Record> = [2500, 100000, 30000, 900]
            .iter()
            .map(|&a| Record::new().with("amount", a))
            .collect();
        let columns = vec![ColumnDescriptor::number("amount", "Amount").sortable(true)];
        let mut v = TableView::new(Arc::new(records), columns, ViewConfig::default()).unwrap();

        v.click_header("amount");
        assert_eq!(column(&v.render(), 0), vec!["900", "2500", "30000", "100000"]);
        v.click_header("amount");
        assert_eq!(column(&v.render(), 0), vec!["100000", "30000", "2500", "900"]);
        v.click_header("amount");
        assert_eq!(column(&v.render(), 0), vec!["2500", "100000", "30000", "900"]);
    }

    #[test]
    fn unsortable_header_click_is_ignored() {
        let mut v = view();
        v.click_header("class");
        assert_eq!(v.state().sort, SortState::Unsorted);
        v.click_header("nope");
        assert_eq!(v.state().sort, SortState::Unsorted);
    }

    #[test]
    fn third_page_of_twenty_three() {
        let records: Vec<Record> = (1..=23)
            .map(|n| student(n, "JSS 1A", &format!("S{n}"), "active"))
            .collect();
        let mut v =
            TableView::new(Arc::new(records), student_columns(), ViewConfig::default()).unwrap();
        v.go_to_page(3);
        let page = v.render();
        assert_eq!(column(&page, 0), vec!["21", "22", "23"]);
        let pagination = page.pagination.unwrap();
        assert_eq!(pagination.total, 3);
        assert!(!pagination.has_next);
        assert_eq!(pagination.pages, vec![1, 2, 3]);
        v.next_page();
        assert_eq!(v.current_page(), 3);
    }

    #[test]
    fn no_matches_render_one_empty_row_without_pagination() {
        let mut v = view();
        v.set_search_query("zzz");
        let page = v.render();
        assert_eq!(
            page.body,
            Body::Empty {
                colspan: 4,
                message: "No data found".into()
            }
        );
        assert!(page.pagination.is_none());
        assert_eq!(page.total_results, 0);
    }

    #[test]
    fn shrinking_result_clamps_page() {
        let mut v = view();
        v.next_page();
        v.set_records(Arc::new(twelve_students()[..3].to_vec())).unwrap();
        assert_eq!(v.current_page(), 1);
        assert_eq!(v.render().body.rows().len(), 3);
    }

    #[test]
    fn render_uses_callbacks_and_placeholders() {
        let columns = vec![
            ColumnDescriptor::text("surname", "Surname"),
            ColumnDescriptor::text("guardian", "Guardian"),
            ColumnDescriptor::text("label", "Label").with_render(|r| {
                format!("{} ({})", ColumnKind::Text.display(r.get("surname")), ColumnKind::Text.display(r.get("class")))
            }),
        ];
        let records = vec![Record::new().with("surname", "Bello").with("class", "JSS 1A")];
        let v = TableView::new(Arc::new(records), columns, ViewConfig::default()).unwrap();
        let page = v.render();
        assert_eq!(page.body.rows()[0].cells, vec!["Bello", "-", "Bello (JSS 1A)"]);
        assert!(!page.body.rows()[0].clickable);
    }

    #[test]
    fn row_click_passes_the_record() {
        let clicked = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&clicked);
        let mut v = view().with_row_handler(move |r| sink.borrow_mut().push(r.clone()));
        v.next_page();
        assert!(v.render().body.rows()[0].clickable);
        assert!(v.activate_row(1));
        assert!(!v.activate_row(5));
        let clicked = clicked.borrow();
        assert_eq!(clicked.len(), 1);
        assert_eq!(clicked[0].get("id"), &Value::from(12));
    }

    #[test]
    fn activation_without_handler_does_nothing() {
        let mut v = view();
        assert!(!v.is_row_clickable());
        assert!(!v.activate_row(0));
    }

    #[test]
    fn invalid_construction_fails() {
        let config = ViewConfig::default().page_size(0usize);
        assert!(matches!(
            TableView::new(twelve_students(), student_columns(), config),
            Err(TVError::InvalidPageSize)
        ));
        let records = Arc::new(vec![Record::new().with("id", "one")]);
        assert!(matches!(
            TableView::new(records, student_columns(), ViewConfig::default()),
            Err(TVError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn removed_columns_drop_their_state() {
        let mut v = view();
        v.set_filter("class", FilterSelection::Value("JSS 1A".into()));
        v.click_header("surname");
        let columns = student_columns()
            .into_iter()
            .filter(|c| c.key == "id" || c.key == "status")
            .collect();
        v.set_columns(columns).unwrap();
        assert!(v.state().filters.is_empty());
        assert_eq!(v.state().sort, SortState::Unsorted);
        assert_eq!(v.render().total_results, 12);
    }
}
