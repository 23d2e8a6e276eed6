//! Derivation of the visible rows of a view.
//!
//! raw records -> search -> column filters -> stable sort -> page slice.
//! Filter options are always taken from the raw records, so filters never
//! narrow each other's choices.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use tracing::trace;

use crate::column::ColumnDescriptor;
use crate::pagination::{clamp_page, page_bounds, total_pages};
use crate::record::Record;
use crate::sort::SortState;

/// Selection of a column filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FilterSelection {
    /// No constraint.
    #[default]
    All,
    Value(String),
}

impl FilterSelection {
    pub fn value(&self) -> Option<&str> {
        match self {
            FilterSelection::All => None,
            FilterSelection::Value(v) => Some(v),
        }
    }
}

/// Mutable state of one view. Created fresh with every view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search_query: String,
    pub filters: BTreeMap<String, FilterSelection>,
    pub sort: SortState,
    pub current_page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search_query: String::new(),
            filters: BTreeMap::new(),
            sort: SortState::Unsorted,
            current_page: 1,
        }
    }
}

/// Distinct values of a filterable column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOptions {
    pub key: String,
    pub values: Vec<String>,
}

/// Rows of the current page together with the size of the full result.
#[derive(Debug, Clone)]
pub struct VisibleSlice<'a> {
    pub rows: Vec<&'a Record>,
    pub total_count: usize,
    pub total_pages: usize,
    pub current_page: usize,
}

pub fn filter_options(records: &[Record], columns: &[ColumnDescriptor]) -> Vec<FilterOptions> {
    columns
        .iter()
        .filter(|c| c.filterable)
        .map(|c| {
            let distinct: BTreeSet<String> = records.iter().map(|r| c.display_value(r)).collect();
            FilterOptions {
                key: c.key.clone(),
                values: distinct.into_iter().collect(),
            }
        })
        .collect()
}

fn matches_query(record: &Record, columns: &[ColumnDescriptor], query: &str) -> bool {
    columns
        .iter()
        .any(|c| c.display_value(record).to_lowercase().contains(query))
}

/// Records where any column contains `query`, ignoring case.
pub fn search<'a>(records: &'a [Record], columns: &[ColumnDescriptor], query: &str) -> Vec<&'a Record> {
    if query.is_empty() {
        return records.iter().collect();
    }
    let query = query.to_lowercase();
    records
        .par_iter()
        .filter(|r| matches_query(r, columns, &query))
        .collect()
}

/// Keep rows whose field equals every active filter exactly.
pub fn apply_filters<'a>(
    rows: Vec<&'a Record>,
    columns: &[ColumnDescriptor],
    filters: &BTreeMap<String, FilterSelection>,
) -> Vec<&'a Record> {
    let active: Vec<(&ColumnDescriptor, &str)> = filters
        .iter()
        .filter_map(|(key, selection)| {
            let value = selection.value()?;
            let column = columns.iter().find(|c| &c.key == key)?;
            Some((column, value))
        })
        .collect();
    if active.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|r| active.iter().all(|(c, v)| c.display_value(r) == *v))
        .collect()
}

/// Stable sort on the raw values of the sorted column.
pub fn sort_rows(rows: &mut [&Record], columns: &[ColumnDescriptor], sort: &SortState) {
    let (Some(key), Some(direction)) = (sort.column(), sort.direction()) else {
        return;
    };
    let Some(column) = columns.iter().find(|c| c.key == key) else {
        trace!("Sort column {key} is unknown, keeping order");
        return;
    };
    rows.sort_by(|a, b| {
        direction.apply(column.kind.compare(column.value_of(a), column.value_of(b)))
    });
}

/// All rows that pass search and filters, in display order.
pub fn derive_rows<'a>(
    records: &'a [Record],
    columns: &[ColumnDescriptor],
    state: &ViewState,
) -> Vec<&'a Record> {
    let found = search(records, columns, &state.search_query);
    let mut rows = apply_filters(found, columns, &state.filters);
    sort_rows(&mut rows, columns, &state.sort);
    rows
}

/// The current page of the view. The requested page is clamped into range.
pub fn derive_view<'a>(
    records: &'a [Record],
    columns: &[ColumnDescriptor],
    state: &ViewState,
    page_size: usize,
) -> VisibleSlice<'a> {
    let rows = derive_rows(records, columns, state);
    let total_count = rows.len();
    let total_pages = total_pages(total_count, page_size);
    let current_page = clamp_page(state.current_page, total_pages);
    let bounds = page_bounds(current_page, page_size, total_count);
    trace!(
        "Derived view: {} of {} records, page {}/{}",
        total_count,
        records.len(),
        current_page,
        total_pages
    );
    VisibleSlice {
        rows: rows[bounds].to_vec(),
        total_count,
        total_pages,
        current_page,
    }
}
