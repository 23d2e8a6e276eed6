use crate::pagination::Pagination;
use crate::pipeline::FilterSelection;
use crate::sort::SortDirection;

/// Everything a front end needs to draw one table view.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedView {
    pub search: SearchBox,
    pub filters: Vec<FilterSelector>,
    pub headers: Vec<HeaderCell>,
    pub body: Body,
    pub pagination: Option<Pagination>,
    pub total_results: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchBox {
    pub placeholder: String,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterOption {
    All,
    Value(String),
}

impl FilterOption {
    pub fn label(&self) -> &str {
        match self {
            FilterOption::All => "all",
            FilterOption::Value(v) => v,
        }
    }

    pub fn selection(&self) -> FilterSelection {
        match self {
            FilterOption::All => FilterSelection::All,
            FilterOption::Value(v) => FilterSelection::Value(v.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSelector {
    pub key: String,
    pub header: String,
    /// `FilterOption::All` first, then the distinct values.
    pub options: Vec<FilterOption>,
    pub selected: FilterSelection,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCell {
    pub key: String,
    pub label: String,
    pub sortable: bool,
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub cells: Vec<String>,
    pub clickable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Body {
    Rows(Vec<RenderedRow>),
    /// A single row spanning all columns.
    Empty { colspan: usize, message: String },
}

impl Body {
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty { .. })
    }

    pub fn rows(&self) -> &[RenderedRow] {
        match self {
            Body::Rows(rows) => rows,
            Body::Empty { .. } => &[],
        }
    }
}
