//! Searchable, filterable, sortable and paginated views over in-memory records.
//!
//! A [`TableView`] keeps the view state (search query, column filters, sort
//! and page) for a shared collection of [`Record`]s described by a list of
//! [`ColumnDescriptor`]s, and derives the visible page from it on demand.

pub mod column;
pub mod datasets;
pub mod domain;
pub mod loader;
pub mod pagination;
pub mod pipeline;
pub mod record;
pub mod render;
pub mod sort;
pub mod store;
pub mod value;
pub mod view;

pub use column::ColumnDescriptor;
pub use domain::{TVError, ViewConfig};
pub use pipeline::{FilterSelection, ViewState, VisibleSlice, derive_view};
pub use record::Record;
pub use render::RenderedView;
pub use sort::{SortDirection, SortState};
pub use value::{ColumnKind, Value};
pub use view::TableView;
