use std::io;

use derive_setters::Setters;
use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TVError {
    #[error("io error: {0}")]
    IoError(#[from] io::Error),
    #[error("polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("loading failed: {0}")]
    LoadingFailed(String),
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("unknown file type, expected csv, parquet or arrow")]
    UnknownFileType,
    #[error("column key \"{0}\" is used more than once")]
    DuplicateColumnKey(String),
    #[error("record {row} holds a value of the wrong kind for column \"{column}\"")]
    TypeMismatch { column: String, row: usize },
    #[error("page size must be at least 1")]
    InvalidPageSize,
    #[error("login failed: {0}")]
    Login(#[from] crate::store::StoreError),
}

/// Settings of a single table view.
#[derive(Debug, Clone, PartialEq, Eq, Setters)]
pub struct ViewConfig {
    pub page_size: usize,
    #[setters(into)]
    pub search_placeholder: String,
    #[setters(into)]
    pub empty_message: String,
    /// Shown for cells without a value.
    #[setters(into)]
    pub empty_cell: String,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            search_placeholder: "Search...".to_string(),
            empty_message: "No data found".to_string(),
            empty_cell: "-".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TVConfig {
    pub event_poll_time: u64,
    pub max_column_width: usize,
    pub view: ViewConfig,
}

impl Default for TVConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            max_column_width: 30,
            view: ViewConfig::default(),
        }
    }
}
