use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use derive_setters::Setters;

use crate::domain::TVError;
use crate::record::Record;
use crate::value::{ColumnKind, Value};

pub type RenderFn = Arc<dyn Fn(&Record) -> String + Send + Sync>;

/// Describes how one field of a record is labeled, sorted, filtered and rendered.
#[derive(Clone, Setters)]
pub struct ColumnDescriptor {
    #[setters(into)]
    pub key: String,
    #[setters(into)]
    pub header: String,
    pub kind: ColumnKind,
    pub sortable: bool,
    pub filterable: bool,
    #[setters(skip)]
    pub render: Option<RenderFn>,
}

impl ColumnDescriptor {
    pub fn new(key: impl Into<String>, header: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            key: key.into(),
            header: header.into(),
            kind,
            sortable: false,
            filterable: false,
            render: None,
        }
    }

    pub fn text(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(key, header, ColumnKind::Text)
    }

    pub fn number(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(key, header, ColumnKind::Number)
    }

    pub fn date(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::new(key, header, ColumnKind::Date)
    }

    pub fn enumeration<I, S>(key: impl Into<String>, header: impl Into<String>, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(key, header, ColumnKind::enumeration(variants))
    }

    pub fn with_render<F>(mut self, render: F) -> Self
    where
        F: Fn(&Record) -> String + Send + Sync + 'static,
    {
        self.render = Some(Arc::new(render));
        self
    }

    pub fn value_of<'r>(&self, record: &'r Record) -> &'r Value {
        record.get(&self.key)
    }

    /// The raw field as text. This is what search and filters look at.
    pub fn display_value(&self, record: &Record) -> String {
        self.kind.display(self.value_of(record))
    }

    /// The text shown in the cell: the render callback if present, otherwise
    /// the raw field, or `placeholder` when the field is empty.
    pub fn cell(&self, record: &Record, placeholder: &str) -> String {
        if let Some(render) = &self.render {
            return render(record);
        }
        let value = self.value_of(record);
        if value.is_empty() {
            placeholder.to_string()
        } else {
            self.kind.display(value)
        }
    }
}

impl fmt::Debug for ColumnDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDescriptor")
            .field("key", &self.key)
            .field("header", &self.header)
            .field("kind", &self.kind.name())
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("render", &self.render.is_some())
            .finish()
    }
}

pub fn validate_columns(columns: &[ColumnDescriptor]) -> Result<(), TVError> {
    let mut seen = HashSet::with_capacity(columns.len());
    for c in columns {
        if !seen.insert(c.key.as_str()) {
            return Err(TVError::DuplicateColumnKey(c.key.clone()));
        }
    }
    Ok(())
}

/// Every field addressed by a column must be empty or of the column's kind.
pub fn validate_records(records: &[Record], columns: &[ColumnDescriptor]) -> Result<(), TVError> {
    for (row, record) in records.iter().enumerate() {
        if let Some(c) = columns.iter().find(|c| !c.kind.accepts(c.value_of(record))) {
            return Err(TVError::TypeMismatch {
                column: c.key.clone(),
                row,
            });
        }
    }
    Ok(())
}
