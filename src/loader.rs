use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::NaiveDate;
use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info, trace};

use crate::column::ColumnDescriptor;
use crate::domain::TVError;
use crate::record::Record;
use crate::value::{ColumnKind, DATE_FORMAT, Value};

/// Text columns with at most this many distinct values get a filter.
pub const MAX_FILTER_VALUES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    Parquet,
    Arrow,
}

#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub file_type: FileType,
}

/// Records and matching columns read from a file.
#[derive(Debug)]
pub struct LoadedTable {
    pub name: String,
    pub columns: Vec<ColumnDescriptor>,
    pub records: Vec<Record>,
}

struct LoadedColumn {
    descriptor: ColumnDescriptor,
    values: Vec<Value>,
}

pub fn load_file(path: PathBuf) -> Result<LoadedTable, TVError> {
    let file_info = get_file_info(path)?;
    debug!("Loading {:?}", file_info);
    let frame = match file_info.file_type {
        FileType::Csv => load_csv(&file_info.path)?,
        FileType::Parquet => load_parquet(&file_info.path)?,
        FileType::Arrow => load_arrow(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;
    let columns: Vec<LoadedColumn> = df
        .get_column_names()
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect::<Result<Vec<_>, PolarsError>>()?;

    let records = (0..df.height())
        .map(|row| {
            columns
                .iter()
                .map(|c| (c.descriptor.key.clone(), c.values[row].clone()))
                .collect::<Record>()
        })
        .collect();

    info!(
        "Loaded {} rows, {} columns in {}ms",
        df.height(),
        columns.len(),
        start_time.elapsed().as_millis()
    );
    Ok(LoadedTable {
        name: file_info
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string(),
        columns: columns.into_iter().map(|c| c.descriptor).collect(),
        records,
    })
}

pub fn detect_file_type(path: &Path) -> Result<FileType, TVError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::Csv),
        Some("PARQUET") | Some("PQ") => Ok(FileType::Parquet),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::Arrow),
        _ => Err(TVError::UnknownFileType),
    }
}

pub fn kind_for(dtype: &DataType) -> ColumnKind {
    match dtype {
        DataType::Int8
        | DataType::Int16
        | DataType::Int32
        | DataType::Int64
        | DataType::UInt8
        | DataType::UInt16
        | DataType::UInt32
        | DataType::UInt64
        | DataType::Float32
        | DataType::Float64 => ColumnKind::Number,
        DataType::Date => ColumnKind::Date,
        DataType::Categorical(..) | DataType::Enum(..) => ColumnKind::enumeration(Vec::<String>::new()),
        _ => ColumnKind::Text,
    }
}

fn parse_value(kind: &ColumnKind, raw: Option<&str>) -> Value {
    let Some(raw) = raw else {
        return Value::Empty;
    };
    match kind {
        ColumnKind::Number => raw.parse::<f64>().map(Value::Number).unwrap_or(Value::Empty),
        ColumnKind::Date => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Value::Date)
            .unwrap_or(Value::Empty),
        ColumnKind::Enum(_) => Value::Enum(raw.to_string()),
        ColumnKind::Text => Value::Text(raw.replace("\r\n", " ↵ ").replace('\n', " ↵ ")),
    }
}

fn load_column(df: &DataFrame, col_name: &str) -> Result<LoadedColumn, PolarsError> {
    let original_dtype = df.column(col_name)?.dtype().clone();
    let kind = kind_for(&original_dtype);

    let col = df.column(col_name)?.cast(&DataType::String)?;
    let series = col.str()?;
    let values: Vec<Value> = series.into_iter().map(|v| parse_value(&kind, v)).collect();

    let filterable = match kind {
        ColumnKind::Text | ColumnKind::Enum(_) => {
            let distinct: HashSet<String> = values.iter().map(|v| kind.display(v)).collect();
            distinct.len() <= MAX_FILTER_VALUES
        }
        _ => false,
    };
    trace!("Column {col_name}: {original_dtype:?} -> {}, filterable {filterable}", kind.name());

    Ok(LoadedColumn {
        descriptor: ColumnDescriptor::new(col_name, col_name, kind)
            .sortable(true)
            .filterable(filterable),
        values,
    })
}

pub fn get_file_info(path: PathBuf) -> Result<FileInfo, TVError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TVError::FileNotFound,
        ErrorKind::PermissionDenied => TVError::PermissionDenied,
        _ => TVError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(TVError::LoadingFailed("Not a file!".into()));
    }

    let file_size = metadata.len();
    let file_type = detect_file_type(&path)?;

    Ok(FileInfo {
        path,
        file_size,
        file_type,
    })
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .with_try_parse_dates(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("rosterview-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn file_types_by_extension() {
        assert_eq!(detect_file_type(Path::new("a.csv")).unwrap(), FileType::Csv);
        assert_eq!(detect_file_type(Path::new("a.PQ")).unwrap(), FileType::Parquet);
        assert_eq!(detect_file_type(Path::new("a.feather")).unwrap(), FileType::Arrow);
        assert!(matches!(
            detect_file_type(Path::new("a.xlsx")),
            Err(TVError::UnknownFileType)
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            load_file(PathBuf::from("/definitely/not/here.csv")),
            Err(TVError::FileNotFound)
        ));
    }

    #[test]
    fn numeric_dtypes_become_numbers() {
        assert_eq!(kind_for(&DataType::Int64), ColumnKind::Number);
        assert_eq!(kind_for(&DataType::Float32), ColumnKind::Number);
        assert_eq!(kind_for(&DataType::Date), ColumnKind::Date);
        assert_eq!(kind_for(&DataType::String), ColumnKind::Text);
    }

    #[test]
    fn csv_is_loaded_with_typed_columns() {
        let path = write_temp(
            "fees.csv",
            "student,class,amount\nIbrahim,JSS 2A,85000\nBello,JSS 1A,\nEze,JSS 1A,15000.5\n",
        );
        let table = load_file(path).unwrap();
        assert_eq!(table.name, "fees.csv");
        assert_eq!(table.records.len(), 3);
        let kinds: Vec<&str> = table.columns.iter().map(|c| c.kind.name()).collect();
        assert_eq!(kinds, vec!["text", "text", "number"]);
        assert!(table.columns[1].filterable);
        assert!(!table.columns[2].filterable);
        assert_eq!(table.records[0].get("amount"), &Value::Number(85000.0));
        assert_eq!(table.records[1].get("amount"), &Value::Empty);
        assert_eq!(table.records[2].get("student"), &Value::from("Eze"));
    }
}
