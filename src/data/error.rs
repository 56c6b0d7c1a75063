use thiserror::Error;

/// Failures that stop processing of a single uploaded file or action.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    #[error("Excel write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("line {line}: expected {expected} fields, found {found}")]
    Malformed {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("No columns to parse from file")]
    Empty,

    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    #[error("Report error: {0}")]
    Report(String),
}

/// Non-fatal conditions: the requested operation is skipped, no data changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableWarning {
    #[error("No numeric columns found for missing value filling.")]
    NoNumericColumns,

    #[error("Not enough numeric columns to generate a bar chart ({found} found, 2 needed).")]
    NotEnoughNumericColumns { found: usize },
}

pub type TableResult<T> = Result<T, TableError>;
