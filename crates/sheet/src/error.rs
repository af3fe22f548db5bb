use thiserror::Error;

/// Errors that can occur during table operations
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Row {row} has {actual} fields, header has {expected}")]
    RowTooLong {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("Data length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Spreadsheet read error: {0}")]
    XlsxRead(#[from] calamine::XlsxError),

    #[error("Spreadsheet write error: {0}")]
    XlsxWrite(#[from] rust_xlsxwriter::XlsxError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SheetError>;
