//! Error types for sweeper.

use sweeper_sheet::SheetError;
use thiserror::Error;

/// Result type for sweeper operations.
pub type SweepResult<T> = Result<T, SweepError>;

/// Errors that can occur while processing one file.
#[derive(Debug, Error)]
pub enum SweepError {
    /// The file extension is not one the loader understands.
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    /// A format name that is neither CSV nor spreadsheet.
    #[error("Unknown export format: {0}")]
    UnknownFormat(String),

    /// Parse, selection or serialization failure from the table layer.
    #[error(transparent)]
    Sheet(#[from] SheetError),
}

impl SweepError {
    /// Create an unsupported format error.
    pub fn unsupported(extension: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            extension: extension.into(),
        }
    }
}
