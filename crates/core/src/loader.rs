//! Parse uploaded bytes into a table.

use crate::error::SweepResult;
use crate::upload::{FileFormat, UploadedFile};
use sweeper_sheet::Table;

/// Parse an upload according to its extension.
///
/// # Errors
///
/// Returns `SweepError::UnsupportedFormat` when the extension is neither
/// `.csv` nor `.xlsx`, or the table layer's error when parsing fails.
pub fn load(upload: &UploadedFile) -> SweepResult<Table> {
    let format = upload.format()?;
    let table = match format {
        FileFormat::Csv => Table::from_csv_bytes(upload.content())?,
        FileFormat::Xlsx => Table::from_xlsx_bytes(upload.content())?,
    };

    tracing::info!(
        "Loaded {} ({} rows, {} columns)",
        upload.name(),
        table.row_count(),
        table.col_count()
    );
    Ok(table)
}
