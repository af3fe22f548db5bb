//! Serialize a table for download.

use crate::error::SweepResult;
use crate::upload::FileFormat;
use serde::Serialize;
use std::path::Path;
use sweeper_sheet::Table;

/// Bytes plus the name and MIME type they are offered under.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

/// Name of the exported file: the final extension of `source_name`
/// replaced by the target format's.
#[must_use]
pub fn output_file_name(source_name: &str, format: FileFormat) -> String {
    let target = format.extension().trim_start_matches('.');
    Path::new(source_name)
        .with_extension(target)
        .to_string_lossy()
        .into_owned()
}

/// Serialize `table` in `format`.
///
/// CSV output has a header row and no index column; spreadsheet output is a
/// single worksheet with the header in the first row.
///
/// # Errors
///
/// Returns the table layer's error when serialization fails.
pub fn export(table: &Table, source_name: &str, format: FileFormat) -> SweepResult<ExportArtifact> {
    let bytes = match format {
        FileFormat::Csv => table.to_csv_bytes()?,
        FileFormat::Xlsx => table.to_xlsx_bytes()?,
    };
    let file_name = output_file_name(source_name, format);

    tracing::info!("Exported {} ({} bytes)", file_name, bytes.len());
    Ok(ExportArtifact {
        file_name,
        mime_type: format.mime_type(),
        bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("sales.csv", FileFormat::Xlsx), "sales.xlsx");
        assert_eq!(output_file_name("data.xlsx", FileFormat::Csv), "data.csv");
        assert_eq!(output_file_name("data.csv", FileFormat::Csv), "data.csv");
        assert_eq!(output_file_name("DATA.CSV", FileFormat::Xlsx), "DATA.xlsx");
        assert_eq!(output_file_name("q1.csv.backup.csv", FileFormat::Xlsx), "q1.csv.backup.xlsx");
    }

    #[test]
    fn test_export_csv() {
        let table = Table::from_csv_str("a,b\n1,2.5\n").unwrap();
        let artifact = export(&table, "nums.xlsx", FileFormat::Csv).unwrap();

        assert_eq!(artifact.file_name, "nums.csv");
        assert_eq!(artifact.mime_type, "text/csv");
        assert_eq!(artifact.bytes, b"a,b\n1,2.5\n");
    }

    #[test]
    fn test_export_xlsx() {
        let table = Table::from_csv_str("a,b\n1,2.5\n").unwrap();
        let artifact = export(&table, "nums.csv", FileFormat::Xlsx).unwrap();

        assert_eq!(artifact.file_name, "nums.xlsx");
        assert_eq!(artifact.mime_type, crate::upload::XLSX_MIME);
        // zip container
        assert_eq!(&artifact.bytes[..2], b"PK");
        assert_eq!(Table::from_xlsx_bytes(&artifact.bytes).unwrap(), table);
    }

    #[test]
    fn test_export_without_columns() {
        let mut table = Table::from_csv_str("a\n1\n").unwrap();
        table.select_columns::<&str>(&[]).unwrap();

        let artifact = export(&table, "x.csv", FileFormat::Csv).unwrap();
        assert_eq!(artifact.bytes, b"\n");
        assert!(export(&table, "x.csv", FileFormat::Xlsx).is_ok());
    }
}
