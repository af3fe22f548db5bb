//! Uploaded files and the formats they come in.

use crate::error::{SweepError, SweepResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// MIME type of CSV output.
pub const CSV_MIME: &str = "text/csv";
/// MIME type of Office Open XML spreadsheet output.
pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A tabular file format, used both for loading and as an export target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileFormat {
    Csv,
    Xlsx,
}

impl FileFormat {
    /// Match a lower-cased extension (with leading dot).
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ".csv" => Some(Self::Csv),
            ".xlsx" => Some(Self::Xlsx),
            _ => None,
        }
    }

    /// Extension with leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => ".csv",
            Self::Xlsx => ".xlsx",
        }
    }

    #[must_use]
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Csv => CSV_MIME,
            Self::Xlsx => XLSX_MIME,
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "CSV"),
            Self::Xlsx => write!(f, "Excel"),
        }
    }
}

impl FromStr for FileFormat {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "xlsx" | "excel" => Ok(Self::Xlsx),
            _ => Err(SweepError::UnknownFormat(s.to_string())),
        }
    }
}

/// A file as received from the user. Immutable once created.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    name: String,
    extension: String,
    content: Vec<u8>,
}

impl UploadedFile {
    /// Create an upload from its name and raw bytes.
    ///
    /// The declared extension is the lower-cased final extension of the
    /// name, with its leading dot, or empty when there is none.
    pub fn new(name: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let name = name.into();
        let extension = Path::new(&name)
            .extension()
            .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
            .unwrap_or_default();
        Self {
            name,
            extension,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Size in bytes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.content.len()
    }

    /// Detected format.
    ///
    /// # Errors
    ///
    /// Returns `SweepError::UnsupportedFormat` for anything but `.csv` and `.xlsx`.
    pub fn format(&self) -> SweepResult<FileFormat> {
        FileFormat::from_extension(&self.extension)
            .ok_or_else(|| SweepError::unsupported(self.extension.clone()))
    }

    #[must_use]
    pub fn info(&self) -> FileInfo {
        FileInfo {
            name: self.name.clone(),
            size_bytes: self.size(),
            size_kb: (self.size() as f64 / 1024.0 * 100.0).round() / 100.0,
            format: FileFormat::from_extension(&self.extension),
        }
    }
}

/// Summary shown above a file preview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    pub name: String,
    pub size_bytes: usize,
    /// Size in KB rounded to two decimals.
    pub size_kb: f64,
    pub format: Option<FileFormat>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;

    #[test]
    fn test_extension_is_lowercased() {
        let upload = UploadedFile::new("Sales.CSV", b"a\n1".to_vec());
        assert_eq!(upload.extension(), ".csv");
        assert_eq!(upload.format().unwrap(), FileFormat::Csv);
    }

    #[test]
    fn test_extension_edge_cases() {
        assert_eq!(UploadedFile::new("noext", Vec::new()).extension(), "");
        assert_eq!(UploadedFile::new(".hidden", Vec::new()).extension(), "");
        assert_eq!(UploadedFile::new("a.tar.XLSX", Vec::new()).extension(), ".xlsx");
    }

    #[test]
    fn test_unsupported_format() {
        let err = UploadedFile::new("report.pdf", Vec::new()).format().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file format: .pdf");
    }

    #[test]
    fn test_info_size_kb() {
        let info = UploadedFile::new("a.csv", vec![b'x'; 1536]).info();
        assert_eq!(info.size_bytes, 1536);
        assert_eq!(info.size_kb, 1.5);
        assert_eq!(info.format, Some(FileFormat::Csv));

        let info = UploadedFile::new("a.pdf", vec![b'x'; 1000]).info();
        assert_eq!(info.size_kb, 0.98);
        assert_eq!(info.format, None);
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("CSV".parse::<FileFormat>().unwrap(), FileFormat::Csv);
        assert_eq!("Excel".parse::<FileFormat>().unwrap(), FileFormat::Xlsx);
        assert_eq!("xlsx".parse::<FileFormat>().unwrap(), FileFormat::Xlsx);
        assert!("pdf".parse::<FileFormat>().is_err());
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(FileFormat::Csv.mime_type(), "text/csv");
        assert_eq!(
            FileFormat::Xlsx.mime_type(),
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        );
    }
}
