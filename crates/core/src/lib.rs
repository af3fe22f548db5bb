//! # sweeper-core
//!
//! The per-file pipeline of sweeper: load an upload, clean it, select
//! columns, chart and export.
//!
//! This crate provides:
//! - Upload and format types
//! - The loader and exporter
//! - [`Session`], the per-file state driven by [`Action`]s
//! - A batch runner that isolates failures per file
//!
//! ```
//! use sweeper_core::{Action, FileFormat, Outcome, Session, UploadedFile};
//!
//! let upload = UploadedFile::new("sales.csv", "region,revenue\nnorth,10\nnorth,10\n");
//! let mut session = Session::open(&upload).unwrap();
//! session.apply(Action::RemoveDuplicates).unwrap();
//!
//! let Outcome::Artifact(artifact) = session
//!     .apply(Action::Export { format: FileFormat::Xlsx })
//!     .unwrap()
//! else {
//!     unreachable!()
//! };
//! assert_eq!(artifact.file_name, "sales.xlsx");
//! ```

/// Batch processing over many uploads.
pub mod batch;
/// Error types and result aliases.
pub mod error;
/// Table serialization for download.
pub mod export;
/// Upload parsing.
pub mod loader;
/// Per-file session and action dispatch.
pub mod session;
/// Uploaded files and formats.
pub mod upload;

pub use batch::{process, run_batch, FileReport, Plan, ProcessedFile};
pub use error::{SweepError, SweepResult};
pub use export::{export, output_file_name, ExportArtifact};
pub use loader::load;
pub use session::{Action, ColumnSummary, Outcome, Session, SessionView, Stage, Step};
pub use upload::{FileFormat, FileInfo, UploadedFile, CSV_MIME, XLSX_MIME};

/// Re-export the table layer.
pub use sweeper_sheet as sheet;
/// Re-export chart types.
pub use sweeper_viz::ChartSpec;
