//! Table module for sweeper
//!
//! An in-memory table of named, equal-length columns with per-column type
//! inference, CSV and Excel codecs, and the cleaning operations the
//! pipeline applies.
//!
//! # Examples
//!
//! ## Loading from CSV
//!
//! ```
//! use sweeper_sheet::{CellValue, ColumnType, Table};
//!
//! let table = Table::from_csv_str("region,revenue\nnorth,10\nsouth,").unwrap();
//!
//! assert_eq!(table.column_names(), &["region", "revenue"]);
//! assert_eq!(table.column_type(1), ColumnType::Integer);
//! assert_eq!(table.get(1, 1), Some(&CellValue::Null));
//! ```
//!
//! ## Cleaning
//!
//! ```
//! use sweeper_sheet::{CellValue, Table};
//!
//! let mut table = Table::from_csv_str("v\n10\nNA\n30\n10").unwrap();
//! table.remove_duplicates();
//! table.fill_missing_with_mean();
//!
//! assert_eq!(table.row_count(), 3);
//! assert_eq!(table.get(1, 0), Some(&CellValue::Float(20.0)));
//! ```
//!
//! ## Exporting
//!
//! ```
//! use sweeper_sheet::Table;
//!
//! let table = Table::from_csv_str("a,b\n1,x").unwrap();
//! let xlsx = table.to_xlsx_bytes().unwrap();
//! let back = Table::from_xlsx_bytes(&xlsx).unwrap();
//!
//! assert_eq!(back, table);
//! ```

mod cell;
mod csv;
mod error;
mod table;
mod xlsx;

/// Re-export cell value type.
pub use cell::{CellValue, MISSING_MARKERS};
/// Re-export table error types.
pub use error::{Result, SheetError};
/// Re-export table types.
pub use table::{ColumnType, Table};
/// Re-export the exported worksheet name.
pub use xlsx::DEFAULT_SHEET_NAME;
