use crate::cell::{is_missing_marker, CellValue};
use crate::error::Result;
use crate::table::Table;
use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::Workbook;
use std::io::Cursor;

/// Name of the single worksheet written on export.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// Convert calamine Data to CellValue
fn data_to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Null,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) if f.is_nan() => CellValue::Null,
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if is_missing_marker(s) => CellValue::Null,
        Data::String(s) => CellValue::String(s.clone()),
        // Excel stores dates as days since 1899-12-30
        Data::DateTime(dt) => CellValue::Float(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(format!("#ERROR: {e:?}")),
    }
}

/// Header cells are taken as written, markers included.
fn header_name(data: &Data) -> String {
    match data {
        Data::String(s) => s.clone(),
        other => data_to_cell_value(other).as_str(),
    }
}

impl Table {
    /// Load a table from the first worksheet of an Excel workbook.
    ///
    /// The first row is the header. A workbook without worksheets, or an
    /// empty first worksheet, gives an empty table.
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not a readable workbook.
    pub fn from_xlsx_bytes(bytes: &[u8]) -> Result<Self> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

        let range = match workbook.worksheet_range_at(0) {
            Some(range) => range?,
            None => return Ok(Table::new()),
        };

        let mut rows = range.rows();
        let header: Vec<String> = match rows.next() {
            Some(row) => row.iter().map(header_name).collect(),
            None => return Ok(Table::new()),
        };
        let data: Vec<Vec<CellValue>> = rows
            .map(|row| row.iter().map(data_to_cell_value).collect())
            .collect();

        let mut table = Table::from_rows(&header, data)?;
        table.unify_column_types();
        Ok(table)
    }

    /// Serialize the table as a single-sheet workbook.
    ///
    /// # Errors
    ///
    /// Returns error if the workbook cannot be written.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(DEFAULT_SHEET_NAME)?;

        for (col_idx, name) in self.column_names().iter().enumerate() {
            worksheet.write_string(0, column_number(col_idx)?, name)?;
        }

        for (row_idx, row) in self.rows().enumerate() {
            let row_num = u32::try_from(row_idx + 1).map_err(|_| {
                rust_xlsxwriter::XlsxError::RowColumnLimitError
            })?;
            for (col_idx, cell) in row.iter().enumerate() {
                let col_num = column_number(col_idx)?;

                match cell {
                    CellValue::Null => {} // Leave empty
                    CellValue::Bool(b) => {
                        worksheet.write_boolean(row_num, col_num, *b)?;
                    }
                    CellValue::Int(i) => {
                        // Note: Excel stores all numbers as f64, so integers > 2^53
                        // (9,007,199,254,740,992) may lose precision
                        worksheet.write_number(row_num, col_num, *i as f64)?;
                    }
                    CellValue::Float(f) => {
                        worksheet.write_number(row_num, col_num, *f)?;
                    }
                    CellValue::String(s) => {
                        worksheet.write_string(row_num, col_num, s)?;
                    }
                }
            }
        }

        Ok(workbook.save_to_buffer()?)
    }
}

fn column_number(col_idx: usize) -> Result<u16> {
    u16::try_from(col_idx).map_err(|_| rust_xlsxwriter::XlsxError::RowColumnLimitError.into())
}
