use crate::cell::{is_missing_marker, CellValue};
use crate::error::{Result, SheetError};
use crate::table::Table;
use std::io::{Read, Write};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl Table {
    /// Load a table from CSV bytes. The first record is the header.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_csv_reader(bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes))
    }

    /// Load a table from a CSV string
    pub fn from_csv_str(content: &str) -> Result<Self> {
        Self::from_csv_bytes(content.as_bytes())
    }

    /// Load a table from a reader.
    ///
    /// Rows shorter than the header are padded with missing cells.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::RowTooLong` for a row with more fields than the header.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false) // We handle headers ourselves
            .flexible(true)
            .from_reader(reader);

        let mut records = csv_reader.records();
        let header = match records.next() {
            Some(record) => record?,
            None => return Ok(Table::new()),
        };
        let width = header.len();

        let mut raw: Vec<Vec<String>> = Vec::new();
        for (row_idx, result) in records.enumerate() {
            let record = result?;
            if record.len() > width {
                return Err(SheetError::RowTooLong {
                    row: row_idx + 1,
                    expected: width,
                    actual: record.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            raw.push(row);
        }

        let columns: Vec<String> = header.iter().map(str::to_string).collect();
        let rows = infer_rows(raw, width);

        Table::from_rows(&columns, rows)
    }

    /// Write the table to a writer as CSV, header first.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> Result<()> {
        // csv writes an empty record as `""`; an empty header is a bare line
        if self.col_count() == 0 {
            writer.write_all(b"\n")?;
            writer.flush()?;
            return Ok(());
        }

        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(self.column_names())?;
        for row in self.rows() {
            let record: Vec<String> = row.iter().map(CellValue::to_field).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Serialize the table to CSV bytes
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        Ok(buffer)
    }

    /// Convert the table to a CSV string
    #[must_use]
    pub fn to_csv_string(&self) -> String {
        let buffer = self.to_csv_bytes().unwrap_or_default();
        String::from_utf8_lossy(&buffer).to_string()
    }
}

/// Infer one type per column from raw fields.
///
/// A column whose fields do not all agree on a number or boolean type keeps
/// every non-missing field as its original text.
fn infer_rows(raw: Vec<Vec<String>>, width: usize) -> Vec<Vec<CellValue>> {
    let mut parsed: Vec<Vec<CellValue>> = raw
        .iter()
        .map(|row| row.iter().map(|field| CellValue::parse(field)).collect())
        .collect();

    for col in 0..width {
        let mut has_int = false;
        let mut has_float = false;
        let mut has_bool = false;
        let mut has_text = false;
        for row in &parsed {
            match &row[col] {
                CellValue::Int(_) => has_int = true,
                CellValue::Float(_) => has_float = true,
                CellValue::Bool(_) => has_bool = true,
                CellValue::String(_) => has_text = true,
                CellValue::Null => {}
            }
        }

        let numeric = has_int || has_float;
        if has_text || (numeric && has_bool) {
            for (row, raw_row) in parsed.iter_mut().zip(&raw) {
                if !is_missing_marker(&raw_row[col]) {
                    row[col] = CellValue::String(raw_row[col].clone());
                }
            }
        } else if has_int && has_float {
            for row in &mut parsed {
                if let CellValue::Int(i) = row[col] {
                    row[col] = CellValue::Float(i as f64);
                }
            }
        }
    }

    parsed
}
