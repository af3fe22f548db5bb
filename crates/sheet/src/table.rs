use crate::cell::CellValue;
use crate::error::{Result, SheetError};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Float,
    Boolean,
    Text,
    /// Every cell is missing.
    Empty,
}

impl ColumnType {
    /// Integer and float columns are numeric. Empty columns are not.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    /// Classify a sequence of cells.
    pub fn classify<'a, I>(cells: I) -> Self
    where
        I: IntoIterator<Item = &'a CellValue>,
    {
        let mut ty = ColumnType::Empty;
        for cell in cells {
            let cell_ty = match cell {
                CellValue::Null => continue,
                CellValue::Int(_) => ColumnType::Integer,
                CellValue::Float(_) => ColumnType::Float,
                CellValue::Bool(_) => ColumnType::Boolean,
                CellValue::String(_) => return ColumnType::Text,
            };
            ty = match (ty, cell_ty) {
                (ColumnType::Empty, t) => t,
                (a, b) if a == b => a,
                (ColumnType::Integer, ColumnType::Float) | (ColumnType::Float, ColumnType::Integer) => {
                    ColumnType::Float
                }
                _ => return ColumnType::Text,
            };
        }
        ty
    }
}

/// A table of named columns (row-major storage).
///
/// Every row holds exactly one cell per column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    column_index: HashMap<String, usize>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    /// Create an empty table with no columns and no rows
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a header and rows.
    ///
    /// Blank header names become `Unnamed: <index>` and repeated names get a
    /// `.1`, `.2`, ... suffix.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::LengthMismatch` if a row does not have one cell per column.
    pub fn from_rows<S, T>(columns: &[S], rows: Vec<Vec<T>>) -> Result<Self>
    where
        S: AsRef<str>,
        T: Into<CellValue>,
    {
        let columns = normalize_headers(columns.iter().map(|c| c.as_ref().to_string()));
        let width = columns.len();
        let mut data = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != width {
                return Err(SheetError::LengthMismatch {
                    expected: width,
                    actual: row.len(),
                });
            }
            data.push(row.into_iter().map(Into::into).collect());
        }

        let mut table = Table {
            columns,
            column_index: HashMap::new(),
            rows: data,
        };
        table.rebuild_column_index();
        Ok(table)
    }

    /// Get the column names in order
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Get the number of rows (header excluded)
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Get the number of columns
    #[must_use]
    pub fn col_count(&self) -> usize {
        self.columns.len()
    }

    /// Check if the table has no rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over the data rows
    pub fn rows(&self) -> impl Iterator<Item = &Vec<CellValue>> {
        self.rows.iter()
    }

    /// Get a cell value by row and column index (0-based, header excluded)
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    /// Get a cell value by row index and column name
    pub fn get_by_name(&self, row: usize, name: &str) -> Result<Option<&CellValue>> {
        let col = self.column_position(name)?;
        Ok(self.get(row, col))
    }

    /// Get all values of a column
    pub fn column_by_name(&self, name: &str) -> Result<Vec<&CellValue>> {
        let col = self.column_position(name)?;
        Ok(self.column_cells(col).collect())
    }

    /// Inferred type of the column at `col`.
    #[must_use]
    pub fn column_type(&self, col: usize) -> ColumnType {
        ColumnType::classify(self.column_cells(col))
    }

    /// Inferred types of all columns, in column order.
    #[must_use]
    pub fn column_types(&self) -> Vec<ColumnType> {
        (0..self.col_count()).map(|c| self.column_type(c)).collect()
    }

    /// Positions of numeric columns, in column order.
    #[must_use]
    pub fn numeric_columns(&self) -> Vec<usize> {
        (0..self.col_count())
            .filter(|&c| self.column_type(c).is_numeric())
            .collect()
    }

    // ===== Cleaning =====

    /// Remove rows that exactly duplicate an earlier row, keeping the first.
    /// Returns the number of rows removed.
    pub fn remove_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen = HashSet::new();
        self.rows.retain(|row| {
            let mut key = String::new();
            for cell in row {
                key.push_str(&cell.key());
                key.push('\x1f');
            }
            seen.insert(key)
        });
        before - self.rows.len()
    }

    /// Replace missing cells of every numeric column with the column mean.
    ///
    /// Non-numeric columns are left alone, and so are columns where every
    /// cell is missing. Returns the number of cells filled.
    pub fn fill_missing_with_mean(&mut self) -> usize {
        let mut filled = 0;
        for col in self.numeric_columns() {
            let (sum, count) = self
                .column_cells(col)
                .filter_map(CellValue::as_float)
                .fold((0.0_f64, 0usize), |(sum, count), v| (sum + v, count + 1));
            if count == 0 {
                continue;
            }
            let mean = sum / count as f64;

            for row in &mut self.rows {
                if row[col].is_null() {
                    row[col] = CellValue::Float(mean);
                    filled += 1;
                }
            }
        }
        filled
    }

    // ===== Selection =====

    /// Keep only the named columns, in their original order.
    ///
    /// # Errors
    ///
    /// Returns `SheetError::ColumnNotFound` for a name the table does not have;
    /// the table is left unchanged.
    pub fn select_columns<S: AsRef<str>>(&mut self, columns: &[S]) -> Result<()> {
        let wanted: HashSet<usize> = columns
            .iter()
            .map(|name| self.column_position(name.as_ref()))
            .collect::<Result<_>>()?;

        let keep: Vec<usize> = (0..self.col_count()).filter(|i| wanted.contains(i)).collect();

        for row in &mut self.rows {
            let new_row: Vec<CellValue> = keep.iter().map(|&i| row[i].clone()).collect();
            *row = new_row;
        }
        self.columns = keep.iter().map(|&i| self.columns[i].clone()).collect();
        self.rebuild_column_index();

        Ok(())
    }

    /// Copy of the table narrowed to the named columns.
    pub fn selected<S: AsRef<str>>(&self, columns: &[S]) -> Result<Table> {
        let mut table = self.clone();
        table.select_columns(columns)?;
        Ok(table)
    }

    /// Rows as records (column name -> value), up to `limit` rows.
    #[must_use]
    pub fn to_records(&self, limit: usize) -> Vec<IndexMap<String, CellValue>> {
        self.rows
            .iter()
            .take(limit)
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }

    // ===== Internal =====

    pub(crate) fn column_cells(&self, col: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().filter_map(move |row| row.get(col))
    }

    /// Rewrite each column so its cells share one representation.
    ///
    /// Numeric columns whose values are all integral become integers, other
    /// numeric columns become floats, and columns mixing text with anything
    /// else become text.
    pub(crate) fn unify_column_types(&mut self) {
        for col in 0..self.col_count() {
            match self.column_type(col) {
                ColumnType::Float => {
                    let integral = self
                        .column_cells(col)
                        .filter_map(CellValue::as_float)
                        .all(is_integral);
                    for row in &mut self.rows {
                        if let Some(v) = row[col].as_float() {
                            row[col] = if integral {
                                CellValue::Int(v as i64)
                            } else {
                                CellValue::Float(v)
                            };
                        }
                    }
                }
                ColumnType::Text => {
                    for row in &mut self.rows {
                        if !row[col].is_null() && !matches!(row[col], CellValue::String(_)) {
                            row[col] = CellValue::String(row[col].as_str());
                        }
                    }
                }
                ColumnType::Integer | ColumnType::Boolean | ColumnType::Empty => {}
            }
        }
    }

    fn column_position(&self, name: &str) -> Result<usize> {
        self.column_index
            .get(name)
            .copied()
            .ok_or_else(|| SheetError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    fn rebuild_column_index(&mut self) {
        self.column_index = self
            .columns
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
    }
}

/// Largest magnitude at which every integer is exactly representable as f64.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

#[allow(clippy::float_cmp)]
fn is_integral(v: f64) -> bool {
    v.is_finite() && v.abs() <= MAX_SAFE_INTEGER && v.trunc() == v
}

/// Make header names non-blank and unique.
fn normalize_headers<I>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut taken = HashSet::new();
    let mut counters: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::new();

    for (i, name) in raw.into_iter().enumerate() {
        let base = if name.trim().is_empty() {
            format!("Unnamed: {i}")
        } else {
            name
        };
        let mut candidate = base.clone();
        while taken.contains(&candidate) {
            let n = counters.entry(base.clone()).or_insert(0);
            *n += 1;
            candidate = format!("{base}.{n}");
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers() -> Table {
        Table::from_rows(
            &["name", "score", "ratio"],
            vec![
                vec![CellValue::from("a"), CellValue::Int(10), CellValue::Float(0.5)],
                vec![CellValue::from("b"), CellValue::Null, CellValue::Float(1.5)],
                vec![CellValue::Null, CellValue::Int(30), CellValue::Null],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let result = Table::from_rows(&["a", "b"], vec![vec![1, 2], vec![3]]);
        assert!(matches!(
            result,
            Err(SheetError::LengthMismatch {
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_normalize_headers() {
        let names = normalize_headers(
            ["a", "", "a", "a", "a.1"].iter().map(|s| (*s).to_string()),
        );
        assert_eq!(names, vec!["a", "Unnamed: 1", "a.1", "a.2", "a.1.1"]);
    }

    #[test]
    fn test_column_types() {
        let table = numbers();
        assert_eq!(
            table.column_types(),
            vec![ColumnType::Text, ColumnType::Integer, ColumnType::Float]
        );
        assert_eq!(table.numeric_columns(), vec![1, 2]);
    }

    #[test]
    fn test_classify_mixed() {
        let cells = [CellValue::Int(1), CellValue::Float(2.5), CellValue::Null];
        assert_eq!(ColumnType::classify(&cells), ColumnType::Float);

        let cells = [CellValue::Int(1), CellValue::Bool(true)];
        assert_eq!(ColumnType::classify(&cells), ColumnType::Text);

        let cells = [CellValue::Null, CellValue::Null];
        assert_eq!(ColumnType::classify(&cells), ColumnType::Empty);
        assert!(!ColumnType::Empty.is_numeric());
    }

    #[test]
    fn test_remove_duplicates_keeps_first() {
        let mut table = Table::from_rows(
            &["k", "v"],
            vec![vec![1, 1], vec![2, 2], vec![1, 1], vec![1, 3]],
        )
        .unwrap();

        assert_eq!(table.remove_duplicates(), 1);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.get(2, 1), Some(&CellValue::Int(3)));
        assert_eq!(table.remove_duplicates(), 0);
    }

    #[test]
    fn test_remove_duplicates_treats_missing_as_equal() {
        let mut table = Table::from_rows(
            &["k"],
            vec![vec![CellValue::Null], vec![CellValue::Null]],
        )
        .unwrap();
        assert_eq!(table.remove_duplicates(), 1);
    }

    #[test]
    fn test_remove_duplicates_signed_zero() {
        let mut table = Table::from_csv_str("x,y\n0.0,a\n-0.0,a\n-1.5,a\n1.5,a\n").unwrap();
        assert_eq!(table.remove_duplicates(), 1);
        assert_eq!(table.row_count(), 3);
    }

    #[test]
    fn test_fill_missing_with_mean() {
        let mut table = numbers();
        let filled = table.fill_missing_with_mean();

        assert_eq!(filled, 2);
        assert_eq!(table.get(1, 1), Some(&CellValue::Float(20.0)));
        assert_eq!(table.get(2, 2), Some(&CellValue::Float(1.0)));
        // text column untouched
        assert_eq!(table.get(2, 0), Some(&CellValue::Null));
    }

    #[test]
    fn test_fill_missing_leaves_empty_column() {
        let mut table = Table::from_rows(
            &["x", "y"],
            vec![
                vec![CellValue::Int(1), CellValue::Null],
                vec![CellValue::Null, CellValue::Null],
            ],
        )
        .unwrap();

        assert_eq!(table.fill_missing_with_mean(), 1);
        assert_eq!(table.get(1, 0), Some(&CellValue::Float(1.0)));
        assert_eq!(table.get(0, 1), Some(&CellValue::Null));
        assert_eq!(table.get(1, 1), Some(&CellValue::Null));
    }

    #[test]
    fn test_select_columns_keeps_original_order() {
        let mut table = numbers();
        table.select_columns(&["ratio", "name"]).unwrap();

        assert_eq!(table.column_names(), &["name", "ratio"]);
        assert_eq!(table.get(1, 1), Some(&CellValue::Float(1.5)));
        assert_eq!(table.get_by_name(0, "ratio").unwrap(), Some(&CellValue::Float(0.5)));
    }

    #[test]
    fn test_select_unknown_column_leaves_table() {
        let mut table = numbers();
        let before = table.clone();
        let result = table.select_columns(&["name", "missing"]);

        assert!(matches!(result, Err(SheetError::ColumnNotFound { name }) if name == "missing"));
        assert_eq!(table, before);
    }

    #[test]
    fn test_select_no_columns() {
        let mut table = numbers();
        table.select_columns::<&str>(&[]).unwrap();

        assert_eq!(table.col_count(), 0);
        assert_eq!(table.row_count(), 3);
        assert!(table.numeric_columns().is_empty());
        assert_eq!(table.remove_duplicates(), 2);
    }

    #[test]
    fn test_unify_column_types() {
        let mut table = Table::from_rows(
            &["whole", "frac", "mixed"],
            vec![
                vec![CellValue::Float(1.0), CellValue::Int(1), CellValue::from("x")],
                vec![CellValue::Float(2.0), CellValue::Float(2.5), CellValue::Float(3.0)],
            ],
        )
        .unwrap();

        table.unify_column_types();

        assert_eq!(table.get(0, 0), Some(&CellValue::Int(1)));
        assert_eq!(table.get(0, 1), Some(&CellValue::Float(1.0)));
        assert_eq!(table.get(1, 2), Some(&CellValue::String("3".to_string())));
    }

    #[test]
    fn test_to_records() {
        let table = numbers();
        let records = table.to_records(2);

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["name"], CellValue::from("a"));
        assert_eq!(records[1].keys().collect::<Vec<_>>(), vec!["name", "score", "ratio"]);
    }
}
