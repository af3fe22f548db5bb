use serde::{Deserialize, Serialize};
use std::fmt;

/// Text markers that are read as missing values.
///
/// Matched against the whole field, without trimming.
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Represents a cell value in a table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CellValue {
    /// Check if the value is missing
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Check if the value is an integer or a float
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Int(_) | CellValue::Float(_))
    }

    /// Try to get the value as a float.
    ///
    /// Only numeric cells convert; text is never coerced.
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(f) => Some(*f),
            CellValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as a string
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
        }
    }

    /// Render the value as a CSV field.
    ///
    /// Floats keep a fractional part (`20.0`) so they read back as floats.
    #[must_use]
    pub fn to_field(&self) -> String {
        match self {
            CellValue::Float(f) => format!("{f:?}"),
            other => other.as_str(),
        }
    }

    /// Parse a string into a `CellValue` with type inference
    /// Tries: missing -> bool -> int -> float -> string
    ///
    /// Surrounding whitespace is ignored for booleans and numbers only.
    #[must_use]
    pub fn parse(s: &str) -> CellValue {
        if is_missing_marker(s) {
            return CellValue::Null;
        }

        let trimmed = s.trim();

        if let Some(b) = parse_bool(trimmed) {
            return CellValue::Bool(b);
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }

        CellValue::String(s.to_string())
    }

    /// Stable key used for row equality checks.
    pub(crate) fn key(&self) -> String {
        match self {
            CellValue::Null => "N".to_string(),
            CellValue::Bool(b) => format!("B{b}"),
            CellValue::Int(i) => format!("I{i}"),
            // -0.0 and 0.0 are the same value
            CellValue::Float(f) if *f == 0.0 => "F0.0".to_string(),
            CellValue::Float(f) => format!("F{f:?}"),
            CellValue::String(s) => format!("S{s}"),
        }
    }
}

/// Check whether a field is one of the missing-value markers.
#[must_use]
pub fn is_missing_marker(field: &str) -> bool {
    MISSING_MARKERS.contains(&field)
}

fn parse_bool(s: &str) -> Option<bool> {
    if s.eq_ignore_ascii_case("true") {
        Some(true)
    } else if s.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::approx_constant)]
    use super::*;

    #[test]
    fn test_parse_missing() {
        assert_eq!(CellValue::parse(""), CellValue::Null);
        assert_eq!(CellValue::parse("NA"), CellValue::Null);
        assert_eq!(CellValue::parse("NaN"), CellValue::Null);
        assert_eq!(CellValue::parse("null"), CellValue::Null);
        assert_eq!(CellValue::parse("None"), CellValue::Null);
        assert_eq!(CellValue::parse("n/a"), CellValue::Null);
        assert_eq!(CellValue::parse("#N/A"), CellValue::Null);
        assert_eq!(CellValue::parse("<NA>"), CellValue::Null);
        assert_eq!(CellValue::parse("-1.#QNAN"), CellValue::Null);
    }

    #[test]
    fn test_parse_markers_are_exact() {
        assert_eq!(CellValue::parse("  "), CellValue::String("  ".to_string()));
        assert_eq!(CellValue::parse(" NA"), CellValue::String(" NA".to_string()));
        assert_eq!(CellValue::parse(" 42 "), CellValue::Int(42));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(CellValue::parse("true"), CellValue::Bool(true));
        assert_eq!(CellValue::parse("FALSE"), CellValue::Bool(false));
        // yes/no stay text
        assert_eq!(CellValue::parse("yes"), CellValue::String("yes".to_string()));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(CellValue::parse("42"), CellValue::Int(42));
        assert_eq!(CellValue::parse("-123"), CellValue::Int(-123));
        assert_eq!(CellValue::parse("3.14"), CellValue::Float(3.14));
    }

    #[test]
    fn test_parse_string_keeps_original_text() {
        assert_eq!(
            CellValue::parse(" hello "),
            CellValue::String(" hello ".to_string())
        );
    }

    #[test]
    fn test_to_field_keeps_float_marker() {
        assert_eq!(CellValue::Float(20.0).to_field(), "20.0");
        assert_eq!(CellValue::Float(0.5).to_field(), "0.5");
        assert_eq!(CellValue::Int(20).to_field(), "20");
        assert_eq!(CellValue::Null.to_field(), "");
        assert_eq!(CellValue::parse(&CellValue::Float(20.0).to_field()), CellValue::Float(20.0));
    }

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::Int(42).as_float(), Some(42.0));
        assert_eq!(CellValue::String("42".to_string()).as_float(), None);
        assert!(CellValue::Float(1.5).is_numeric());
        assert!(!CellValue::Bool(true).is_numeric());
    }

    #[test]
    fn test_keys_distinguish_types() {
        assert_ne!(CellValue::Int(1).key(), CellValue::String("1".to_string()).key());
        assert_ne!(CellValue::Int(1).key(), CellValue::Float(1.0).key());
        assert_eq!(CellValue::Null.key(), CellValue::Null.key());
    }

    #[test]
    fn test_key_treats_signed_zero_as_equal() {
        assert_eq!(CellValue::Float(-0.0).key(), CellValue::Float(0.0).key());
        assert_ne!(CellValue::Float(-1.0).key(), CellValue::Float(1.0).key());
    }
}
