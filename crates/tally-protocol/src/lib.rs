//! Cell values exchanged with the Google Sheets API.
//!
//! The Sheets SDK carries cell contents as raw `serde_json::Value`s. This
//! crate gives them a closed type, [`CellValue`], and converts in both
//! directions, along with the render and input options tally passes on every
//! call.
//!
//! On writes, [`CellValue::Null`] becomes JSON `null`, which the API treats as
//! "leave this cell alone"; an empty string clears the cell.

use serde_json::Value;

/// How values should be represented in a read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRenderOption {
    FormattedValue,
    UnformattedValue,
    /// Formulas are returned as written (`=SUM(A1:A3)`), not calculated.
    Formula,
}

impl ValueRenderOption {
    /// The query-parameter spelling of this option.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueRenderOption::FormattedValue => "FORMATTED_VALUE",
            ValueRenderOption::UnformattedValue => "UNFORMATTED_VALUE",
            ValueRenderOption::Formula => "FORMULA",
        }
    }
}

/// How written values should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueInputOption {
    /// Stored as-is.
    Raw,
    /// Parsed as if typed into the UI (numbers, dates, formulas).
    UserEntered,
}

impl ValueInputOption {
    /// The query-parameter spelling of this option.
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueInputOption::Raw => "RAW",
            ValueInputOption::UserEntered => "USER_ENTERED",
        }
    }
}

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
}

impl CellValue {
    /// `true` for a missing value or an empty string.
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text form of the value, as it would be compared against a test name.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::String(s) => s.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Convert a value as the API returns it. Arrays and objects never occur
    /// in cell data and are kept as their JSON text.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n.as_f64().map_or(CellValue::Null, CellValue::Number),
            Value::String(s) => CellValue::String(s.clone()),
            other => CellValue::String(other.to_string()),
        }
    }

    /// Convert to the JSON the API expects in a write.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Bool(b) => Value::Bool(*b),
            CellValue::Number(n) => serde_json::Number::from_f64(*n).map_or(Value::Null, Value::Number),
            CellValue::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_text())
    }
}

/// Rows of cell values. Trailing empty rows and cells are omitted by the API.
pub type Rows = Vec<Vec<CellValue>>;

/// Convert the `values` of a `ValueRange`; a missing field means no rows.
pub fn rows_from_json(values: Option<Vec<Vec<Value>>>) -> Rows {
    values
        .unwrap_or_default()
        .iter()
        .map(|row| row.iter().map(CellValue::from_json).collect())
        .collect()
}

/// Convert rows into the `values` of a `ValueRange` for writing.
pub fn rows_to_json(rows: &Rows) -> Vec<Vec<Value>> {
    rows.iter()
        .map(|row| row.iter().map(CellValue::to_json).collect())
        .collect()
}
