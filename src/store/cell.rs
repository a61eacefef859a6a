use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{Error, Result};

/// A single spreadsheet cell as returned by (or sent to) the Sheets values API.
///
/// JSON `null` maps to [`CellValue::Empty`]. Integral numbers are written back
/// as JSON integers so an id of `2` does not turn into `2.0` in the sheet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum CellValue {
    String(String),
    Number(f64),
    Bool(bool),
    #[default]
    Empty,
}

/// Largest magnitude below which every integer is exactly representable in `f64`.
const EXACT_INT_LIMIT: f64 = 9_007_199_254_740_992.0;

fn integral(n: f64) -> Option<i64> {
    (n.is_finite() && n.fract() == 0.0 && n.abs() < EXACT_INT_LIMIT).then_some(n as i64)
}

impl CellValue {
    /// The string form used for filter matching and display.
    ///
    /// Booleans render as `TRUE`/`FALSE`, matching what the sheet shows.
    pub fn as_string(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Number(n) => match integral(*n) {
                Some(i) => i.to_string(),
                None => n.to_string(),
            },
            CellValue::Bool(true) => "TRUE".to_string(),
            CellValue::Bool(false) => "FALSE".to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Interprets the cell as a base-10 integer.
    pub fn as_int(&self) -> Result<i64> {
        match self {
            CellValue::String(s) => s.trim().parse::<i64>().map_err(|e| Error::parse(s, e)),
            CellValue::Number(n) => {
                integral(*n).ok_or_else(|| Error::parse(n.to_string(), "not an integral number"))
            }
            CellValue::Bool(_) => Err(Error::parse(self.as_string(), "boolean is not a number")),
            CellValue::Empty => Err(Error::parse("", "cell is empty")),
        }
    }

    /// True for an absent cell or an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::String(s) => s.is_empty(),
            _ => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl From<Value> for CellValue {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => CellValue::Empty,
            Value::Bool(b) => CellValue::Bool(b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Empty),
            Value::String(s) => CellValue::String(s),
            other => CellValue::String(other.to_string()),
        }
    }
}

impl From<CellValue> for Value {
    fn from(c: CellValue) -> Self {
        match c {
            CellValue::String(s) => Value::String(s),
            CellValue::Number(n) => match integral(n) {
                Some(i) => Value::from(i),
                None => serde_json::Number::from_f64(n)
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
            },
            CellValue::Bool(b) => Value::Bool(b),
            CellValue::Empty => Value::Null,
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

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}
