//! Scalar values exchanged with the store
//!
//! [`Value`] is the one representation used for bound query parameters,
//! engine connection settings, inserted cells, and fetched cells.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A scalar (or array of scalars) bound to a statement or read back from one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    /// Boolean, rendered as `1`/`0`
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer that does not fit an `i64`
    UInt(u64),
    /// Floating point number
    Float(f64),
    /// UTF-8 string
    String(String),
    /// Array of values, bound as a comma-separated list
    Array(Vec<Value>),
}

/// Named statement parameters, keyed by placeholder name (without `:`).
pub type Params = BTreeMap<String, Value>;

/// A fetched row, keyed by column name.
pub type Row = BTreeMap<String, Value>;

impl Value {
    /// Returns true for [`Value::Null`]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Borrow the inner string, if this is a [`Value::String`]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Interpret the value as a signed integer.
    ///
    /// Strings are parsed, since the HTTP interface returns 64-bit integers
    /// quoted by default.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::UInt(u) => i64::try_from(*u).ok(),
            Value::Bool(b) => Some(i64::from(*b)),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Convert a decoded JSON cell into a [`Value`]
    pub fn from_json(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                Value::Array(items.iter().map(Value::from_json).collect())
            }
            // Nested objects (Map/Tuple columns) are kept as their JSON text
            serde_json::Value::Object(_) => Value::String(json.to_string()),
        }
    }
}

impl fmt::Display for Value {
    /// Plain (unquoted) rendering, used for engine `SETTINGS` values
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", u8::from(*b)),
            Value::Int(i) => write!(f, "{i}"),
            Value::UInt(u) => write!(f, "{u}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => f.write_str(s),
            Value::Array(items) => {
                let parts: Vec<String> = items.iter().map(ToString::to_string).collect();
                f.write_str(&parts.join(","))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(u: u32) -> Self {
        Value::Int(i64::from(u))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        match i64::try_from(u) {
            Ok(i) => Value::Int(i),
            Err(_) => Value::UInt(u),
        }
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_plain() {
        assert_eq!(Value::from("JSONAsString").to_string(), "JSONAsString");
        assert_eq!(Value::from(1).to_string(), "1");
        assert_eq!(Value::from(true).to_string(), "1");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "a,b");
    }

    #[test]
    fn test_u64_fits_i64() {
        assert_eq!(Value::from(7u64), Value::Int(7));
        assert_eq!(Value::from(u64::MAX), Value::UInt(u64::MAX));
    }

    #[test]
    fn test_as_i64_parses_quoted_integers() {
        assert_eq!(Value::from("1700000000").as_i64(), Some(1_700_000_000));
        assert_eq!(Value::from("abc").as_i64(), None);
        assert_eq!(Value::Float(1.5).as_i64(), None);
    }

    #[test]
    fn test_from_json() {
        let json: serde_json::Value =
            serde_json::from_str(r#"{"a": 1, "b": "x", "c": null, "d": [1, 2], "e": 1.5}"#)
                .unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(Value::from_json(&obj["a"]), Value::Int(1));
        assert_eq!(Value::from_json(&obj["b"]), Value::from("x"));
        assert!(Value::from_json(&obj["c"]).is_null());
        assert_eq!(
            Value::from_json(&obj["d"]),
            Value::Array(vec![Value::Int(1), Value::Int(2)])
        );
        assert_eq!(Value::from_json(&obj["e"]), Value::Float(1.5));
    }

    #[test]
    fn test_untagged_deserialize() {
        let v: Value = serde_json::from_str(r#"["x", 2]"#).unwrap();
        assert_eq!(v, Value::Array(vec![Value::from("x"), Value::Int(2)]));
    }
}
