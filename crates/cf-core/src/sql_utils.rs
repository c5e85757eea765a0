//! SQL literal utilities
//!
//! Provides escaping for values spliced into ClickHouse SQL text: string
//! literals inside rendered DDL and bound parameter values.

use crate::value::Value;

/// Escape a value for use inside a single-quoted ClickHouse string literal.
///
/// Backslashes are doubled first, then single quotes are backslash-escaped.
///
/// # Examples
/// ```
/// use cf_core::sql_utils::escape_sql_string;
/// assert_eq!(escape_sql_string("it's"), r"it\'s");
/// assert_eq!(escape_sql_string(r"a\b"), r"a\\b");
/// ```
pub fn escape_sql_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Wrap a string in single quotes, escaping its content.
pub fn quote_string(value: &str) -> String {
    format!("'{}'", escape_sql_string(value))
}

/// Render a [`Value`] as a SQL literal.
///
/// Arrays render as a comma-separated list without surrounding parentheses,
/// so that `col IN (:values)` binds naturally.
///
/// # Examples
/// ```
/// use cf_core::sql_utils::to_sql_literal;
/// use cf_core::Value;
/// assert_eq!(to_sql_literal(&Value::from("a")), "'a'");
/// assert_eq!(to_sql_literal(&Value::from(vec!["a", "b"])), "'a','b'");
/// assert_eq!(to_sql_literal(&Value::Null), "NULL");
/// ```
pub fn to_sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => u8::from(*b).to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(x) if x.is_finite() => x.to_string(),
        Value::Float(_) => "NULL".to_string(),
        Value::String(s) => quote_string(s),
        Value::Array(items) => items
            .iter()
            .map(to_sql_literal)
            .collect::<Vec<_>>()
            .join(","),
    }
}
