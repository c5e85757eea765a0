//! Expression helpers for composing SELECT lists
//!
//! Pure string templating; none of these touch a builder or the store.
//! Sources are spliced verbatim, JSON keys and list items are quoted.

use crate::error::{SqlError, SqlResult};
use cf_core::sql_utils::{escape_sql_string, quote_string};

/// Default scale for [`to_decimal128`]
pub const DECIMAL_PRECISION_DEFAULT: u8 = 18;

fn json_extract(function: &str, source: &str, key: &str) -> String {
    format!("{}({}, {})", function, source, quote_string(key))
}

pub fn json_extract_string(source: &str, key: &str) -> String {
    json_extract("JSONExtractString", source, key)
}

pub fn json_extract_bool(source: &str, key: &str) -> String {
    json_extract("JSONExtractBool", source, key)
}

pub fn json_extract_float(source: &str, key: &str) -> String {
    json_extract("JSONExtractFloat", source, key)
}

pub fn json_extract_uint(source: &str, key: &str) -> String {
    json_extract("JSONExtractUInt", source, key)
}

pub fn json_extract_int(source: &str, key: &str) -> String {
    json_extract("JSONExtractInt", source, key)
}

pub fn json_extract_raw(source: &str, key: &str) -> String {
    json_extract("JSONExtractRaw", source, key)
}

/// Raw extraction folded over every key of `path`
///
/// ```
/// use cf_sql::expr::json_extract_raw_by_path;
/// assert_eq!(
///     json_extract_raw_by_path("payload", &["bet", "amount"]).unwrap(),
///     "JSONExtractRaw(JSONExtractRaw(payload, 'bet'), 'amount')"
/// );
/// ```
pub fn json_extract_raw_by_path<S: AsRef<str>>(source: &str, path: &[S]) -> SqlResult<String> {
    let (first, rest) = path.split_first().ok_or(SqlError::EmptyKeyChain)?;
    Ok(rest.iter().fold(
        json_extract_raw(source, first.as_ref()),
        |acc, key| json_extract_raw(&acc, key.as_ref()),
    ))
}

/// Like [`json_extract_raw_by_path`], but the last key is extracted as a string
pub fn json_extract_string_by_path<S: AsRef<str>>(source: &str, path: &[S]) -> SqlResult<String> {
    let (last, init) = path.split_last().ok_or(SqlError::EmptyKeyChain)?;
    let inner = match init {
        [] => source.to_string(),
        _ => json_extract_raw_by_path(source, init)?,
    };
    Ok(json_extract_string(&inner, last.as_ref()))
}

pub fn from_unix_time(source: &str) -> String {
    format!("FROM_UNIXTIME({source})")
}

/// `toDecimal128[OrNull](source,precision)`
pub fn to_decimal128(source: &str, precision: u8, or_null: bool) -> String {
    format!(
        "toDecimal128{}({},{})",
        if or_null { "OrNull" } else { "" },
        source,
        precision
    )
}

pub fn to_uint64(source: &str, or_null: bool) -> String {
    format!("toUInt64{}({})", if or_null { "OrNull" } else { "" }, source)
}

pub fn to_uuid(source: &str, or_null: bool) -> String {
    format!("toUUID{}({})", if or_null { "OrNull" } else { "" }, source)
}

pub fn ternary(condition: &str, then: &str, otherwise: &str) -> String {
    format!("{condition} ? {then} : {otherwise}")
}

pub fn is_null(expression: &str) -> String {
    format!("({expression}) IS NULL")
}

/// `expr IN ('a','b')`
pub fn is_in<S: AsRef<str>>(expression: &str, list: &[S]) -> String {
    let items: Vec<String> = list
        .iter()
        .map(|item| escape_sql_string(item.as_ref()))
        .collect();
    format!("{} IN ('{}')", expression, items.join("','"))
}

/// UInt64 read from a JSON path that may hold a number or a numeric string
pub fn json_extract_uint64_safe<S: AsRef<str>>(source: &str, path: &[S]) -> SqlResult<String> {
    let raw = to_uint64(&json_extract_raw_by_path(source, path)?, true);
    let string = to_uint64(&json_extract_string_by_path(source, path)?, true);
    Ok(ternary(&is_null(&raw), &string, &raw))
}

/// Decimal128 read from a JSON path that may hold a number or a numeric string
pub fn json_extract_decimal128_safe<S: AsRef<str>>(source: &str, path: &[S]) -> SqlResult<String> {
    let raw = to_decimal128(
        &json_extract_raw_by_path(source, path)?,
        DECIMAL_PRECISION_DEFAULT,
        true,
    );
    let string = to_decimal128(
        &json_extract_string_by_path(source, path)?,
        DECIMAL_PRECISION_DEFAULT,
        true,
    );
    Ok(ternary(&is_null(&raw), &string, &raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_extractors() {
        assert_eq!(
            json_extract_string("payload", "currency"),
            "JSONExtractString(payload, 'currency')"
        );
        assert_eq!(
            json_extract_bool("payload", "is_demo"),
            "JSONExtractBool(payload, 'is_demo')"
        );
        assert_eq!(json_extract_float("p", "x"), "JSONExtractFloat(p, 'x')");
        assert_eq!(json_extract_uint("p", "x"), "JSONExtractUInt(p, 'x')");
        assert_eq!(json_extract_int("p", "x"), "JSONExtractInt(p, 'x')");
    }

    #[test]
    fn test_string_by_path() {
        assert_eq!(
            json_extract_string_by_path("payload", &["round", "game", "id"]).unwrap(),
            "JSONExtractString(JSONExtractRaw(JSONExtractRaw(payload, 'round'), 'game'), 'id')"
        );
        assert_eq!(
            json_extract_string_by_path("payload", &["id"]).unwrap(),
            "JSONExtractString(payload, 'id')"
        );
    }

    #[test]
    fn test_empty_path_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            json_extract_raw_by_path("p", &empty),
            Err(SqlError::EmptyKeyChain)
        ));
        assert!(json_extract_string_by_path("p", &empty).is_err());
        assert!(json_extract_uint64_safe("p", &empty).is_err());
        assert!(json_extract_decimal128_safe("p", &empty).is_err());
    }

    #[test]
    fn test_uint64_safe() {
        assert_eq!(
            json_extract_uint64_safe("payload", &["bet", "id"]).unwrap(),
            "(toUInt64OrNull(JSONExtractRaw(JSONExtractRaw(payload, 'bet'), 'id'))) IS NULL \
             ? toUInt64OrNull(JSONExtractString(JSONExtractRaw(payload, 'bet'), 'id')) \
             : toUInt64OrNull(JSONExtractRaw(JSONExtractRaw(payload, 'bet'), 'id'))"
        );
    }

    #[test]
    fn test_decimal128_safe() {
        assert_eq!(
            json_extract_decimal128_safe("p", &["amount"]).unwrap(),
            "(toDecimal128OrNull(JSONExtractRaw(p, 'amount'),18)) IS NULL \
             ? toDecimal128OrNull(JSONExtractString(p, 'amount'),18) \
             : toDecimal128OrNull(JSONExtractRaw(p, 'amount'),18)"
        );
    }

    #[test]
    fn test_conversions() {
        assert_eq!(from_unix_time("ts"), "FROM_UNIXTIME(ts)");
        assert_eq!(to_decimal128("x", 4, false), "toDecimal128(x,4)");
        assert_eq!(to_uint64("x", false), "toUInt64(x)");
        assert_eq!(to_uuid("x", true), "toUUIDOrNull(x)");
    }

    #[test]
    fn test_is_in_and_ternary() {
        assert_eq!(is_in("status", &["open", "it's"]), r"status IN ('open','it\'s')");
        assert_eq!(ternary("a", "b", "c"), "a ? b : c");
        assert_eq!(is_null("x + 1"), "(x + 1) IS NULL");
    }
}
