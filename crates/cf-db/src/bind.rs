//! Client-side binding of `:name` placeholders

use cf_core::sql_utils::to_sql_literal;
use cf_core::Params;
use regex::{Captures, Regex};
use std::sync::OnceLock;

/// Substitute `:name` placeholders in `sql` with escaped literals.
///
/// Placeholders inside single-quoted string literals and `::` casts are left
/// alone, as are placeholders with no entry in `params`. Array values expand
/// to a comma-separated literal list, so `col IN (:ids)` binds directly.
///
/// # Examples
/// ```
/// use cf_core::{Params, Value};
/// use cf_db::bind_params;
///
/// let mut params = Params::new();
/// params.insert("version".to_string(), Value::from("Version001"));
/// assert_eq!(
///     bind_params("SELECT * FROM migrations WHERE version=:version", &params),
///     "SELECT * FROM migrations WHERE version='Version001'"
/// );
/// ```
pub fn bind_params(sql: &str, params: &Params) -> String {
    if params.is_empty() {
        return sql.to_string();
    }

    placeholder_re()
        .replace_all(sql, |caps: &Captures<'_>| {
            match caps.get(1).and_then(|name| params.get(name.as_str())) {
                Some(value) => to_sql_literal(value),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

/// String literals and `::` casts match first and are copied through
fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"(?s)'(?:[^'\\]|\\.)*'|::|:([A-Za-z_][A-Za-z0-9_]*)").expect("valid regex")
    })
}
