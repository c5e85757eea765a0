//! Template functions and filters: env(), var(), sql_string

use cf_core::sql_utils::quote_string;
use minijinja::value::Value;
use minijinja::{Error, ErrorKind};
use std::collections::HashMap;

/// Create the env() function that reads the process environment
///
/// Usage in templates:
/// ```jinja
/// {{ env('KAFKA_BROKERS') }}
/// {{ env('KAFKA_TOPIC', 'events') }}
/// ```
pub(crate) fn make_env_fn(
) -> impl Fn(&str, Option<Value>) -> Result<String, Error> + Send + Sync + Clone + 'static {
    |name: &str, default: Option<Value>| match std::env::var(name) {
        Ok(val) => Ok(val),
        Err(_) => match default {
            Some(d) => Ok(d.to_string()),
            None => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!(
                    "Environment variable '{}' is not set and no default provided",
                    name
                ),
            )),
        },
    }
}

/// Create the var() function that retrieves variables from config
///
/// Usage in templates:
/// ```jinja
/// {{ var('retention_days') }}
/// {{ var('missing', 30) }}
/// ```
pub(crate) fn make_var_fn(
    vars: HashMap<String, serde_yaml::Value>,
) -> impl Fn(&str, Option<Value>) -> Result<Value, Error> + Send + Sync + Clone + 'static {
    move |name: &str, default: Option<Value>| match (vars.get(name), default) {
        (Some(value), _) => Ok(Value::from_serialize(value)),
        (None, Some(default_val)) => Ok(default_val),
        (None, None) => Err(Error::new(
            ErrorKind::UndefinedError,
            format!("Variable '{}' is not defined and no default provided", name),
        )),
    }
}

/// `{{ value | sql_string }}` renders an escaped, single-quoted literal
pub(crate) fn sql_string_filter(value: Value) -> String {
    match value.as_str() {
        Some(s) => quote_string(s),
        None => quote_string(&value.to_string()),
    }
}
