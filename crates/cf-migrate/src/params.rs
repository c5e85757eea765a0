//! Migration parameters read from the process environment

use crate::error::{MigrateError, MigrateResult};
use std::collections::BTreeMap;

/// A parameter a migration declares, with an optional default
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationParam {
    pub name: String,
    pub default: Option<String>,
}

impl MigrationParam {
    /// Parameter that must be set to a non-empty value
    pub fn required(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: None,
        }
    }

    /// Parameter that falls back to `default` when unset
    pub fn with_default(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Some(default.into()),
        }
    }
}

/// Resolved parameter values, keyed by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationParams {
    values: BTreeMap<String, String>,
}

impl MigrationParams {
    /// Resolve `declared` against the process environment
    pub fn from_env(declared: &[MigrationParam]) -> MigrateResult<Self> {
        Self::resolve(declared, |name| std::env::var(name).ok())
    }

    /// Resolve `declared` with a custom lookup
    ///
    /// A set value always wins, even when empty, unless the parameter has no
    /// default; an unset value falls back to the default.
    pub fn resolve<F>(declared: &[MigrationParam], lookup: F) -> MigrateResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut values = BTreeMap::new();
        for param in declared {
            let value = match (lookup(&param.name), &param.default) {
                (Some(v), None) if v.is_empty() => {
                    return Err(MigrateError::Params(format!(
                        "Required parameter `{}` cannot be empty!",
                        param.name
                    )));
                }
                (Some(v), _) => v,
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(MigrateError::Params(format!(
                        "Required parameter `{}` is undefined in the environment!",
                        param.name
                    )));
                }
            };
            values.insert(param.name.clone(), value);
        }
        Ok(Self { values })
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of a declared parameter; errors if `name` was never declared
    pub fn require(&self, name: &str) -> MigrateResult<&str> {
        self.get(name).ok_or_else(|| {
            MigrateError::Params(format!("Parameter `{}` is not declared by this migration", name))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup<'a>(
        env: &'a HashMap<&'static str, &'static str>,
    ) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| env.get(name).map(|v| v.to_string())
    }

    #[test]
    fn test_resolve_values_and_defaults() {
        let env = HashMap::from([("KAFKA_BROKERS", "kafka:9092")]);
        let declared = vec![
            MigrationParam::required("KAFKA_BROKERS"),
            MigrationParam::with_default("ENGINE_PAYMENTS", "MergeTree"),
        ];
        let params = MigrationParams::resolve(&declared, lookup(&env)).unwrap();
        assert_eq!(params.get("KAFKA_BROKERS"), Some("kafka:9092"));
        assert_eq!(params.require("ENGINE_PAYMENTS").unwrap(), "MergeTree");
        assert!(params.require("OTHER").is_err());
    }

    #[test]
    fn test_required_param_missing() {
        let env = HashMap::new();
        let err = MigrationParams::resolve(&[MigrationParam::required("TOPIC")], lookup(&env))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "[M004] Required parameter `TOPIC` is undefined in the environment!"
        );
    }

    #[test]
    fn test_required_param_empty() {
        let env = HashMap::from([("TOPIC", "")]);
        let err = MigrationParams::resolve(&[MigrationParam::required("TOPIC")], lookup(&env))
            .unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_empty_value_with_default_is_kept() {
        let env = HashMap::from([("SUFFIX", "")]);
        let params = MigrationParams::resolve(
            &[MigrationParam::with_default("SUFFIX", "_v1")],
            lookup(&env),
        )
        .unwrap();
        assert_eq!(params.get("SUFFIX"), Some(""));
    }

    #[test]
    fn test_no_declared_params() {
        assert!(MigrationParams::from_env(&[]).unwrap().is_empty());
    }
}
