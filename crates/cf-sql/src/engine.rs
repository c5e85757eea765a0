//! Storage engine descriptors
//!
//! A [`StorageEngine`] renders the text after `ENGINE = ` in a
//! `CREATE TABLE` statement and, where the family allows it, the trailing
//! `SETTINGS` clause.

use crate::error::{SqlError, SqlResult};
use cf_core::sql_utils::{escape_sql_string, quote_string};
use cf_core::Value;

const MERGE_TREE_SUBTYPES: &[&str] = &[
    "ReplicatedMergeTree",
    "ReplicatedSummingMergeTree",
    "ReplicatedReplacingMergeTree",
    "ReplicatedAggregatingMergeTree",
    "ReplicatedCollapsingMergeTree",
    "ReplicatedVersionedCollapsingMergeTree",
    "ReplicatedGraphiteMergeTree",
    "ReplacingMergeTree",
    "SummingMergeTree",
    "AggregatingMergeTree",
    "CollapsingMergeTree",
    "VersionedCollapsingMergeTree",
    "GraphiteMergeTree",
];

/// Whether a MySQL engine backs a single table or a whole database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MySqlMode {
    #[default]
    Table,
    Database,
}

/// Connection parameters of a MySQL-backed engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MySqlParams {
    pub mode: MySqlMode,
    pub host: Option<String>,
    pub port: Option<String>,
    pub database: Option<String>,
    pub table: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
enum Family {
    Kafka,
    MergeTree,
    MySql(MySqlParams),
}

/// Engine family plus its connection settings and raw configuration string
#[derive(Debug, Clone, PartialEq)]
pub struct StorageEngine {
    family: Family,
    settings: Vec<(String, Value)>,
    conf: Option<String>,
}

impl StorageEngine {
    fn with_family(family: Family) -> Self {
        Self {
            family,
            settings: Vec::new(),
            conf: None,
        }
    }

    /// Stream-ingest engine; configured entirely through `SETTINGS`
    pub fn kafka() -> Self {
        Self::with_family(Family::Kafka)
    }

    /// Merge-on-write engine, `MergeTree()` unless a raw configuration is set
    pub fn merge_tree() -> Self {
        Self::with_family(Family::MergeTree)
    }

    /// External MySQL table or database
    pub fn mysql(mode: MySqlMode) -> Self {
        Self::with_family(Family::MySql(MySqlParams {
            mode,
            ..MySqlParams::default()
        }))
    }

    /// Canonical engine type name
    pub fn engine_type(&self) -> &'static str {
        match self.family {
            Family::Kafka => "Kafka",
            Family::MergeTree => "MergeTree",
            Family::MySql(_) => "MySQL",
        }
    }

    /// Type names accepted in a raw configuration besides the canonical one
    pub fn subtypes(&self) -> &'static [&'static str] {
        match self.family {
            Family::MergeTree => MERGE_TREE_SUBTYPES,
            Family::Kafka | Family::MySql(_) => &[],
        }
    }

    /// Attach a raw configuration string such as `replacingmergetree(version)`
    ///
    /// The head token (text before the first `(`) must match the engine type
    /// or one of its subtypes, ignoring case. It is replaced by the canonical
    /// spelling; the rest of the string is kept verbatim.
    pub fn with_conf_string(mut self, raw: &str) -> SqlResult<Self> {
        self.conf = Some(self.normalize_conf(raw)?);
        Ok(self)
    }

    /// Validated raw configuration string, if one was attached
    pub fn conf_string(&self) -> Option<&str> {
        self.conf.as_deref()
    }

    fn normalize_conf(&self, raw: &str) -> SqlResult<String> {
        let trimmed = raw.trim();
        let invalid = || {
            SqlError::Configuration(format!(
                "Invalid engine type for {}. Check string: {}",
                self.engine_type(),
                raw
            ))
        };
        let (head, rest) = trimmed
            .find('(')
            .map(|pos| trimmed.split_at(pos))
            .ok_or_else(invalid)?;

        std::iter::once(self.engine_type())
            .chain(self.subtypes().iter().copied())
            .find(|candidate| candidate.eq_ignore_ascii_case(head))
            .map(|canonical| format!("{canonical}{rest}"))
            .ok_or_else(invalid)
    }

    /// Whether a `SETTINGS` clause may follow the engine
    pub fn can_use_connection_settings(&self) -> bool {
        !matches!(self.family, Family::MySql(_))
    }

    /// Replace the connection settings, kept in insertion order
    pub fn set_connection_settings<I, K, V>(&mut self, settings: I) -> SqlResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        if !self.can_use_connection_settings() {
            return Err(SqlError::Configuration(format!(
                "Can not use connection settings for {} engine",
                self.engine_type()
            )));
        }
        self.settings = settings
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Ok(())
    }

    /// `key = 'value', ...`; empty if no settings were set
    pub fn settings_string(&self) -> String {
        self.settings
            .iter()
            .map(|(key, value)| format!("{} = {}", key, quote_string(&value.to_string())))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Mutable access to MySQL connection parameters; `None` for other families
    pub fn mysql_params_mut(&mut self) -> Option<&mut MySqlParams> {
        match &mut self.family {
            Family::MySql(params) => Some(params),
            _ => None,
        }
    }

    /// Text that follows `ENGINE = `
    pub fn dsn_string(&self) -> SqlResult<String> {
        match &self.family {
            Family::Kafka => Ok("Kafka()".to_string()),
            Family::MergeTree => Ok(self
                .conf
                .clone()
                .unwrap_or_else(|| "MergeTree()".to_string())),
            Family::MySql(params) => match &self.conf {
                Some(conf) => Ok(conf.clone()),
                None => mysql_dsn(params),
            },
        }
    }
}

fn mysql_dsn(params: &MySqlParams) -> SqlResult<String> {
    let table_mode = params.mode == MySqlMode::Table;
    let missing = params.host.is_none()
        || params.port.is_none()
        || params.database.is_none()
        || params.user.is_none()
        || params.password.is_none()
        || (table_mode && params.table.is_none());
    if missing {
        let fields = if table_mode {
            "host, port, database, user, password, table"
        } else {
            "host, port, database, user, password"
        };
        return Err(SqlError::Configuration(format!(
            "Check parameters for DSN: {fields}."
        )));
    }

    let field = |v: &Option<String>| escape_sql_string(v.as_deref().unwrap_or_default());
    let mut args = vec![
        format!("{}:{}", field(&params.host), field(&params.port)),
        field(&params.database),
    ];
    if table_mode {
        args.push(field(&params.table));
    }
    args.push(field(&params.user));
    args.push(field(&params.password));

    let quoted: Vec<String> = args.iter().map(|a| format!("'{a}'")).collect();
    Ok(format!("MySQL({})", quoted.join(", ")))
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
