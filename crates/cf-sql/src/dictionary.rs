//! Dictionary source descriptors

use crate::error::{SqlError, SqlResult};
use cf_core::sql_utils::escape_sql_string;

/// MySQL source feeding a ClickHouse dictionary
///
/// Replica priority follows the order of `hosts`, starting at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionarySource {
    pub remote_table: String,
    pub hosts: Vec<String>,
    pub database: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub layout: String,
    pub lifetime: u32,
}

impl DictionarySource {
    /// Source with the default `HASHED()` layout and a 300 second lifetime
    pub fn mysql(
        remote_table: impl Into<String>,
        hosts: Vec<String>,
        database: impl Into<String>,
        port: u16,
        user: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            remote_table: remote_table.into(),
            hosts,
            database: database.into(),
            port,
            user: user.into(),
            password: password.into(),
            layout: "HASHED()".to_string(),
            lifetime: 300,
        }
    }

    pub fn with_layout(mut self, layout: impl Into<String>) -> Self {
        self.layout = layout.into();
        self
    }

    pub fn with_lifetime(mut self, seconds: u32) -> Self {
        self.lifetime = seconds;
        self
    }

    /// Contents of the `SOURCE(...)` clause
    pub fn source_string(&self) -> SqlResult<String> {
        if self.hosts.is_empty() {
            return Err(SqlError::Configuration(format!(
                "Dictionary source for table '{}' has no hosts",
                self.remote_table
            )));
        }

        let replicas: Vec<String> = self
            .hosts
            .iter()
            .enumerate()
            .map(|(i, host)| {
                format!(
                    "replica(host '{}' priority {})",
                    escape_sql_string(host),
                    i + 1
                )
            })
            .collect();

        Ok(format!(
            "MYSQL({} port {} db '{}' table '{}' user '{}' password '{}' fail_on_connection_loss 'true')",
            replicas.join(" "),
            self.port,
            escape_sql_string(&self.database),
            escape_sql_string(&self.remote_table),
            escape_sql_string(&self.user),
            escape_sql_string(&self.password),
        ))
    }
}
