//! The `migrations` ledger table
//!
//! One row per applied version: `(uuid UUID, timestamp Int64, version String)`.
//! Every decision re-reads the table; nothing is cached between calls.

use crate::error::{MigrateError, MigrateResult};
use cf_core::sql_utils::quote_string;
use cf_core::{Params, Value};
use cf_db::Client;
use cf_sql::{ColumnFlags, QueryBuilder, StorageEngine};

/// Name of the ledger table
pub const LEDGER_TABLE: &str = "migrations";

/// Read/write access to the ledger through a store client
pub struct Ledger<'a> {
    client: &'a dyn Client,
}

impl<'a> Ledger<'a> {
    pub fn new(client: &'a dyn Client) -> Self {
        Self { client }
    }

    /// Make sure the ledger table exists, creating it if needed
    pub async fn ensure_ready(&self) -> MigrateResult<()> {
        let tables = self
            .client
            .show_tables()
            .await
            .map_err(|e| MigrateError::Ledger(e.to_string()))?;
        if tables.contains(LEDGER_TABLE) {
            return Ok(());
        }

        log::debug!("Creating ledger table {}", LEDGER_TABLE);
        QueryBuilder::new()
            .create_table(LEDGER_TABLE, ColumnFlags::IF_NOT_EXISTS)
            .add_uuid("uuid", ColumnFlags::NONE)
            .add_int64("timestamp", ColumnFlags::NONE)
            .add_string("version", ColumnFlags::NONE)
            .engine(StorageEngine::merge_tree())
            .order_by("timestamp")
            .execute(self.client)
            .await
            .map_err(|e| MigrateError::Ledger(e.to_string()))?;

        let ddl = self
            .client
            .show_create_table(LEDGER_TABLE)
            .await
            .map_err(|e| MigrateError::Ledger(e.to_string()))?;
        if ddl.is_empty() {
            return Err(MigrateError::Ledger(
                "table is missing after creation".to_string(),
            ));
        }
        Ok(())
    }

    /// True if `version` has a ledger row
    pub async fn is_applied(&self, version: &str) -> MigrateResult<bool> {
        let mut params = Params::new();
        params.insert("version".to_string(), Value::from(version));

        let result = QueryBuilder::new()
            .select_all_columns()
            .from(LEDGER_TABLE)
            .where_clause("version=:version")
            .limit(1)
            .bindings(params)
            .execute(self.client)
            .await?
            .into_result()
            .unwrap_or_default();
        log::debug!("Ledger lookup {}: applied={}", version, !result.is_empty());
        Ok(!result.is_empty())
    }

    /// Record `version` as applied now
    pub async fn record(&self, version: &str) -> MigrateResult<()> {
        QueryBuilder::new()
            .insert(
                LEDGER_TABLE,
                [
                    ("uuid", Value::from(uuid::Uuid::new_v4().to_string())),
                    ("timestamp", Value::from(chrono::Utc::now().timestamp())),
                    ("version", Value::from(version)),
                ],
            )
            .execute(self.client)
            .await?;
        Ok(())
    }

    /// Delete the ledger row of `version`
    pub async fn remove(&self, version: &str) -> MigrateResult<()> {
        QueryBuilder::new()
            .delete(LEDGER_TABLE)
            .where_clause(&format!("version={}", quote_string(version)))
            .execute(self.client)
            .await?;
        Ok(())
    }

    /// Most recently applied version, by timestamp then version
    pub async fn last_version(&self) -> MigrateResult<Option<String>> {
        let result = QueryBuilder::new()
            .select_columns([("version", "version")])
            .from(LEDGER_TABLE)
            .order_by("timestamp DESC, version DESC")
            .limit(1)
            .execute(self.client)
            .await?
            .into_result()
            .unwrap_or_default();
        Ok(result
            .fetch_one("version")
            .and_then(Value::as_str)
            .map(String::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_db::MemoryClient;

    #[tokio::test]
    async fn test_ensure_ready_creates_table_once() {
        let client = MemoryClient::new();
        let ledger = Ledger::new(&client);
        ledger.ensure_ready().await.unwrap();
        ledger.ensure_ready().await.unwrap();

        let ddl = client.show_create_table(LEDGER_TABLE).await.unwrap();
        assert_eq!(
            ddl,
            "CREATE TABLE IF NOT EXISTS migrations (uuid UUID, timestamp Int64, version String) ENGINE = MergeTree() ORDER BY timestamp"
        );
        let creates = client
            .executed()
            .unwrap()
            .iter()
            .filter(|sql| sql.starts_with("CREATE TABLE"))
            .count();
        assert_eq!(creates, 1);
    }

    #[tokio::test]
    async fn test_record_and_remove() {
        let client = MemoryClient::new();
        let ledger = Ledger::new(&client);
        ledger.ensure_ready().await.unwrap();

        assert!(!ledger.is_applied("Version001").await.unwrap());
        assert_eq!(ledger.last_version().await.unwrap(), None);

        ledger.record("Version001").await.unwrap();
        ledger.record("Version002").await.unwrap();
        assert!(ledger.is_applied("Version001").await.unwrap());
        assert_eq!(
            ledger.last_version().await.unwrap(),
            Some("Version002".to_string())
        );

        ledger.remove("Version002").await.unwrap();
        assert!(!ledger.is_applied("Version002").await.unwrap());
        assert_eq!(
            ledger.last_version().await.unwrap(),
            Some("Version001".to_string())
        );
    }

    #[tokio::test]
    async fn test_version_with_quote_is_escaped() {
        let client = MemoryClient::new();
        let ledger = Ledger::new(&client);
        ledger.ensure_ready().await.unwrap();
        ledger.record("it's").await.unwrap();
        assert!(ledger.is_applied("it's").await.unwrap());
        ledger.remove("it's").await.unwrap();
        assert!(!ledger.is_applied("it's").await.unwrap());
    }
}
