//! Client trait definition

use crate::error::DbResult;
use crate::result::SelectResult;
use async_trait::async_trait;
use cf_core::{Params, Value};
use std::collections::BTreeSet;

/// Wire client for the store
///
/// Every statement rendered by the query builders and every ledger read or
/// write goes through this trait. Implementations must be Send + Sync for
/// async operation.
#[async_trait]
pub trait Client: Send + Sync {
    /// Execute a statement that returns no rows (DDL, `ALTER ... DELETE`)
    async fn write(&self, sql: &str) -> DbResult<()>;

    /// Execute a query with `:name` placeholders bound from `params`
    async fn select(&self, sql: &str, params: &Params) -> DbResult<SelectResult>;

    /// Batch insert `rows` into `table`; each row lists values in `columns` order
    async fn insert(&self, table: &str, rows: &[Vec<Value>], columns: &[String]) -> DbResult<()>;

    /// `SHOW CREATE TABLE` text, or an empty string if the object is absent
    async fn show_create_table(&self, name: &str) -> DbResult<String>;

    /// Names of all tables, views and dictionaries in the current database
    async fn show_tables(&self) -> DbResult<BTreeSet<String>>;

    /// Client type identifier for logging
    fn client_type(&self) -> &'static str;
}
