//! Migration trait

use crate::context::MigrationContext;
use crate::error::MigrateResult;
use crate::params::MigrationParam;
use async_trait::async_trait;

/// One versioned schema change
///
/// Versions are compared as plain strings, so zero-padded names such as
/// `Version000001` sort in application order. `up` and `down` return
/// `Ok(false)` to report an unsuccessful body without raising an error;
/// the ledger is then left untouched for that version.
#[async_trait]
pub trait Migration: Send + Sync {
    /// Unique, ordered version name
    fn version(&self) -> &str;

    /// Environment parameters the migration reads through
    /// [`MigrationContext::params`]
    fn params(&self) -> Vec<MigrationParam> {
        Vec::new()
    }

    async fn up(&self, ctx: &MigrationContext<'_>) -> MigrateResult<bool>;

    async fn down(&self, ctx: &MigrationContext<'_>) -> MigrateResult<bool>;
}
