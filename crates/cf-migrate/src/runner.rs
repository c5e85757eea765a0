//! Migration runner
//!
//! Applies registered migrations in ascending version order and rolls them
//! back in descending order, keeping the ledger in step with every
//! successful `up`/`down`. A migration that errors or returns `false` stops
//! the run; versions completed before it stay recorded.

use crate::context::MigrationContext;
use crate::error::{MigrateError, MigrateResult};
use crate::ledger::Ledger;
use crate::migration::Migration;
use crate::output::{MigrationOutput, NullOutput};
use cf_db::Client;
use std::collections::BTreeMap;

/// Registry of migrations plus the store they run against
pub struct MigrationRunner<'a> {
    client: &'a dyn Client,
    migrations: BTreeMap<String, Box<dyn Migration>>,
    output: Box<dyn MigrationOutput>,
}

impl<'a> MigrationRunner<'a> {
    pub fn new(client: &'a dyn Client) -> Self {
        Self {
            client,
            migrations: BTreeMap::new(),
            output: Box::new(NullOutput),
        }
    }

    /// Register a migration; a later registration of the same version replaces it
    pub fn add_migration(&mut self, migration: Box<dyn Migration>) {
        let version = migration.version().to_string();
        if self.migrations.insert(version.clone(), migration).is_some() {
            log::warn!("Migration {} registered twice; keeping the last one", version);
        }
    }

    pub fn set_output(&mut self, output: Box<dyn MigrationOutput>) {
        self.output = output;
    }

    /// Registered versions in ascending order
    pub fn versions(&self) -> Vec<&str> {
        self.migrations.keys().map(String::as_str).collect()
    }

    fn context(&self, migration: &dyn Migration) -> MigrationContext<'_> {
        MigrationContext::new(self.client, self.output.as_ref(), migration.params())
    }

    /// Apply every migration missing from the ledger, oldest first
    pub async fn run_up(&self) -> MigrateResult<()> {
        let ledger = Ledger::new(self.client);
        ledger.ensure_ready().await?;

        for (version, migration) in &self.migrations {
            self.up_one(&ledger, version, migration.as_ref())
                .await
                .map_err(|e| execution_error(version, e))?;
        }
        Ok(())
    }

    async fn up_one(
        &self,
        ledger: &Ledger<'_>,
        version: &str,
        migration: &dyn Migration,
    ) -> MigrateResult<()> {
        if ledger.is_applied(version).await? {
            log::debug!("Migration {} already applied", version);
            self.output
                .writeln(&format!("Migration {} is already applied", version));
            return Ok(());
        }

        let ctx = self.context(migration);
        if migration.up(&ctx).await? {
            ledger.record(version).await?;
            log::info!("Applied migration {}", version);
            self.output
                .writeln(&format!("Migrated up to version: {}", version));
        } else {
            log::warn!("Migration {} up() returned false; stopping", version);
            self.output.writeln(&format!(
                "Migration {} did not complete; not recorded",
                version
            ));
            return Err(MigrateError::Execution {
                version: version.to_string(),
                message: "up() reported failure".to_string(),
            });
        }
        Ok(())
    }

    /// Roll back every applied migration at or above `target`, newest first
    ///
    /// Without a target the most recently applied version is rolled back.
    pub async fn run_down(&self, target: Option<&str>) -> MigrateResult<()> {
        let ledger = Ledger::new(self.client);
        ledger.ensure_ready().await?;

        let target = match target {
            Some(version) => version.to_string(),
            None => ledger.last_version().await?.unwrap_or_default(),
        };

        if target.is_empty()
            || !self.migrations.contains_key(&target)
            || !ledger.is_applied(&target).await?
        {
            return Err(MigrateError::RollbackTarget(target));
        }

        let to_roll_back = self
            .migrations
            .iter()
            .rev()
            .filter(|(version, _)| version.as_str() >= target.as_str());
        for (version, migration) in to_roll_back {
            self.down_one(&ledger, version, migration.as_ref())
                .await
                .map_err(|e| execution_error(version, e))?;
        }

        self.output
            .writeln(&format!("Rolled back to version: {}", target));
        Ok(())
    }

    async fn down_one(
        &self,
        ledger: &Ledger<'_>,
        version: &str,
        migration: &dyn Migration,
    ) -> MigrateResult<()> {
        if !ledger.is_applied(version).await? {
            log::debug!("Migration {} not applied; skipping rollback", version);
            return Ok(());
        }

        let ctx = self.context(migration);
        if migration.down(&ctx).await? {
            ledger.remove(version).await?;
            log::info!("Rolled back migration {}", version);
            self.output
                .writeln(&format!("Migration {} is rolled back", version));
        } else {
            log::warn!("Migration {} down() returned false; stopping", version);
            self.output.writeln(&format!(
                "Migration {} was not rolled back; ledger unchanged",
                version
            ));
            return Err(MigrateError::Execution {
                version: version.to_string(),
                message: "down() reported failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Attach the failing version unless the error already names it
fn execution_error(version: &str, err: MigrateError) -> MigrateError {
    match err {
        MigrateError::Execution { .. } => err,
        other => MigrateError::Execution {
            version: version.to_string(),
            message: other.to_string(),
        },
    }
}
