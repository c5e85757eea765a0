//! cf-migrate - Versioned schema migrations for Clickforge
//!
//! Migrations implement [`Migration`] (or are loaded from
//! `<Version>.up.sql` / `<Version>.down.sql` files) and are applied by the
//! [`MigrationRunner`], which records every applied version in the
//! `migrations` ledger table of the store.

pub mod context;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod output;
pub mod params;
pub mod runner;
pub mod sql_file;

pub use context::MigrationContext;
pub use error::{MigrateError, MigrateResult};
pub use ledger::{Ledger, LEDGER_TABLE};
pub use migration::Migration;
pub use output::{CollectingOutput, MigrationOutput, NullOutput};
pub use params::{MigrationParam, MigrationParams};
pub use runner::MigrationRunner;
pub use sql_file::{discover_sql_migrations, SqlFileMigration};
