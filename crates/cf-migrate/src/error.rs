//! Error types for cf-migrate

use cf_db::DbError;
use cf_jinja::JinjaError;
use cf_sql::SqlError;
use thiserror::Error;

/// Migration errors
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Ledger table could not be created or verified (M001)
    #[error("[M001] Can not create `migrations` table: {0}")]
    Ledger(String),

    /// A migration body failed; the run stopped at this version (M002)
    #[error("[M002] Migration {version} failed: {message}")]
    Execution { version: String, message: String },

    /// Rollback target is not registered or not applied (M003)
    #[error("[M003] Cannot rollback to version: {0}")]
    RollbackTarget(String),

    /// Migration parameter missing or empty (M004)
    #[error("[M004] {0}")]
    Params(String),

    /// SQL template failed to render (M005)
    #[error("[M005] {0}")]
    Template(#[from] JinjaError),

    /// IO error with path context (M006)
    #[error("[M006] IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Migration has no down script (M007)
    #[error("[M007] Migration {0} cannot be rolled back: no down script")]
    Irreversible(String),

    /// Statement rendering or execution error (M008)
    #[error("[M008] {0}")]
    Sql(#[from] SqlError),

    /// Store client error (M009)
    #[error("[M009] {0}")]
    Db(#[from] DbError),
}

/// Result type alias for MigrateError
pub type MigrateResult<T> = Result<T, MigrateError>;
