//! Error types for cf-sql

use cf_db::DbError;
use thiserror::Error;

/// Statement rendering and execution errors
#[derive(Error, Debug)]
pub enum SqlError {
    /// Engine, dictionary source or statement is misconfigured (S001)
    #[error("[S001] Configuration error: {0}")]
    Configuration(String),

    /// JSON path helper called with no keys (S002)
    #[error("[S002] Key chain must be a non-empty list of keys")]
    EmptyKeyChain,

    /// Statement failed in the store (S003)
    #[error("[S003] Statement execution failed: {0}")]
    Db(#[from] DbError),
}

/// Result type alias for SqlError
pub type SqlResult<T> = Result<T, SqlError>;
