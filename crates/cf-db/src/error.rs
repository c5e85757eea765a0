//! Error types for cf-db

use thiserror::Error;

/// Store client errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Store connection failed: {0}")]
    ConnectionError(String),

    /// Query execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Table not found (D003)
    #[error("[D003] Table, view or dictionary not found: {0}")]
    TableNotFound(String),

    /// Response could not be decoded (D004)
    #[error("[D004] Unexpected store response: {0}")]
    ResponseError(String),

    /// Statement not understood by the in-memory client (D005)
    #[error("[D005] Statement not supported by {client} client: {sql}")]
    Unsupported { client: String, sql: String },

    /// Mutex poisoned (D006)
    #[error("[D006] Client mutex poisoned: {0}")]
    MutexPoisoned(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
