//! Error types for cf-report

use cf_db::DbError;
use thiserror::Error;

/// Report errors
#[derive(Error, Debug)]
pub enum ReportError {
    /// No report registered under the requested name (R001)
    #[error("[R001] Report type `{0}` is not found.")]
    NotFound(String),

    /// Request body could not be decoded (R002)
    #[error("[R002] Invalid report request: {0}")]
    InvalidRequest(String),

    /// Report could not be prepared from the request (R003)
    #[error("[R003] {0}")]
    Filter(String),

    /// Store client error (R004)
    #[error("[R004] {0}")]
    Db(#[from] DbError),
}

/// Result type alias for ReportError
pub type ReportResult<T> = Result<T, ReportError>;
