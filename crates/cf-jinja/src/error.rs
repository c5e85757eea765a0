//! Error types for cf-jinja

use thiserror::Error;

/// Jinja templating errors
#[derive(Error, Debug)]
pub enum JinjaError {
    /// Template render error (J001)
    #[error("[J001] Jinja render error in {template}: {message}")]
    RenderError { template: String, message: String },
}

/// Result type alias for JinjaError
pub type JinjaResult<T> = Result<T, JinjaError>;
