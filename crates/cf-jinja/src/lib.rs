//! cf-jinja - Jinja templating layer for Clickforge
//!
//! SQL-file migrations are rendered through [`JinjaEnvironment`], which
//! exposes `env()` for process environment lookups, `var()` for project
//! variables from `clickforge.yml`, and a `sql_string` filter for splicing
//! values into string literals.

pub mod environment;
pub mod error;
mod functions;

pub use environment::JinjaEnvironment;
pub use error::{JinjaError, JinjaResult};
