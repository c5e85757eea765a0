//! cf-core - Core library for Clickforge
//!
//! This crate provides the scalar value model shared by the query builders
//! and the wire client, project configuration parsing, and SQL literal
//! helpers used across all Clickforge components.

pub mod config;
pub mod error;
pub mod sql_utils;
pub mod value;

pub use config::{Config, ConnectionConfig, TargetConfig};
pub use error::{CoreError, CoreResult};
pub use value::{Params, Row, Value};
