//! cf-db - Store client abstraction for Clickforge
//!
//! This crate provides the `Client` trait that every rendered statement is
//! executed through, together with a ClickHouse HTTP implementation and an
//! in-memory implementation used by tests and dry runs.

pub mod bind;
pub mod error;
pub mod http;
pub mod memory;
pub mod result;
pub mod traits;

pub use bind::bind_params;
pub use error::{DbError, DbResult};
pub use http::HttpClient;
pub use memory::MemoryClient;
pub use result::SelectResult;
pub use traits::Client;
