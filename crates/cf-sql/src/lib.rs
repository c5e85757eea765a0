//! cf-sql - ClickHouse statement builder for Clickforge
//!
//! This crate renders the DDL and DML statements migrations and services
//! issue against the store: tables backed by a [`StorageEngine`],
//! dictionaries fed by a [`DictionarySource`], materialized views, drops,
//! deletes, inserts and simple selects. The [`expr`] module holds pure
//! expression helpers for composing SELECT lists.

pub mod builder;
pub mod column;
pub mod dictionary;
pub mod engine;
pub mod error;
pub mod expr;

pub use builder::{Execution, QueryBuilder, StatementKind};
pub use column::{Column, ColumnFlags, ColumnType};
pub use dictionary::DictionarySource;
pub use engine::{MySqlMode, StorageEngine};
pub use error::{SqlError, SqlResult};
