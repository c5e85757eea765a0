//! cf-report - Dynamic report queries for Clickforge
//!
//! A report inspects the requested columns and active filters, appends the
//! fragments it needs to a [`ReportQueryBuilder`], and the builder renders a
//! single statement for the store client.

pub mod builder;
pub mod condition;
pub mod error;
pub mod filter;
pub mod report;
pub mod request;
pub mod sharder;

pub use builder::ReportQueryBuilder;
pub use condition::AssignCondition;
pub use error::{ReportError, ReportResult};
pub use filter::FilterField;
pub use report::{
    run_report, Report, ReportColumns, ReportRegistry, ReportResponse, ReportResponseItem,
};
pub use request::{Pagination, ReportRequest};
pub use sharder::{Shard, TimeShards, TimeSharder};
