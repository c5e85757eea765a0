//! Report definitions, registry and execution

use crate::builder::ReportQueryBuilder;
use crate::error::{ReportError, ReportResult};
use crate::request::ReportRequest;
use cf_db::Client;
use serde::Serialize;
use std::collections::BTreeMap;

/// Largest page a request may ask for
pub const ITEMS_COUNT_MAX: u64 = 1_000;

/// Page size used when the request sends none
pub const ITEMS_COUNT_DEFAULT: u64 = 100;

/// Column catalog of one report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportColumns {
    /// Always shown
    pub required: Vec<String>,
    /// Shown when the request names no columns
    pub default: Vec<String>,
    pub all: Vec<String>,
    pub sort: Vec<String>,
    pub group_by: Vec<String>,
}

fn names<I, S>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    items.into_iter().map(Into::into).collect()
}

impl ReportColumns {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required<I: IntoIterator<Item = S>, S: Into<String>>(mut self, columns: I) -> Self {
        self.required = names(columns);
        self
    }

    pub fn default_columns<I: IntoIterator<Item = S>, S: Into<String>>(
        mut self,
        columns: I,
    ) -> Self {
        self.default = names(columns);
        self
    }

    pub fn all<I: IntoIterator<Item = S>, S: Into<String>>(mut self, columns: I) -> Self {
        self.all = names(columns);
        self
    }

    pub fn sortable<I: IntoIterator<Item = S>, S: Into<String>>(mut self, columns: I) -> Self {
        self.sort = names(columns);
        self
    }

    pub fn group_by<I: IntoIterator<Item = S>, S: Into<String>>(mut self, columns: I) -> Self {
        self.group_by = names(columns);
        self
    }

    /// A column is shown if requested, required, or a default column when
    /// nothing was requested
    pub fn is_need_show_column(&self, column: &str, request: &ReportRequest) -> bool {
        let requested = &request.show_columns;
        requested.iter().any(|c| c == column)
            || self.required.iter().any(|c| c == column)
            || (requested.is_empty() && self.default.iter().any(|c| c == column))
    }

    /// A column is needed for sorting if it is sortable and the request
    /// sorts by it in either direction
    pub fn is_need_sort_column(&self, column: &str, request: &ReportRequest) -> bool {
        let column = column.trim_start_matches('-');
        self.sort.iter().any(|c| c == column)
            && request
                .sort
                .iter()
                .any(|s| s.strip_prefix('-').unwrap_or(s) == column)
    }

    /// `(limit, offset)` for the requested page
    ///
    /// Non-positive page sizes fall back to [`ITEMS_COUNT_DEFAULT`] and large
    /// ones are capped at [`ITEMS_COUNT_MAX`]. Pages below 2 start at offset 0;
    /// a page whose offset does not fit in `u64` is rejected.
    pub fn pagination_parameters(&self, request: &ReportRequest) -> ReportResult<(u64, u64)> {
        let pagination = &request.pagination;
        let limit = match u64::try_from(pagination.per_page) {
            Ok(0) | Err(_) => ITEMS_COUNT_DEFAULT,
            Ok(per_page) => per_page.min(ITEMS_COUNT_MAX),
        };
        let offset = match u64::try_from(pagination.page) {
            Ok(page) if page > 1 => limit.checked_mul(page - 1).ok_or_else(|| {
                ReportError::InvalidRequest(format!("page {} is out of range", pagination.page))
            })?,
            _ => 0,
        };
        Ok((limit, offset))
    }

    /// `ORDER BY` entries for the requested sort columns that are sortable
    pub fn sort_list(&self, request: &ReportRequest) -> Vec<String> {
        request
            .sort
            .iter()
            .filter_map(|entry| {
                let (column, direction) = match entry.strip_prefix('-') {
                    Some(column) => (column, "DESC"),
                    None => (entry.as_str(), "ASC"),
                };
                self.sort
                    .iter()
                    .any(|c| c == column)
                    .then(|| format!("{} {}", column, direction))
            })
            .collect()
    }
}

/// A report definition
///
/// `prepare` appends to the builder whatever the request needs; the builder
/// then renders the single statement the report runs.
pub trait Report: Send + Sync {
    /// Name the report is registered and requested under
    fn name(&self) -> &str;

    fn columns(&self) -> &ReportColumns;

    fn prepare(
        &self,
        builder: &mut ReportQueryBuilder,
        request: &ReportRequest,
    ) -> ReportResult<()>;
}

/// Reports keyed by name
#[derive(Default)]
pub struct ReportRegistry {
    reports: BTreeMap<String, Box<dyn Report>>,
}

impl ReportRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a report, replacing any report of the same name
    pub fn register(&mut self, report: Box<dyn Report>) {
        let name = report.name().to_string();
        if self.reports.insert(name.clone(), report).is_some() {
            log::warn!("Report {} registered twice; keeping the last one", name);
        }
    }

    pub fn get(&self, name: &str) -> ReportResult<&dyn Report> {
        self.reports
            .get(name)
            .map(|report| report.as_ref())
            .ok_or_else(|| ReportError::NotFound(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.reports.keys().map(String::as_str).collect()
    }
}

/// One output row, with every shown cell as text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportResponseItem {
    pub id: String,
    #[serde(rename = "type")]
    pub item_type: String,
    pub attributes: BTreeMap<String, String>,
}

/// Rows of the requested page plus the total matched before pagination
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReportResponse {
    pub data: Vec<ReportResponseItem>,
    pub total: u64,
}

/// Prepare `report` for `request`, run it, and shape the rows
///
/// Each item's id is its row index; columns the request does not show are
/// dropped from the attributes.
pub async fn run_report(
    client: &dyn Client,
    report: &dyn Report,
    request: &ReportRequest,
) -> ReportResult<ReportResponse> {
    let mut builder = ReportQueryBuilder::new();
    report.prepare(&mut builder, request)?;

    let sql = builder.build_query();
    log::debug!("Running report {}", report.name());
    let result = client.select(&sql, builder.parameters()).await?;

    let columns = report.columns();
    let data = result
        .rows()
        .iter()
        .enumerate()
        .map(|(index, row)| ReportResponseItem {
            id: index.to_string(),
            item_type: "row".to_string(),
            attributes: row
                .iter()
                .filter(|(column, _)| columns.is_need_show_column(column, request))
                .map(|(column, value)| (column.clone(), value.to_string()))
                .collect(),
        })
        .collect();

    Ok(ReportResponse {
        data,
        total: result.count_all(),
    })
}

#[cfg(test)]
#[path = "report_test.rs"]
mod tests;
