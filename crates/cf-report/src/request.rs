//! Report request and pagination

use crate::error::{ReportError, ReportResult};
use crate::filter::FilterField;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

fn default_page() -> i64 {
    1
}

fn default_per_page() -> i64 {
    20
}

/// Requested page; values are taken as sent and clamped when applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_per_page")]
    pub per_page: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: default_page(),
            per_page: default_per_page(),
        }
    }
}

/// Columns, sort order, page and filters requested for one report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReportRequest {
    pub show_columns: Vec<String>,
    /// Column names, `-name` for descending
    pub sort: Vec<String>,
    pub pagination: Pagination,
    pub filters: BTreeMap<String, FilterField>,
}

impl ReportRequest {
    /// Decode a JSON request body
    ///
    /// Filters sent without an `id` take the key they are listed under.
    pub fn from_json(body: &str) -> ReportResult<Self> {
        let mut request: Self =
            serde_json::from_str(body).map_err(|e| ReportError::InvalidRequest(e.to_string()))?;
        for (name, field) in request.filters.iter_mut() {
            if field.id.is_empty() {
                field.id = name.clone();
            }
        }
        Ok(request)
    }

    pub fn with_show_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.show_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_sort<I, S>(mut self, sort: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = sort.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_pagination(mut self, page: i64, per_page: i64) -> Self {
        self.pagination = Pagination { page, per_page };
        self
    }

    /// Add a filter under its id
    pub fn with_filter(mut self, field: FilterField) -> Self {
        self.filters.insert(field.id.clone(), field);
        self
    }

    pub fn filter(&self, name: &str) -> Option<&FilterField> {
        self.filters.get(name)
    }
}
