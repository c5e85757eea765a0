//! Query results

use cf_core::{Row, Value};

/// Rows returned by [`Client::select`](crate::Client::select)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectResult {
    rows: Vec<Row>,
    total: u64,
}

impl SelectResult {
    /// Create a result with an explicit total (rows before LIMIT)
    pub fn new(rows: Vec<Row>, total: u64) -> Self {
        Self { rows, total }
    }

    /// Create a result whose total is the number of rows
    pub fn from_rows(rows: Vec<Row>) -> Self {
        let total = rows.len() as u64;
        Self { rows, total }
    }

    /// Fetched rows
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consume the result, returning its rows
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Number of rows the query matched before LIMIT/OFFSET were applied
    pub fn count_all(&self) -> u64 {
        self.total
    }

    /// Value of `column` in the first row
    pub fn fetch_one(&self, column: &str) -> Option<&Value> {
        self.rows.first().and_then(|row| row.get(column))
    }

    /// True if no rows were returned
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(version: &str) -> Row {
        let mut row = Row::new();
        row.insert("version".to_string(), Value::from(version));
        row
    }

    #[test]
    fn test_fetch_one_reads_first_row() {
        let result = SelectResult::from_rows(vec![row("Version2"), row("Version1")]);
        assert_eq!(result.fetch_one("version"), Some(&Value::from("Version2")));
        assert_eq!(result.fetch_one("missing"), None);
        assert_eq!(result.count_all(), 2);
    }

    #[test]
    fn test_empty_result() {
        let result = SelectResult::default();
        assert!(result.is_empty());
        assert_eq!(result.fetch_one("version"), None);
        assert_eq!(result.count_all(), 0);
    }

    #[test]
    fn test_total_is_independent_of_page() {
        let result = SelectResult::new(vec![row("a")], 40);
        assert_eq!(result.rows().len(), 1);
        assert_eq!(result.count_all(), 40);
    }
}
