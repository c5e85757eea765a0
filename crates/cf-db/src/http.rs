//! ClickHouse HTTP interface client

use crate::bind::bind_params;
use crate::error::{DbError, DbResult};
use crate::result::SelectResult;
use crate::traits::Client;
use async_trait::async_trait;
use cf_core::config::ConnectionConfig;
use cf_core::sql_utils::to_sql_literal;
use cf_core::{Params, Row, Value};
use serde::Deserialize;
use std::collections::BTreeSet;

/// Store client speaking the ClickHouse HTTP protocol
pub struct HttpClient {
    http: reqwest::Client,
    config: ConnectionConfig,
}

impl HttpClient {
    /// Create a client for the given connection
    pub fn new(config: ConnectionConfig) -> DbResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Database every statement runs against
    pub fn database(&self) -> &str {
        &self.config.database
    }

    /// POST one statement and return the raw response body
    async fn query(&self, sql: &str) -> DbResult<String> {
        log::debug!("POST {} ({}): {}", self.config.url, self.config.database, sql);
        let response = self
            .http
            .post(&self.config.url)
            .query(&[("database", self.config.database.as_str())])
            .header("X-ClickHouse-User", &self.config.user)
            .header("X-ClickHouse-Key", &self.config.password)
            .body(sql.to_string())
            .send()
            .await
            .map_err(|e| DbError::ConnectionError(format!("{}: {}", self.config.url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| DbError::ResponseError(e.to_string()))?;

        if status.is_success() {
            Ok(body)
        } else {
            Err(classify_error(&body, sql))
        }
    }
}

#[async_trait]
impl Client for HttpClient {
    async fn write(&self, sql: &str) -> DbResult<()> {
        self.query(sql).await.map(|_| ())
    }

    async fn select(&self, sql: &str, params: &Params) -> DbResult<SelectResult> {
        let bound = bind_params(sql, params);
        let body = self.query(&format!("{} FORMAT JSON", bound)).await?;
        parse_json_result(&body)
    }

    async fn insert(&self, table: &str, rows: &[Vec<Value>], columns: &[String]) -> DbResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        self.query(&render_insert(table, rows, columns)).await.map(|_| ())
    }

    async fn show_create_table(&self, name: &str) -> DbResult<String> {
        match self
            .query(&format!("SHOW CREATE TABLE {} FORMAT TabSeparatedRaw", name))
            .await
        {
            Ok(body) => Ok(body.trim().to_string()),
            Err(DbError::TableNotFound(_)) => Ok(String::new()),
            Err(e) => Err(e),
        }
    }

    async fn show_tables(&self) -> DbResult<BTreeSet<String>> {
        let body = self.query("SHOW TABLES FORMAT TabSeparatedRaw").await?;
        Ok(body
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect())
    }

    fn client_type(&self) -> &'static str {
        "clickhouse-http"
    }
}

/// Map a ClickHouse error body to a [`DbError`]
fn classify_error(body: &str, sql: &str) -> DbError {
    let message = body.trim();
    if message.starts_with("Code: 60.") || message.contains("(UNKNOWN_TABLE)") {
        DbError::TableNotFound(message.to_string())
    } else {
        DbError::ExecutionError(format!("{}: {}", message, sql))
    }
}

/// Body of a `FORMAT JSON` response
#[derive(Debug, Deserialize)]
struct JsonResponse {
    #[serde(default)]
    meta: Vec<JsonColumn>,
    data: Vec<serde_json::Map<String, serde_json::Value>>,
    rows: Option<u64>,
    rows_before_limit_at_least: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct JsonColumn {
    name: String,
}

/// Decode a `FORMAT JSON` response
fn parse_json_result(body: &str) -> DbResult<SelectResult> {
    let response: JsonResponse =
        serde_json::from_str(body).map_err(|e| DbError::ResponseError(e.to_string()))?;

    let columns: Vec<&str> = response.meta.iter().map(|c| c.name.as_str()).collect();
    log::debug!("Decoded {} rows ({})", response.data.len(), columns.join(", "));

    let rows: Vec<Row> = response
        .data
        .iter()
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| (k.clone(), Value::from_json(v)))
                .collect()
        })
        .collect();

    let total = response
        .rows_before_limit_at_least
        .or(response.rows)
        .unwrap_or(rows.len() as u64);

    Ok(SelectResult::new(rows, total))
}

fn render_insert(table: &str, rows: &[Vec<Value>], columns: &[String]) -> String {
    let values: Vec<String> = rows
        .iter()
        .map(|row| {
            let cells: Vec<String> = row.iter().map(insert_literal).collect();
            format!("({})", cells.join(", "))
        })
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES {}",
        table,
        columns.join(", "),
        values.join(", ")
    )
}

/// Array cells are inserted as ClickHouse array literals
fn insert_literal(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(insert_literal).collect();
            format!("[{}]", inner.join(", "))
        }
        other => to_sql_literal(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_result() {
        let body = r#"{
            "meta": [{"name": "version", "type": "String"}],
            "data": [{"version": "Version002", "timestamp": "1700000000"}],
            "rows": 1,
            "rows_before_limit_at_least": 2
        }"#;
        let result = parse_json_result(body).unwrap();
        assert_eq!(result.rows().len(), 1);
        assert_eq!(result.count_all(), 2);
        assert_eq!(result.fetch_one("version"), Some(&Value::from("Version002")));
        assert_eq!(
            result.fetch_one("timestamp").and_then(Value::as_i64),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_parse_json_result_without_limit_total() {
        let body = r#"{"data": [{"a": 1}, {"a": 2}], "rows": 2}"#;
        assert_eq!(parse_json_result(body).unwrap().count_all(), 2);
    }

    #[test]
    fn test_parse_json_result_empty_data() {
        let body = r#"{"meta": [{"name": "version", "type": "String"}], "data": [], "rows": 0}"#;
        let result = parse_json_result(body).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.count_all(), 0);
    }

    #[test]
    fn test_parse_json_result_rejects_garbage() {
        assert!(matches!(
            parse_json_result("Ok."),
            Err(DbError::ResponseError(_))
        ));
        assert!(matches!(
            parse_json_result(r#"{"rows": 0}"#),
            Err(DbError::ResponseError(_))
        ));
    }

    #[test]
    fn test_classify_error() {
        let missing = classify_error(
            "Code: 60. DB::Exception: Table default.x does not exist. (UNKNOWN_TABLE)",
            "SHOW CREATE TABLE x",
        );
        assert!(matches!(missing, DbError::TableNotFound(_)));

        let syntax = classify_error("Code: 62. DB::Exception: Syntax error", "SELEC 1");
        assert!(matches!(syntax, DbError::ExecutionError(ref m) if m.ends_with("SELEC 1")));
    }

    #[test]
    fn test_render_insert() {
        let sql = render_insert(
            "migrations",
            &[
                vec![Value::from("u1"), Value::from(1), Value::from("Version001")],
                vec![Value::from("u2"), Value::from(2), Value::from(vec!["a", "b"])],
            ],
            &["uuid".to_string(), "timestamp".to_string(), "version".to_string()],
        );
        assert_eq!(
            sql,
            "INSERT INTO migrations (uuid, timestamp, version) VALUES ('u1', 1, 'Version001'), ('u2', 2, ['a', 'b'])"
        );
    }

    #[test]
    fn test_new_client() {
        let client = HttpClient::new(ConnectionConfig::default()).unwrap();
        assert_eq!(client.database(), "default");
        assert_eq!(client.client_type(), "clickhouse-http");
    }
}
