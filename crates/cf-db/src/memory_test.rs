use super::*;

async fn ledger_client() -> MemoryClient {
    let client = MemoryClient::new();
    client
        .write("CREATE TABLE IF NOT EXISTS migrations (uuid UUID, timestamp Int64, version String) ENGINE = MergeTree() ORDER BY timestamp")
        .await
        .unwrap();
    client
}

fn cols() -> Vec<String> {
    vec![
        "uuid".to_string(),
        "timestamp".to_string(),
        "version".to_string(),
    ]
}

#[tokio::test]
async fn test_client_type() {
    assert_eq!(MemoryClient::new().client_type(), "memory");
}

#[tokio::test]
async fn test_create_and_show() {
    let client = ledger_client().await;
    assert!(client.show_tables().await.unwrap().contains("migrations"));
    let ddl = client.show_create_table("migrations").await.unwrap();
    assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS migrations"));
    assert_eq!(client.show_create_table("absent").await.unwrap(), "");
    assert_eq!(
        client.object_kind("migrations").unwrap(),
        Some(ObjectKind::Table)
    );
}

#[tokio::test]
async fn test_create_if_not_exists_is_idempotent() {
    let client = ledger_client().await;
    client
        .write("CREATE TABLE IF NOT EXISTS migrations (x UInt8) ENGINE = MergeTree()")
        .await
        .unwrap();
    let err = client
        .write("CREATE TABLE migrations (x UInt8) ENGINE = MergeTree()")
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ExecutionError(_)));
}

#[tokio::test]
async fn test_drop() {
    let client = MemoryClient::new();
    client
        .write("CREATE MATERIALIZED VIEW IF NOT EXISTS mv TO t AS SELECT * FROM q")
        .await
        .unwrap();
    assert_eq!(client.object_kind("mv").unwrap(), Some(ObjectKind::View));
    client.write("DROP VIEW IF EXISTS mv").await.unwrap();
    client.write("DROP VIEW IF EXISTS mv").await.unwrap();
    let err = client.write("DROP TABLE mv").await.unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[tokio::test]
async fn test_insert_select_delete() {
    let client = ledger_client().await;
    client
        .insert(
            "migrations",
            &[
                vec![Value::from("u1"), Value::from(100), Value::from("Version001")],
                vec![Value::from("u2"), Value::from(200), Value::from("Version002")],
            ],
            &cols(),
        )
        .await
        .unwrap();

    let mut params = Params::new();
    params.insert("version".to_string(), Value::from("Version002"));
    let found = client
        .select(
            "SELECT * FROM migrations WHERE version=:version LIMIT 1",
            &params,
        )
        .await
        .unwrap();
    assert_eq!(found.rows().len(), 1);
    assert_eq!(found.fetch_one("uuid"), Some(&Value::from("u2")));

    let last = client
        .select(
            "SELECT version FROM migrations ORDER BY timestamp DESC, version DESC LIMIT 1",
            &Params::new(),
        )
        .await
        .unwrap();
    assert_eq!(last.fetch_one("version"), Some(&Value::from("Version002")));
    assert_eq!(last.count_all(), 2);

    client
        .write("ALTER TABLE migrations DELETE WHERE version='Version002'")
        .await
        .unwrap();
    let rows = client.rows("migrations").unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["version"], Value::from("Version001"));
}

#[tokio::test]
async fn test_insert_arity_mismatch() {
    let client = ledger_client().await;
    let err = client
        .insert("migrations", &[vec![Value::from("u1")]], &cols())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("[D002]"));
}

#[tokio::test]
async fn test_insert_into_missing_table() {
    let client = MemoryClient::new();
    let err = client.insert("nope", &[], &cols()).await.unwrap_err();
    assert!(matches!(err, DbError::TableNotFound(_)));
}

#[tokio::test]
async fn test_queued_result_answers_unsupported_select() {
    let client = MemoryClient::new();
    let mut row = Row::new();
    row.insert("total".to_string(), Value::from(3));
    client
        .push_select_result(SelectResult::new(vec![row], 3))
        .unwrap();

    let result = client
        .select(
            "SELECT count() AS total FROM events e LEFT JOIN users u ON u.id = e.user_id GROUP BY total",
            &Params::new(),
        )
        .await
        .unwrap();
    assert_eq!(result.count_all(), 3);

    let err = client
        .select("SELECT 1 FROM events e JOIN x", &Params::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("[D005]"));
}

#[tokio::test]
async fn test_unsupported_write() {
    let client = MemoryClient::new();
    let err = client.write("OPTIMIZE TABLE t FINAL").await.unwrap_err();
    assert!(matches!(err, DbError::Unsupported { .. }));
    assert_eq!(client.executed().unwrap(), vec!["OPTIMIZE TABLE t FINAL"]);
}

#[tokio::test]
async fn test_select_projection_with_alias() {
    let client = ledger_client().await;
    client
        .insert(
            "migrations",
            &[vec![Value::from("u1"), Value::from(100), Value::from("Version001")]],
            &cols(),
        )
        .await
        .unwrap();

    let result = client
        .select(
            "SELECT version AS v, timestamp FROM migrations",
            &Params::new(),
        )
        .await
        .unwrap();
    let row = &result.rows()[0];
    assert_eq!(row.len(), 2);
    assert_eq!(row["v"], Value::from("Version001"));
    assert_eq!(row["timestamp"], Value::from(100));

    let err = client
        .select("SELECT max(timestamp) FROM migrations", &Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Unsupported { .. }));
}
