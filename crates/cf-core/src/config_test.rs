use super::*;
use serial_test::serial;

#[test]
fn test_parse_minimal_config() {
    let config: Config = serde_yaml::from_str("name: analytics").unwrap();
    assert_eq!(config.name, "analytics");
    assert_eq!(config.migration_path, "migrations");
    assert_eq!(config.connection, ConnectionConfig::default());
    assert_eq!(config.connection.url, "http://localhost:8123");
    assert_eq!(config.connection.database, "default");

    let root = PathBuf::from("/tmp/project");
    assert_eq!(
        config.migration_path_absolute(&root),
        root.join("migrations")
    );
}

#[test]
fn test_parse_full_config() {
    let yaml = r#"
name: analytics
migration_path: schema/migrations
connection:
  url: http://clickhouse:8123
  database: reports
  user: migrator
  password: secret
vars:
  kafka_brokers: "kafka:9092"
targets:
  prod:
    connection:
      url: https://ch.prod:8443
      database: reports
    vars:
      kafka_brokers: "kafka.prod:9092"
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.migration_path, "schema/migrations");
    assert_eq!(config.connection.user, "migrator");
    assert_eq!(config.available_targets(), vec!["prod"]);

    let prod = &config.targets["prod"];
    let conn = prod.connection.as_ref().unwrap();
    assert_eq!(conn.user, "default");
    assert_eq!(conn.url, "https://ch.prod:8443");
}

#[test]
fn test_unknown_field_rejected() {
    let result: Result<Config, _> = serde_yaml::from_str("name: x\nmaterialization: table");
    assert!(result.is_err());
}

#[test]
fn test_load_from_dir_missing() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(matches!(err, CoreError::ConfigNotFound { .. }));
    assert!(err.to_string().contains("[C001]"));
}

#[test]
fn test_load_from_dir_yaml_extension() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("clickforge.yaml"), "name: alt").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.name, "alt");
}

#[test]
fn test_load_rejects_bad_url() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clickforge.yml");
    std::fs::write(&path, "name: x\nconnection:\n  url: tcp://localhost:9000\n").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigInvalid { .. }));
}

#[test]
fn test_load_rejects_empty_name() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clickforge.yml");
    std::fs::write(&path, "name: \"  \"\n").unwrap();
    assert!(Config::load(&path).is_err());
}

#[test]
fn test_load_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("clickforge.yml");
    std::fs::write(&path, "name: [unterminated").unwrap();
    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, CoreError::ConfigParseError { .. }));
}

#[test]
#[serial]
fn test_get_connection_config_target_fallback() {
    std::env::remove_var(PASSWORD_ENV);
    let yaml = r#"
name: analytics
connection:
  database: base
targets:
  dev: {}
  prod:
    connection:
      database: prod_db
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(
        config.get_connection_config(None).unwrap().database,
        "base"
    );
    assert_eq!(
        config.get_connection_config(Some("dev")).unwrap().database,
        "base"
    );
    assert_eq!(
        config.get_connection_config(Some("prod")).unwrap().database,
        "prod_db"
    );

    let err = config.get_connection_config(Some("staging")).unwrap_err();
    assert!(err.to_string().contains("Available targets: dev, prod"));
}

#[test]
#[serial]
fn test_password_env_override() {
    let config: Config = serde_yaml::from_str("name: x\nconnection:\n  password: file").unwrap();
    std::env::set_var(PASSWORD_ENV, "from_env");
    let conn = config.get_connection_config(None).unwrap();
    std::env::remove_var(PASSWORD_ENV);
    assert_eq!(conn.password, "from_env");
}

#[test]
fn test_merged_vars() {
    let yaml = r#"
name: analytics
vars:
  a: "1"
  b: "2"
targets:
  prod:
    vars:
      b: "20"
"#;
    let config: Config = serde_yaml::from_str(yaml).unwrap();
    let base = config.get_merged_vars(None);
    assert_eq!(base["b"], serde_yaml::Value::from("2"));

    let prod = config.get_merged_vars(Some("prod"));
    assert_eq!(prod["a"], serde_yaml::Value::from("1"));
    assert_eq!(prod["b"], serde_yaml::Value::from("20"));
}

#[test]
#[serial]
fn test_resolve_target_prefers_cli() {
    std::env::set_var(TARGET_ENV, "staging");
    assert_eq!(Config::resolve_target(Some("prod")), Some("prod".to_string()));
    assert_eq!(Config::resolve_target(None), Some("staging".to_string()));
    std::env::remove_var(TARGET_ENV);
    assert_eq!(Config::resolve_target(None), None);
}
