//! Integration tests for configuration loading and validation

use chatllm_core::config::{
    load_from_file, load_from_json, load_from_yaml, ConfigError, ValidationErrorKind,
    DEFAULT_API_PATH,
};
use chatllm_core::ExtractionMode;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

/// Helper to create a test config file
fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_load_valid_yaml_config() {
    std::env::set_var("CHATLLM_TEST_YAML_KEY", "sk-yaml-key");

    let yaml = r#"
base_url: https://api.openai.com
api_key: ${CHATLLM_TEST_YAML_KEY}
model: gpt-4o
max_attempts: 4
temperature: 0.2
timeout_secs: 45
retry_pause_ms: 250
diagnostics: false
"#;

    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yaml", yaml);

    let config = load_from_yaml(path).unwrap();
    assert_eq!(config.endpoint_url(), "https://api.openai.com/v1/chat/completions");
    assert_eq!(
        config.credential().map(|k| k.expose_secret()),
        Some("sk-yaml-key")
    );
    assert_eq!(config.model, "gpt-4o");
    assert_eq!(config.max_attempts, 4);
    assert_eq!(config.timeout(), Duration::from_secs(45));
    assert_eq!(config.retry_pause(), Duration::from_millis(250));
    assert!(!config.diagnostics);

    std::env::remove_var("CHATLLM_TEST_YAML_KEY");
}

#[test]
fn test_load_valid_json_config() {
    let json = r#"{
        "base_url": "http://localhost:8080",
        "api_path": "/api/chat",
        "extraction": "structured"
    }"#;

    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.json", json);

    let config = load_from_json(&path).unwrap();
    assert_eq!(config.endpoint_url(), "http://localhost:8080/api/chat");
    assert_eq!(config.extraction, ExtractionMode::Structured);
    assert!(config.credential().is_none());

    // extension dispatch picks the JSON loader
    assert_eq!(load_from_file(&path).unwrap(), config);
}

#[test]
fn test_empty_yaml_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yml", "{}\n");

    let config = load_from_file(path).unwrap();
    assert_eq!(config.api_path, DEFAULT_API_PATH);
    assert_eq!(config.max_attempts, 3);
}

#[test]
fn test_missing_env_var_in_file() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yaml", "api_key: ${CHATLLM_TEST_UNSET_VAR}\n");

    match load_from_yaml(path) {
        Err(ConfigError::EnvVarNotFound { var }) => assert_eq!(var, "CHATLLM_TEST_UNSET_VAR"),
        other => panic!("Expected EnvVarNotFound, got {:?}", other),
    }
}

#[test]
fn test_yaml_parse_error_reports_location() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yaml", "max_attempts: [unclosed\n");

    match load_from_yaml(path) {
        Err(ConfigError::ParseError { line, .. }) => assert!(line.is_some()),
        other => panic!("Expected ParseError, got {:?}", other),
    }
}

#[test]
fn test_invalid_url_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.json", r#"{"base_url": "ftp://example.com"}"#);

    match load_from_json(path) {
        Err(ConfigError::ValidationError(err)) => {
            assert_eq!(err.field_path, "base_url");
            assert!(matches!(err.kind, ValidationErrorKind::InvalidUrl { .. }));
        }
        other => panic!("Expected ValidationError, got {:?}", other),
    }
}

#[test]
fn test_zero_timeout_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = create_test_file(&dir, "config.yaml", "timeout_secs: 0\n");

    let err = load_from_yaml(path).unwrap_err();
    assert!(err.to_string().contains("timeout_secs"));
}

#[test]
fn test_missing_file() {
    let result = load_from_yaml("/nonexistent/chatllm.yaml");
    assert!(matches!(result, Err(ConfigError::IoError { .. })));
}
