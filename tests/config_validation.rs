//! Integration tests for configuration validation

#![allow(clippy::expect_used, clippy::unwrap_used)]

use handshake_broker::config::{BrokerConfig, LoggingConfig, ServerConfig, MAX_FRAME_SIZE};
use handshake_broker::error::ProtocolError;
use std::io::Write;
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = BrokerConfig::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
    assert_eq!(config.server.max_frame_size, MAX_FRAME_SIZE);
    assert_eq!(config.logging.log_level, Level::INFO);
}

#[test]
fn test_max_frame_size_too_small() {
    let config = BrokerConfig::default_with_overrides(|c| c.server.max_frame_size = 4);
    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Max frame size too small")));
}

#[test]
fn test_max_frame_size_too_large() {
    let server = ServerConfig {
        max_frame_size: i32::MAX as usize + 1,
    };
    let errors = server.validate();
    assert!(errors.iter().any(|e| e.contains("Max frame size too large")));
}

#[test]
fn test_empty_app_name() {
    let logging = LoggingConfig {
        app_name: String::new(),
        ..LoggingConfig::default()
    };
    assert!(logging
        .validate()
        .iter()
        .any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_long_app_name() {
    let logging = LoggingConfig {
        app_name: "x".repeat(65),
        ..LoggingConfig::default()
    };
    assert!(logging.validate().iter().any(|e| e.contains("too long")));
}

#[test]
fn test_validate_strict_collects_errors() {
    let config = BrokerConfig::default_with_overrides(|c| {
        c.server.max_frame_size = 0;
        c.logging.app_name = String::new();
    });

    match config.validate_strict() {
        Err(ProtocolError::ConfigError(msg)) => {
            assert!(msg.contains("Max frame size"));
            assert!(msg.contains("Application name"));
        }
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_from_toml_partial() {
    let config = BrokerConfig::from_toml(
        r#"
        [server]
        max_frame_size = 1048576

        [logging]
        app_name = "edge-broker"
        log_level = "debug"
        json_format = true
        "#,
    )
    .unwrap();

    assert_eq!(config.server.max_frame_size, 1_048_576);
    assert_eq!(config.logging.app_name, "edge-broker");
    assert_eq!(config.logging.log_level, Level::DEBUG);
    assert!(config.logging.json_format);
}

#[test]
fn test_from_toml_missing_sections_use_defaults() {
    let config = BrokerConfig::from_toml("").unwrap();
    assert_eq!(config.server.max_frame_size, MAX_FRAME_SIZE);
    assert_eq!(config.logging.app_name, "handshake-broker");
}

#[test]
fn test_from_toml_invalid_log_level() {
    let result = BrokerConfig::from_toml(
        r#"
        [logging]
        app_name = "broker"
        log_level = "loud"
        json_format = false
        "#,
    );
    assert!(matches!(result, Err(ProtocolError::ConfigError(_))));
}

#[test]
fn test_example_config_roundtrip() {
    let example = BrokerConfig::example_config();
    let parsed = BrokerConfig::from_toml(&example).unwrap();
    assert_eq!(parsed.server.max_frame_size, MAX_FRAME_SIZE);
    assert_eq!(parsed.logging.log_level, Level::INFO);
}

#[test]
fn test_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[server]\nmax_frame_size = 4096").unwrap();

    let config = BrokerConfig::from_file(file.path()).unwrap();
    assert_eq!(config.server.max_frame_size, 4096);
}

#[test]
fn test_from_missing_file() {
    let result = BrokerConfig::from_file("/nonexistent/broker.toml");
    match result {
        Err(ProtocolError::ConfigError(msg)) => assert!(msg.contains("Failed to open")),
        other => panic!("expected config error, got {other:?}"),
    }
}

#[test]
fn test_from_env_overrides() {
    std::env::set_var("BROKER_MAX_FRAME_SIZE", "2048");
    std::env::set_var("BROKER_LOG_LEVEL", "warn");
    std::env::set_var("BROKER_LOG_JSON", "not-a-bool");

    let config = BrokerConfig::from_env().unwrap();
    assert_eq!(config.server.max_frame_size, 2048);
    assert_eq!(config.logging.log_level, Level::WARN);
    // unparseable values leave the default in place
    assert!(!config.logging.json_format);

    std::env::remove_var("BROKER_MAX_FRAME_SIZE");
    std::env::remove_var("BROKER_LOG_LEVEL");
    std::env::remove_var("BROKER_LOG_JSON");
}
