//! Tests for loading bridge configuration from disk.

use std::io::Write;
use std::time::Duration;

use horizon_axbridge_core::config::DEFAULT_QUEUE_CAPACITY;
use horizon_axbridge_core::{BridgeConfig, ConfigError, ToolkitContext};

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "handoff_timeout_ms = 120").unwrap();
    writeln!(file, "context_thread_name = \"grid-ui\"").unwrap();

    let config = BridgeConfig::load(file.path()).unwrap();
    assert_eq!(config.handoff_timeout, Duration::from_millis(120));
    assert_eq!(config.queue_capacity, DEFAULT_QUEUE_CAPACITY);
    assert_eq!(config.context_thread_name, "grid-ui");

    let context = ToolkitContext::with_config(&config).unwrap();
    assert_eq!(context.name(), "grid-ui");
    assert_eq!(context.handoff_timeout(), Duration::from_millis(120));
    context.stop_and_join();
}

#[test]
fn test_load_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    match BridgeConfig::load(&path) {
        Err(ConfigError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[test]
fn test_load_rejects_zero_timeout() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "handoff_timeout_ms = 0").unwrap();

    assert!(matches!(
        BridgeConfig::load(file.path()),
        Err(ConfigError::Invalid {
            field: "handoff_timeout",
            ..
        })
    ));
}

#[test]
fn test_load_rejects_unknown_key() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "handoff_timeout = 100").unwrap();

    assert!(matches!(
        BridgeConfig::load(file.path()),
        Err(ConfigError::Parse(_))
    ));
}
