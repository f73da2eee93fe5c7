//! Configuration Tests.
//!
//! Verifies defaults, partial JSON documents, validation and file loading.

use std::io::Write;

use cxlbench_core::BenchConfig;
use cxlbench_core::common::ConfigError;
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn defaults_match_reference_run() {
    let config = BenchConfig::default();
    assert_eq!(config.connection.host, "127.0.0.1");
    assert_eq!(config.connection.port, 9999);
    assert!(!config.connection.nodelay);
    assert_eq!(config.memory.array_size, 1024 * 1024);
    assert_eq!(config.memory.line_size, 64);
    assert_eq!(config.memory.stride, 7);
    assert_eq!(config.workload.iterations, 1000);
    assert_eq!(config.workload.start_position, 0);
    assert_eq!(config.workload.probe_addr, 0x1000);
    assert_eq!(config.workload.sweep_ops, 1000);
    config.validate().unwrap();
}

#[test]
fn empty_document_is_default() {
    assert_eq!(BenchConfig::from_json_str("{}").unwrap(), BenchConfig::default());
}

#[test]
fn partial_sections_keep_other_defaults() {
    let config = BenchConfig::from_json_str(
        r#"{ "connection": { "host": "cxl-node", "nodelay": true }, "workload": { "iterations": 5 } }"#,
    )
    .unwrap();

    let mut expected = BenchConfig::default();
    expected.connection.host = "cxl-node".to_string();
    expected.connection.nodelay = true;
    expected.workload.iterations = 5;
    assert_eq!(config, expected);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = BenchConfig::from_json_str(r#"{ "memory": { "array_sz": 4096 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)), "{err}");
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        BenchConfig::from_json_str("{ not json"),
        Err(ConfigError::Parse(_))
    ));
}

#[rstest]
#[case::size_not_pow2(r#"{ "memory": { "array_size": 1000000 } }"#)]
#[case::line_too_wide(r#"{ "memory": { "line_size": 128 } }"#)]
#[case::start_unaligned(r#"{ "workload": { "start_position": 65 } }"#)]
#[case::start_outside(r#"{ "workload": { "start_position": 1048576 } }"#)]
#[case::probe_outside(r#"{ "memory": { "array_size": 4096 } }"#)]
fn invalid_values_fail_validation(#[case] json: &str) {
    let err = BenchConfig::from_json_str(json).unwrap_err();
    assert!(matches!(err, ConfigError::Geometry(_)), "{err}");
}

#[test]
fn address_space_reflects_memory_section() {
    let config =
        BenchConfig::from_json_str(r#"{ "memory": { "array_size": 65536, "line_size": 32 } }"#)
            .unwrap();
    let space = config.address_space().unwrap();
    assert_eq!(space.size(), 65536);
    assert_eq!(space.line_size(), 32);
    assert_eq!(space.lines(), 2048);
}

#[test]
fn load_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{ "connection": {{ "port": 7001 }} }}"#).unwrap();
    file.flush().unwrap();

    let config = BenchConfig::load(file.path()).unwrap();
    assert_eq!(config.connection.port, 7001);
}

#[test]
fn load_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    let err = BenchConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn serializes_back_to_loadable_json() {
    let mut config = BenchConfig::default();
    config.workload.sweep_ops = 42;
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(BenchConfig::from_json_str(&json).unwrap(), config);
}
