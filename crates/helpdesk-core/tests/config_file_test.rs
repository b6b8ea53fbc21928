#![allow(clippy::expect_used, clippy::unwrap_used)]

//! Config loading from disk.

use std::io::Write;

use helpdesk_core::config::{Config, ConfigError};

fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn load_reads_yaml_and_validates() {
    let file = write_config(
        "global:\n  data_dir: /tmp/helpdesk-data\n  config_dir: /tmp/helpdesk-config\ntui:\n  theme: high-contrast\n  menu_width: 40\n",
    );
    let cfg = Config::load(file.path()).unwrap();
    assert_eq!(cfg.global.data_dir, "/tmp/helpdesk-data");
    assert_eq!(cfg.tui.theme, "high-contrast");
    assert_eq!(cfg.tui.menu_width, 40);
    assert_eq!(cfg.tui.max_rows, 24);
}

#[test]
fn load_rejects_invalid_values() {
    let file = write_config("logging:\n  format: xml\n");
    let err = Config::load(file.path()).unwrap_err();
    match err {
        ConfigError::Invalid(message) => assert!(message.contains("logging.format")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn load_reports_parse_errors_with_path() {
    let file = write_config("tui: [not, a, map]\n");
    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains(&file.path().display().to_string()));
}

#[test]
fn load_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    let err = Config::load(&missing).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
