//! Configuration loading from disk.

use std::fs;
use std::path::PathBuf;

use svclog_core::{ConfigError, PlumbingConfig};
use tempfile::TempDir;

#[test]
fn load_reads_yaml_document() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("svclog.yaml");
    fs::write(
        &path,
        "query_socket: /run/q.sock\nmax_log_files: 3\nself_prefix: logwrite\n",
    )
    .expect("write");

    let cfg = PlumbingConfig::load_at(&path).expect("load");
    assert_eq!(cfg.query_socket, PathBuf::from("/run/q.sock"));
    assert_eq!(cfg.max_log_files, 3);
    assert_eq!(cfg.self_prefix, "logwrite");
}

#[test]
fn load_missing_file_is_an_io_error() {
    let dir = TempDir::new().expect("tempdir");
    let err = PlumbingConfig::load_at(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "got: {err}");
}

#[test]
fn load_corrupt_yaml_reports_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "max_log_size: [unclosed").expect("write");

    let err = PlumbingConfig::load_at(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }), "got: {err}");
    assert!(err.to_string().contains("broken.yaml"));
}

#[test]
fn no_path_means_defaults() {
    let cfg = PlumbingConfig::load_or_default(None).expect("defaults");
    assert_eq!(cfg, PlumbingConfig::default());
}
