//! Collector against a fake log daemon listening on a temporary socket.

use std::fs;
use std::path::Path;

use svclog_collector::{run, CollectorError};
use svclog_core::paths::rotated_path;
use svclog_core::{PlumbingConfig, QueryCommand};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::UnixListener;
use tokio::task::JoinHandle;

/// Accept one query client, check its command byte, send `lines`, close.
fn fake_daemon(socket: &Path, lines: Vec<String>) -> JoinHandle<u8> {
    let listener = UnixListener::bind(socket).expect("bind query socket");
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.expect("accept");
        let mut command = [0u8; 1];
        stream.read_exact(&mut command).await.expect("command byte");
        for line in lines {
            stream.write_all(line.as_bytes()).await.expect("write line");
            stream.write_all(b"\n").await.expect("write newline");
        }
        command[0]
    })
}

fn config(dir: &TempDir, max_log_size: u64, max_log_files: usize) -> PlumbingConfig {
    let log_dir = dir.path().join("logs");
    fs::create_dir_all(&log_dir).expect("log dir");
    PlumbingConfig {
        query_socket: dir.path().join("memlogdq.sock"),
        log_dir,
        max_log_size,
        max_log_files,
        ..PlumbingConfig::default()
    }
}

#[tokio::test]
async fn three_thirty_byte_lines_rotate_once_after_second() {
    let dir = TempDir::new().expect("tempdir");
    let cfg = config(&dir, 50, 10);
    // 20-byte timestamp + ",app;" + 4-byte body + newline = 30 bytes.
    let lines: Vec<String> = ["msg1", "msg2", "msg3"]
        .iter()
        .enumerate()
        .map(|(i, body)| format!("2021-01-01T00:00:0{i}Z,app;{body}"))
        .collect();
    assert!(lines.iter().all(|l| l.len() + 1 == 30));

    let daemon = fake_daemon(&cfg.query_socket, lines);
    let summary = run(&cfg).await.expect("collector run");

    assert_eq!(daemon.await.expect("daemon"), QueryCommand::DumpFollow.as_byte());
    assert_eq!(summary.written, 3);
    assert_eq!(summary.rotations, 1);

    let base = cfg.log_dir.join("app");
    let rotated = fs::read_to_string(rotated_path(&base, 0)).expect("app.0");
    assert_eq!(
        rotated,
        "2021-01-01T00:00:00Z,app;msg1\n2021-01-01T00:00:01Z,app;msg2\n"
    );
    assert_eq!(
        fs::read_to_string(&base).expect("app"),
        "2021-01-01T00:00:02Z,app;msg3\n"
    );
    assert!(!rotated_path(&base, 1).exists());
}

#[tokio::test]
async fn services_are_split_and_own_output_dropped() {
    let dir = TempDir::new().expect("tempdir");
    let cfg = config(&dir, 1024, 10);
    let lines = vec![
        "2021-01-01T00:00:00Z,sshd;accepted".to_string(),
        "2021-01-01T00:00:01Z,svclog;rotated sshd".to_string(),
        "2021-01-01T00:00:02Z,getty;login:".to_string(),
        "this is not a log line".to_string(),
        "2021-01-01T00:00:03Z,sshd;closed".to_string(),
    ];

    let daemon = fake_daemon(&cfg.query_socket, lines);
    let summary = run(&cfg).await.expect("collector run");
    daemon.await.expect("daemon");

    assert_eq!(summary.written, 3);
    assert_eq!(summary.own_output, 1);
    assert_eq!(summary.malformed, 1);

    let mut names: Vec<_> = fs::read_dir(&cfg.log_dir)
        .expect("read logs")
        .map(|e| e.expect("entry").file_name().into_string().expect("utf8"))
        .collect();
    names.sort();
    assert_eq!(names, vec!["getty".to_string(), "sshd".to_string()]);
    assert_eq!(
        fs::read_to_string(cfg.log_dir.join("sshd"))
            .expect("sshd")
            .lines()
            .count(),
        2
    );
}

#[tokio::test]
async fn bytes_on_disk_match_bytes_appended_until_eviction() {
    let dir = TempDir::new().expect("tempdir");
    // Chain of 4 siblings; 12 lines of 30 bytes with rotation every 2 lines
    // produces 6 rotations, so the two oldest rotated files were evicted.
    let cfg = config(&dir, 50, 4);
    let lines: Vec<String> = (0..12)
        .map(|i| format!("2021-01-01T00:00:{i:02}Z,app;m{i:03}"))
        .collect();

    let daemon = fake_daemon(&cfg.query_socket, lines.clone());
    let summary = run(&cfg).await.expect("collector run");
    daemon.await.expect("daemon");
    assert_eq!(summary.rotations, 6);

    let base = cfg.log_dir.join("app");
    let mut on_disk = fs::metadata(&base).expect("base").len();
    for n in 0..4 {
        on_disk += fs::metadata(rotated_path(&base, n)).expect("sibling").len();
    }
    assert!(!rotated_path(&base, 4).exists());

    // Surviving content: the last 4 rotated pairs (lines 4..12); base is empty.
    let surviving: u64 = lines[4..].iter().map(|l| l.len() as u64 + 1).sum();
    assert_eq!(on_disk, surviving);
    assert_eq!(fs::metadata(&base).expect("base").len(), 0);
}

#[tokio::test]
async fn missing_daemon_is_reported() {
    let dir = TempDir::new().expect("tempdir");
    let cfg = config(&dir, 1024, 10);

    let err = run(&cfg).await.unwrap_err();
    assert!(matches!(err, CollectorError::DaemonUnavailable { .. }), "got: {err}");
}
