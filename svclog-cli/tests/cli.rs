//! End-to-end runs of the `svclog` binary in file-sink mode and against a
//! fake log daemon.

use std::fs;
use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

struct Sandbox {
    dir: TempDir,
    config: PathBuf,
    log_dir: PathBuf,
}

impl Sandbox {
    /// A configuration whose control socket does not exist, so every
    /// command runs with the file sink.
    fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let log_dir = dir.path().join("logs");
        fs::create_dir(&log_dir).expect("log dir");
        let config = dir.path().join("svclog.yaml");
        fs::write(
            &config,
            format!(
                "control_socket: {}\nquery_socket: {}\nlog_dir: {}\nfifo_dir: {}\n",
                dir.path().join("external-logging.sock").display(),
                dir.path().join("memlogdq.sock").display(),
                log_dir.display(),
                dir.path().display(),
            ),
        )
        .expect("write config");
        Self {
            dir,
            config,
            log_dir,
        }
    }

    fn query_socket(&self) -> PathBuf {
        self.dir.path().join("memlogdq.sock")
    }

    fn svclog(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("svclog"));
        cmd.arg("--config").arg(&self.config);
        cmd
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("read {}: {e}", path.display()))
}

#[test]
fn help_lists_commands() {
    Command::new(assert_cmd::cargo::cargo_bin!("svclog"))
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("collect"))
        .stdout(contains("dump"))
        .stdout(contains("exec"));
}

#[test]
fn exec_writes_command_output_to_service_log() {
    let sandbox = Sandbox::new();
    sandbox
        .svclog()
        .args(["exec", "web", "--", "sh", "-c", "echo hello; echo oops >&2"])
        .assert()
        .success();

    let content = read(&sandbox.log_dir.join("web.log"));
    assert!(content.contains("hello\n"));
    assert!(content.contains("oops\n"));
}

#[test]
fn exec_by_path_uses_located_file() {
    let sandbox = Sandbox::new();
    sandbox
        .svclog()
        .args(["exec", "--by-path", "db", "--", "echo", "ready"])
        .assert()
        .success();

    assert_eq!(read(&sandbox.log_dir.join("db.log")), "ready\n");
}

#[test]
fn exec_rejects_reserved_characters_in_service_name() {
    let sandbox = Sandbox::new();
    sandbox
        .svclog()
        .args(["exec", "a;b", "--", "true"])
        .assert()
        .failure()
        .stderr(contains("invalid service name"));
}

#[test]
fn exec_reports_failing_command() {
    let sandbox = Sandbox::new();
    sandbox
        .svclog()
        .args(["exec", "job", "--", "false"])
        .assert()
        .failure()
        .stderr(contains("exited with"));
}

#[test]
fn dump_prints_log_files() {
    let sandbox = Sandbox::new();
    fs::write(sandbox.log_dir.join("a.log"), "from a\n").expect("write a");
    fs::write(sandbox.log_dir.join("b.log"), "from b\n").expect("write b");
    fs::write(sandbox.log_dir.join("a.log.0"), "rotated\n").expect("write rotated");

    sandbox
        .svclog()
        .arg("dump")
        .assert()
        .success()
        .stdout(contains("from a"))
        .stdout(contains("from b"))
        .stdout(contains("rotated").not());
}

#[test]
fn collect_without_daemon_fails() {
    let sandbox = Sandbox::new();
    sandbox
        .svclog()
        .arg("collect")
        .assert()
        .failure()
        .stderr(contains("not reachable"));
}

#[test]
fn collect_writes_and_rotates_from_daemon_stream() {
    let sandbox = Sandbox::new();
    let listener = UnixListener::bind(sandbox.query_socket()).expect("bind query socket");
    let daemon = thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("accept");
        let mut command = [0u8; 1];
        stream.read_exact(&mut command).expect("command byte");
        stream
            .write_all(
                b"2021-01-01T00:00:00Z,app;msg1\n\
                  2021-01-01T00:00:01Z,app;msg2\n\
                  2021-01-01T00:00:02Z,svclog;noise\n\
                  2021-01-01T00:00:03Z,app;msg3\n",
            )
            .expect("write stream");
        command[0]
    });

    sandbox
        .svclog()
        .args(["collect", "--max-log-size", "50", "--max-log-files", "3"])
        .assert()
        .success();

    assert_eq!(daemon.join().expect("daemon"), 2, "dump-then-follow requested");
    assert_eq!(
        read(&sandbox.log_dir.join("app.0")),
        "2021-01-01T00:00:00Z,app;msg1\n2021-01-01T00:00:01Z,app;msg2\n"
    );
    assert_eq!(
        read(&sandbox.log_dir.join("app")),
        "2021-01-01T00:00:03Z,app;msg3\n"
    );
    assert!(!sandbox.log_dir.join("svclog").exists());
}
