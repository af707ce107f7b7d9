//! Well-known filesystem locations shared with the log daemon.

use std::path::{Path, PathBuf};

/// Stream socket the daemon answers log queries on.
pub const QUERY_SOCKET: &str = "/var/run/memlogdq.sock";

/// Datagram socket the daemon accepts descriptor handoffs on. Its presence
/// is what tells a producer that centralized logging is available.
pub const CONTROL_SOCKET: &str = "/var/run/external-logging.sock";

/// Directory the collector writes per-service log files into.
pub const LOG_DIR: &str = "/var/log";

/// Directory the remote sink creates its named pipes in.
pub const FIFO_DIR: &str = "/var/run";

/// Destination handed out when no real log destination could be prepared.
pub const DISCARD_PATH: &str = "/dev/null";

/// Extension used for per-service files written directly by a producer.
pub const LOG_EXTENSION: &str = "log";

/// `<dir>/<service>.log`
pub fn service_log_path(dir: &Path, service: &str) -> PathBuf {
    dir.join(format!("{service}.{LOG_EXTENSION}"))
}

/// `<base>.<n>`, the `n`-th rotated sibling of `base`.
pub fn rotated_path(base: &Path, n: usize) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!(".{n}"));
    PathBuf::from(name)
}
