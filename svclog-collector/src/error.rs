use std::path::PathBuf;

use thiserror::Error;

/// Error surface for the collector: log file I/O and the query connection.
#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("log daemon is not reachable (query socket: {socket})")]
    DaemonUnavailable { socket: PathBuf },

    #[error("failed to read from log daemon: {0}")]
    Stream(#[source] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] svclog_core::ConfigError),
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CollectorError {
    CollectorError::Io {
        path: path.into(),
        source,
    }
}
