//! Error types for svclog-sink.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SinkError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The service name cannot be used as a file name inside the log or
    /// FIFO directory.
    #[error("invalid service name {service:?}")]
    InvalidServiceName { service: String },

    /// The log daemon did not accept a descriptor. Callers keep running
    /// without centralized logging.
    #[error("logging system not enabled (control socket {socket}): {source}")]
    LoggingUnavailable {
        socket: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SinkError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SinkError {
    SinkError::Io {
        path: path.into(),
        source,
    }
}
