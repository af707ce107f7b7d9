//! Error types for svclog-core.

use std::path::PathBuf;

use thiserror::Error;

/// Failure to decode one wire line into a [`crate::LogMessage`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WireError {
    /// The line does not follow `<timestamp>,<service>;<body>`.
    #[error("malformed log message ({reason}): {line}")]
    MalformedMessage { line: String, reason: &'static str },
}

/// All errors that can arise while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with the offending file path.
    #[error("failed to parse configuration at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
