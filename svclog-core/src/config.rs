//! Process configuration shared by the collector and the sink.
//!
//! Every field has a default, so an empty YAML document (or no document at
//! all) yields a working configuration. Values are not validated here; a bad
//! path or size shows up as an I/O failure where it is used.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths::{CONTROL_SOCKET, FIFO_DIR, LOG_DIR, QUERY_SOCKET};

/// Default size, in bytes, a log file may exceed before it is rotated.
pub const DEFAULT_MAX_LOG_SIZE: u64 = 1024;

/// Default length of a rotation chain.
pub const DEFAULT_MAX_LOG_FILES: usize = 10;

/// Service-name prefix the collector reserves for its own output.
pub const DEFAULT_SELF_PREFIX: &str = "svclog";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlumbingConfig {
    pub query_socket: PathBuf,
    pub control_socket: PathBuf,
    pub log_dir: PathBuf,
    pub fifo_dir: PathBuf,
    pub max_log_size: u64,
    pub max_log_files: usize,
    pub self_prefix: String,
}

impl Default for PlumbingConfig {
    fn default() -> Self {
        Self {
            query_socket: PathBuf::from(QUERY_SOCKET),
            control_socket: PathBuf::from(CONTROL_SOCKET),
            log_dir: PathBuf::from(LOG_DIR),
            fifo_dir: PathBuf::from(FIFO_DIR),
            max_log_size: DEFAULT_MAX_LOG_SIZE,
            max_log_files: DEFAULT_MAX_LOG_FILES,
            self_prefix: DEFAULT_SELF_PREFIX.to_string(),
        }
    }
}

impl PlumbingConfig {
    /// Load a YAML configuration document from `path`.
    pub fn load_at(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load `path` when given, otherwise fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_at(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes to unit, not to a mapping.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }
}
