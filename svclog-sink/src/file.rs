//! Direct-to-file sink used when no log daemon is present.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use svclog_core::paths::{service_log_path, DISCARD_PATH, LOG_EXTENSION};

use crate::error::{io_err, SinkError};
use crate::{ensure_path_safe, LogSink};

/// Writes each service's output to `<dir>/<service>.log`.
#[derive(Debug, Clone)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl LogSink for FileSink {
    /// The file is created (and truncated) here so that the returned path is
    /// immediately usable. If that fails, output is sent to the discard path.
    fn locate(&self, service: &str) -> PathBuf {
        match self.open(service) {
            Ok(_file) => service_log_path(&self.dir, service),
            Err(err) => {
                tracing::warn!(service, error = %err, "cannot create log file, discarding output");
                PathBuf::from(DISCARD_PATH)
            }
        }
    }

    fn open(&self, service: &str) -> Result<File, SinkError> {
        ensure_path_safe(service)?;
        let path = service_log_path(&self.dir, service);
        File::create(&path).map_err(|e| io_err(&path, e))
    }

    /// Copies every `*.log` file in directory-listing order. Files are not
    /// merged chronologically. A file that cannot be read is reported and
    /// skipped.
    fn dump_all(&self, out: &mut dyn Write) -> Result<(), SinkError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        for entry in entries {
            let path = match entry {
                Ok(entry) => entry.path(),
                Err(err) => {
                    tracing::warn!(dir = %self.dir.display(), error = %err, "skipping unreadable entry");
                    continue;
                }
            };
            if path.extension().and_then(|e| e.to_str()) != Some(LOG_EXTENSION) {
                continue;
            }
            if let Err(err) = copy_file(&path, out) {
                tracing::warn!(path = %path.display(), error = %err, "failed to copy log file");
            }
        }
        out.flush().map_err(|e| io_err("<output>", e))
    }
}

fn copy_file(path: &Path, out: &mut dyn Write) -> io::Result<u64> {
    let mut file = File::open(path)?;
    io::copy(&mut file, out)
}
