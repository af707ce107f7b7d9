//! Size-bounded per-service log files.
//!
//! A [`RotatedLogFile`] appends wire lines to `<dir>/<service>` and counts the
//! bytes written since the last rotation. Rotation shifts the chain
//! (`<service>` → `<service>.0` → `<service>.1` → … → `<service>.<max_files-1>`,
//! the last one being overwritten) and starts a fresh empty base file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use svclog_core::paths::rotated_path;
use svclog_core::{wire, LogMessage, ServiceName};

use crate::error::{io_err, CollectorError};

/// Append-only log file for one service, owned by the consumer loop.
#[derive(Debug)]
pub struct RotatedLogFile {
    /// `None` between closing the live file for rotation and reopening it.
    file: Option<File>,
    service: ServiceName,
    dir: PathBuf,
    bytes_written: u64,
}

impl RotatedLogFile {
    /// Create (or truncate) `<dir>/<service>`.
    pub fn create(dir: &Path, service: ServiceName) -> Result<Self, CollectorError> {
        let path = dir.join(service.as_str());
        let file = File::create(&path).map_err(|e| io_err(&path, e))?;
        Ok(Self {
            file: Some(file),
            service,
            dir: dir.to_path_buf(),
            bytes_written: 0,
        })
    }

    /// Path of the live (unsuffixed) file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(self.service.as_str())
    }

    /// Bytes appended to the live file since creation or the last rotation.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Encode `msg` and append it as one newline-terminated line.
    ///
    /// Returns the number of bytes added to the live file. If an earlier
    /// rotation failed after closing the live file, it is reopened for
    /// appending first.
    pub fn append(&mut self, msg: &LogMessage) -> Result<u64, CollectorError> {
        let mut line = wire::encode(msg);
        line.push(b'\n');

        let path = self.path();
        let file = match self.file.take() {
            Some(file) => file,
            None => OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| io_err(&path, e))?,
        };
        let file = self.file.insert(file);
        file.write_all(&line).map_err(|e| io_err(&path, e))?;

        let written = line.len() as u64;
        self.bytes_written += written;
        Ok(written)
    }

    /// `true` once the live file has grown past `max_bytes`.
    pub fn needs_rotation(&self, max_bytes: u64) -> bool {
        self.bytes_written > max_bytes
    }

    /// Close the live file, shift the rotation chain and reopen an empty
    /// live file.
    ///
    /// Missing links in the chain are skipped, so a chain with gaps (or the
    /// very first rotation, where only the live file exists) rotates cleanly.
    pub fn rotate(&mut self, max_files: usize) -> Result<(), CollectorError> {
        let base = self.path();
        if let Some(mut file) = self.file.take() {
            file.flush().map_err(|e| io_err(&base, e))?;
        }

        shift_chain(&base, max_files)?;

        self.file = Some(File::create(&base).map_err(|e| io_err(&base, e))?);
        self.bytes_written = 0;
        Ok(())
    }
}

/// Rename `<base>.(i-1)` → `<base>.i` for `i = max_files-1 … 0`, where index
/// `-1` is `base` itself.
fn shift_chain(base: &Path, max_files: usize) -> Result<(), CollectorError> {
    for i in (0..max_files).rev() {
        let newer = match i {
            0 => base.to_path_buf(),
            _ => rotated_path(base, i - 1),
        };
        let older = rotated_path(base, i);
        match fs::rename(&newer, &older) {
            Ok(()) => {}
            Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
            Err(err) => return Err(io_err(&newer, err)),
        }
    }
    Ok(())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
