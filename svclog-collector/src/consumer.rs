//! The log consumer loop: wire lines in, per-service rotated files out.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use svclog_core::{wire, PlumbingConfig, ServiceName};

use crate::error::CollectorError;
use crate::log_rotation::RotatedLogFile;

/// What happened to one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Written { rotated: bool },
    Malformed,
    OwnOutput,
    UnsafeName,
}

/// Running totals for one consumer, reported when the stream ends.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerSummary {
    pub written: u64,
    pub malformed: u64,
    pub own_output: u64,
    pub unsafe_names: u64,
    pub rotations: u64,
}

impl ConsumerSummary {
    fn record(&mut self, outcome: LineOutcome) {
        match outcome {
            LineOutcome::Written { rotated } => {
                self.written += 1;
                if rotated {
                    self.rotations += 1;
                }
            }
            LineOutcome::Malformed => self.malformed += 1,
            LineOutcome::OwnOutput => self.own_output += 1,
            LineOutcome::UnsafeName => self.unsafe_names += 1,
        }
    }
}

/// Routes decoded messages to one [`RotatedLogFile`] per service.
///
/// Single-threaded by construction: the map of open files belongs to this
/// value and lines are handled strictly one after another.
#[derive(Debug)]
pub struct Consumer {
    log_dir: PathBuf,
    max_log_size: u64,
    max_log_files: usize,
    self_prefix: String,
    logs: HashMap<ServiceName, RotatedLogFile>,
    summary: ConsumerSummary,
}

impl Consumer {
    pub fn new(config: &PlumbingConfig) -> Self {
        Self {
            log_dir: config.log_dir.clone(),
            max_log_size: config.max_log_size,
            max_log_files: config.max_log_files,
            self_prefix: config.self_prefix.clone(),
            logs: HashMap::new(),
            summary: ConsumerSummary::default(),
        }
    }

    pub fn summary(&self) -> ConsumerSummary {
        self.summary
    }

    /// Services that have a log file open, in no particular order.
    pub fn services(&self) -> impl Iterator<Item = &ServiceName> {
        self.logs.keys()
    }

    /// Decode, filter and persist one wire line.
    ///
    /// Bad input is skipped and reported through the returned outcome; only
    /// log file I/O failures are errors. The body is stored exactly as
    /// received, whatever its encoding.
    pub fn handle_line(&mut self, line: &[u8]) -> Result<LineOutcome, CollectorError> {
        let outcome = self.route(line)?;
        self.summary.record(outcome);
        Ok(outcome)
    }

    fn route(&mut self, line: &[u8]) -> Result<LineOutcome, CollectorError> {
        let msg = match wire::decode(line) {
            Ok(msg) => msg,
            Err(err) => {
                tracing::warn!(error = %err, "skipping undecodable line");
                return Ok(LineOutcome::Malformed);
            }
        };

        // Our own diagnostics come back through the daemon; writing them
        // would feed the loop.
        if msg.service.has_prefix(&self.self_prefix) {
            return Ok(LineOutcome::OwnOutput);
        }

        if !msg.service.is_path_safe() {
            tracing::warn!(service = ?msg.service.as_str(), "skipping line with unusable service name");
            return Ok(LineOutcome::UnsafeName);
        }

        let log = match self.logs.entry(msg.service.clone()) {
            std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
            std::collections::hash_map::Entry::Vacant(entry) => {
                let log = RotatedLogFile::create(&self.log_dir, msg.service.clone())?;
                tracing::debug!(service = %msg.service, path = %log.path().display(), "opened log file");
                entry.insert(log)
            }
        };

        log.append(&msg)?;

        let rotated = log.needs_rotation(self.max_log_size);
        if rotated {
            log.rotate(self.max_log_files)?;
            tracing::info!(service = %msg.service, path = %log.path().display(), "log file rotated");
        }
        Ok(LineOutcome::Written { rotated })
    }

    /// Consume newline-terminated lines from `reader` until end of stream.
    ///
    /// A final fragment without a newline is dropped. Read failures other
    /// than a clean close are returned as [`CollectorError::Stream`].
    pub async fn run<R>(&mut self, mut reader: R) -> Result<ConsumerSummary, CollectorError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut buf = Vec::new();
        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(CollectorError::Stream)?;
            if read == 0 {
                break;
            }
            let Some(line) = buf.strip_suffix(b"\n") else {
                tracing::warn!(bytes = buf.len(), "discarding unterminated final line");
                break;
            };
            self.handle_line(line)?;
        }
        Ok(self.summary)
    }
}
