//! # svclog-sink
//!
//! Producer-side log destinations. A [`LogSink`] hands out somewhere for a
//! service's output to go; which implementation is used is decided once per
//! process by [`global`]:
//!
//! - [`RemoteSink`] when the log daemon's control socket exists, passing
//!   descriptors to the daemon through a [`DescriptorHandoff`];
//! - [`FileSink`] otherwise, writing plain files.

pub mod error;
pub mod file;
pub mod handoff;
pub mod remote;

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use svclog_core::{PlumbingConfig, ServiceName};

pub use error::SinkError;
pub use file::FileSink;
pub use handoff::{ControlSocket, DescriptorHandoff};
pub use remote::RemoteSink;

/// A destination for service output.
pub trait LogSink: Send + Sync {
    /// Path a service's output can be redirected to. Always returns a
    /// usable path; when no real destination can be prepared this is the
    /// discard device.
    fn locate(&self, service: &str) -> PathBuf;

    /// A handle the caller can write the service's output to right away.
    fn open(&self, service: &str) -> Result<File, SinkError>;

    /// Copy all logged output collected so far to `out`.
    fn dump_all(&self, out: &mut dyn Write) -> Result<(), SinkError>;
}

/// Which [`LogSink`] implementation a configuration selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    File,
    Remote,
}

/// Probe for the control socket. Anything at that path, even something we
/// cannot inspect, counts as a running daemon.
pub fn probe(control_socket: &Path) -> SinkKind {
    match std::fs::symlink_metadata(control_socket) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => SinkKind::File,
        _ => SinkKind::Remote,
    }
}

/// Build the sink `config` selects, probing the filesystem now.
pub fn select(config: &PlumbingConfig) -> Arc<dyn LogSink> {
    let kind = probe(&config.control_socket);
    tracing::debug!(?kind, control_socket = %config.control_socket.display(), "log sink selected");
    match kind {
        SinkKind::Remote => Arc::new(RemoteSink::new(
            &config.fifo_dir,
            &config.query_socket,
            Arc::new(ControlSocket::new(&config.control_socket)),
        )),
        SinkKind::File => Arc::new(FileSink::new(&config.log_dir)),
    }
}

/// Names that would resolve outside a sink's directory are refused.
pub(crate) fn ensure_path_safe(service: &str) -> Result<(), SinkError> {
    if ServiceName::from(service).is_path_safe() {
        Ok(())
    } else {
        Err(SinkError::InvalidServiceName {
            service: service.to_owned(),
        })
    }
}

static SELECTED: OnceLock<Arc<dyn LogSink>> = OnceLock::new();

/// The process-wide sink. The first call selects it from `config`; later
/// calls return the same sink whatever they pass.
pub fn global(config: &PlumbingConfig) -> Arc<dyn LogSink> {
    SELECTED.get_or_init(|| select(config)).clone()
}
