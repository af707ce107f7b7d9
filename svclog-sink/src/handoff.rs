//! Passing an open descriptor to the log daemon.
//!
//! The daemon listens on a datagram socket. Each registration is one
//! datagram: the payload is the service name, the ancillary data carries
//! exactly one descriptor (`SCM_RIGHTS`). Nothing is sent back.

use std::io::IoSlice;
use std::os::fd::{AsRawFd, BorrowedFd};
use std::os::unix::net::UnixDatagram;
use std::path::PathBuf;

use nix::sys::socket::{sendmsg, ControlMessage, MsgFlags, UnixAddr};

use crate::error::SinkError;

/// Hand a writable endpoint to the process that owns a service's logs.
pub trait DescriptorHandoff: Send + Sync {
    fn hand_off(&self, service: &str, fd: BorrowedFd<'_>) -> Result<(), SinkError>;
}

/// [`DescriptorHandoff`] over the daemon's Unix datagram control socket.
#[derive(Debug, Clone)]
pub struct ControlSocket {
    path: PathBuf,
}

impl ControlSocket {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn unavailable(&self, source: std::io::Error) -> SinkError {
        SinkError::LoggingUnavailable {
            socket: self.path.clone(),
            source,
        }
    }
}

impl DescriptorHandoff for ControlSocket {
    fn hand_off(&self, service: &str, fd: BorrowedFd<'_>) -> Result<(), SinkError> {
        let socket = UnixDatagram::unbound().map_err(|e| self.unavailable(e))?;
        let addr = UnixAddr::new(self.path.as_path()).map_err(|e| self.unavailable(e.into()))?;

        let payload = [IoSlice::new(service.as_bytes())];
        let fds = [fd.as_raw_fd()];
        let rights = [ControlMessage::ScmRights(&fds)];

        sendmsg(
            socket.as_raw_fd(),
            &payload,
            &rights,
            MsgFlags::empty(),
            Some(&addr),
        )
        .map_err(|e| self.unavailable(e.into()))?;

        tracing::debug!(service, socket = %self.path.display(), "handed off log descriptor");
        Ok(())
    }
}
