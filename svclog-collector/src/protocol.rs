//! Query-socket client.

use std::path::Path;

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use svclog_core::QueryCommand;

use crate::error::{io_err, CollectorError};

/// Connect to the daemon's query socket and send `command`.
///
/// The returned reader yields newline-terminated wire lines.
pub async fn connect(
    socket: &Path,
    command: QueryCommand,
) -> Result<BufReader<UnixStream>, CollectorError> {
    let mut stream = UnixStream::connect(socket).await.map_err(|err| {
        if matches!(
            err.kind(),
            std::io::ErrorKind::NotFound | std::io::ErrorKind::ConnectionRefused
        ) {
            CollectorError::DaemonUnavailable {
                socket: socket.to_path_buf(),
            }
        } else {
            io_err(socket, err)
        }
    })?;

    stream
        .write_all(&[command.as_byte()])
        .await
        .map_err(|e| io_err(socket, e))?;
    stream.flush().await.map_err(|e| io_err(socket, e))?;

    Ok(BufReader::new(stream))
}
