use std::path::Path;

use svclog_core::{PlumbingConfig, QueryCommand};

use crate::consumer::{Consumer, ConsumerSummary};
use crate::error::{io_err, CollectorError};
use crate::protocol::connect;

/// Diagnostic output format for the process's own logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Start the collector and block the current thread until the daemon closes
/// the stream.
pub fn start_blocking(config: &PlumbingConfig) -> Result<ConsumerSummary, CollectorError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(config))
}

/// Connect to the query socket, request dump-then-follow and persist every
/// message until end of stream.
pub async fn run(config: &PlumbingConfig) -> Result<ConsumerSummary, CollectorError> {
    let reader = connect(&config.query_socket, QueryCommand::DumpFollow).await?;
    tracing::info!(
        socket = %config.query_socket.display(),
        log_dir = %config.log_dir.display(),
        max_log_size = config.max_log_size,
        max_log_files = config.max_log_files,
        "collector connected",
    );

    let mut consumer = Consumer::new(config);
    let summary = consumer.run(reader).await?;
    tracing::info!(
        written = summary.written,
        malformed = summary.malformed,
        own_output = summary.own_output,
        unsafe_names = summary.unsafe_names,
        rotations = summary.rotations,
        "log daemon closed the stream",
    );
    Ok(summary)
}

/// Install the global tracing subscriber, writing to stderr.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init_tracing(format: LogFormat) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

/// Check that `dir` exists and is a directory before streaming starts.
pub fn ensure_log_dir(dir: &Path) -> Result<(), CollectorError> {
    let meta = std::fs::metadata(dir).map_err(|e| io_err(dir, e))?;
    if meta.is_dir() {
        Ok(())
    } else {
        Err(io_err(
            dir,
            std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        ))
    }
}
