//! Log collector: follows the log daemon's query socket and keeps one
//! size-bounded, rotated log file per service.

pub mod consumer;
mod error;
pub mod log_rotation;
pub mod protocol;
mod runtime;

pub use consumer::{Consumer, ConsumerSummary, LineOutcome};
pub use error::CollectorError;
pub use log_rotation::RotatedLogFile;
pub use runtime::{ensure_log_dir, init_tracing, run, start_blocking, LogFormat};
