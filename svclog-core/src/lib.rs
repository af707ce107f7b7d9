//! svclog core library — log message model, wire codec, shared conventions.
//!
//! - [`types`] — [`ServiceName`] and [`LogMessage`]
//! - [`wire`] — line encoding spoken by the log daemon
//! - [`protocol`] — query-socket command bytes
//! - [`paths`] — well-known socket and directory locations
//! - [`config`] — [`PlumbingConfig`] and its YAML loader

pub mod config;
pub mod error;
pub mod paths;
pub mod protocol;
pub mod types;
pub mod wire;

pub use config::PlumbingConfig;
pub use error::{ConfigError, WireError};
pub use protocol::QueryCommand;
pub use types::{LogMessage, ServiceName};
