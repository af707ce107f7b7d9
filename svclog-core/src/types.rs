//! Domain types shared by log producers and consumers.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The name of a service whose output is being logged.
///
/// Conversions from strings are unchecked; use [`ServiceName::is_well_formed`]
/// and [`ServiceName::is_path_safe`] before trusting a name from outside.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceName(pub String);

impl ServiceName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `true` when the name contains none of the wire delimiters `,` and `;`.
    pub fn is_well_formed(&self) -> bool {
        !self.0.contains([',', ';'])
    }

    /// `true` when the name can be used as a single file name inside a log
    /// directory without escaping it.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && self.0 != "."
            && self.0 != ".."
            && !self.0.contains(['/', '\0'])
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ServiceName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ServiceName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// LogMessage
// ---------------------------------------------------------------------------

/// A single line of service output as recorded by the log daemon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    /// When the daemon received the line.
    pub timestamp: DateTime<Utc>,
    /// The service that wrote the line.
    pub service: ServiceName,
    /// The line itself, without its terminating newline. Services may write
    /// any bytes, so this is not required to be UTF-8.
    pub body: Vec<u8>,
}

impl LogMessage {
    pub fn new(
        timestamp: DateTime<Utc>,
        service: impl Into<ServiceName>,
        body: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            timestamp,
            service: service.into(),
            body: body.into(),
        }
    }
}

/// Human-oriented rendering: `<timestamp> <service> <body>`. Invalid UTF-8
/// in the body is shown as U+FFFD.
impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            self.service,
            String::from_utf8_lossy(&self.body)
        )
    }
}
