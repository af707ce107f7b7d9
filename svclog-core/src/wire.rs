//! Line-oriented wire format spoken by the log daemon.
//!
//! One message per line:
//!
//! ```text
//! <RFC3339 timestamp>,<service>[,<future header fields>...];<body>
//! ```
//!
//! The header ends at the first `;`; everything after it, further `;`
//! included, is the body. Readers only look at header fields 0 and 1 so that
//! new fields can be appended after the service name.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::WireError;
use crate::types::LogMessage;

const HEADER_END: u8 = b';';
const FIELD_SEP: char = ',';

/// Encode `msg` as a single line, without the terminating newline.
///
/// The body is copied byte for byte; only the header is text.
pub fn encode(msg: &LogMessage) -> Vec<u8> {
    let header = format!(
        "{}{FIELD_SEP}{}",
        msg.timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        msg.service
    );
    let mut line = Vec::with_capacity(header.len() + 1 + msg.body.len());
    line.extend_from_slice(header.as_bytes());
    line.push(HEADER_END);
    line.extend_from_slice(&msg.body);
    line
}

/// Decode one wire line. A single trailing `\n` is ignored.
///
/// The header must be UTF-8. The body is taken verbatim, so services that
/// write Latin-1 or binary output get exactly those bytes back.
pub fn decode(line: &[u8]) -> Result<LogMessage, WireError> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);

    let Some(split) = line.iter().position(|&b| b == HEADER_END) else {
        return Err(malformed(line, "missing ';' after header"));
    };
    let (header, body) = (&line[..split], &line[split + 1..]);

    let header = std::str::from_utf8(header).map_err(|_| malformed(line, "header is not UTF-8"))?;
    let mut fields = header.split(FIELD_SEP);
    let (Some(timestamp), Some(service)) = (fields.next(), fields.next()) else {
        return Err(malformed(line, "header needs a timestamp and a service name"));
    };

    let timestamp = DateTime::parse_from_rfc3339(timestamp)
        .map_err(|_| malformed(line, "timestamp is not RFC3339"))?
        .with_timezone(&Utc);

    Ok(LogMessage::new(timestamp, service, body))
}

fn malformed(line: &[u8], reason: &'static str) -> WireError {
    WireError::MalformedMessage {
        line: String::from_utf8_lossy(line).into_owned(),
        reason,
    }
}
