//! Query-socket command bytes.
//!
//! A query client writes exactly one of these bytes after connecting, then
//! reads newline-terminated wire lines until the daemon closes the stream.

/// Request sent as the first and only byte on a query connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum QueryCommand {
    /// Send the buffered history, then close.
    Dump = 0,
    /// Send new lines as they arrive, never closing.
    Follow = 1,
    /// Send the buffered history, then keep following.
    DumpFollow = 2,
}

impl QueryCommand {
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}
