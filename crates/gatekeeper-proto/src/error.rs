//! Error types for frame encoding and decoding.

use thiserror::Error;

/// Errors raised while encoding a request frame or decoding a response
/// frame.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The caller supplied a value that does not fit the wire format (e.g.
    /// a year outside `0000..=9999`, or a passcode outside `0..=999999`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A received buffer failed frame-level validation: wrong length,
    /// invalid start-of-message byte, or unexpected function code.
    #[error("bad frame ({reason}): offending byte {byte:#04x}")]
    BadFrame {
        /// The byte that caused validation to fail.
        byte: u8,
        /// Human-readable description of which check failed.
        reason: &'static str,
    },
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ProtocolError>;
