//! Transport-layer error type.

use thiserror::Error;

/// Errors raised by the UDP/TCP transports.
#[derive(Error, Debug)]
pub enum TransportError {
    /// A socket operation failed.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A unicast send did not receive a reply within the bounded timeout.
    #[error("timed out waiting for a reply")]
    Timeout,

    /// The destination or listen address could not be resolved.
    #[error("address error: {0}")]
    AddrParse(String),
}

impl From<gatekeeper_core::CoreError> for TransportError {
    fn from(err: gatekeeper_core::CoreError) -> Self {
        Self::AddrParse(err.to_string())
    }
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, TransportError>;
