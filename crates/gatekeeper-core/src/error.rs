//! Shared error type for the address resolver and controller descriptor
//! normalization.

use thiserror::Error;

/// Errors raised while resolving an address string or normalizing a
/// controller descriptor.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The given string is not a valid `host[:port]` address, or `host` is
    /// not a dotted-quad IPv4 literal.
    #[error("invalid address {0:?}: {1}")]
    InvalidAddress(String, &'static str),
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, CoreError>;
