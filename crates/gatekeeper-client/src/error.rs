//! Client-facing error type unifying the codec, resolver, and transport
//! layers.

use thiserror::Error;

/// Errors surfaced by [`crate::Gatekeeper`] operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// A caller-supplied value violates the facade's own constraints (an
    /// out-of-range `SetInterlock` mode or `SetDoorPasscodes` code, or
    /// serial 0 where the broadcast form isn't allowed).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Frame encoding/decoding failed.
    #[error(transparent)]
    Protocol(#[from] gatekeeper_proto::ProtocolError),

    /// Address resolution or descriptor normalization failed.
    #[error(transparent)]
    Core(#[from] gatekeeper_core::CoreError),

    /// The underlying transport failed or timed out.
    #[error(transparent)]
    Transport(#[from] gatekeeper_transport::TransportError),

    /// A reply was expected but the transport returned none (this should
    /// only happen for `SetIP`, which the facade never routes here).
    #[error("no reply received")]
    NoReply,
}

/// Convenience alias for results returned by this crate.
pub type Result<T> = std::result::Result<T, ClientError>;
