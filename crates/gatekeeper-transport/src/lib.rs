//! Blocking UDP and TCP transports for the controller wire protocol.
//!
//! Request/response calls open a fresh socket per call and close it on
//! every exit path (§5); the event listener is a separate bound socket
//! driven by [`udp::listen_loop`] that the caller runs on its own thread.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod error;
pub mod tcp;
pub mod timeout;
pub mod udp;

pub use error::{Result, TransportError};
pub use tcp::TcpTransport;
pub use udp::UdpTransport;
