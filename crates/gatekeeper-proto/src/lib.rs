//! Wire codec for the fixed 64-byte access-control controller protocol.
//!
//! This crate owns the frame layout, the BCD/numeric field helpers, the
//! per-operation encoders and decoders, and the typed record model. It has
//! no I/O of its own — `gatekeeper-transport` moves the bytes, this crate
//! gives them meaning.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod bcd;
pub mod decode;
pub mod encode;
pub mod error;
pub mod frame;
pub mod opcode;
pub mod records;

pub use error::{ProtocolError, Result};
pub use frame::{hex_dump, RawFrame, MAGIC, SOM, SOM_V6_62_EVENT};
