//! Shared address resolution, controller descriptor normalization, and the
//! error type they raise. Used by `gatekeeper-transport` and
//! `gatekeeper-client`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod addr;
pub mod descriptor;
pub mod error;

pub use descriptor::{ControllerDescriptor, Protocol};
pub use error::{CoreError, Result};
