//! Host-side client for the access-control controller protocol: a facade
//! over `gatekeeper-proto`'s codec and `gatekeeper-transport`'s UDP/TCP
//! transports.
//!
//! ```no_run
//! use gatekeeper_client::{CallOptions, Config, Gatekeeper};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Gatekeeper::new(Config::default())?;
//! let controllers = client.get_all_controllers(&CallOptions::default())?;
//! for info in controllers {
//!     println!("{}", info.serial);
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod facade;

pub use config::{CallOptions, Config};
pub use error::{ClientError, Result};
pub use facade::{Gatekeeper, ListenerHandle};

pub use gatekeeper_core::{ControllerDescriptor, Protocol};
pub use gatekeeper_proto::records;
