//! Facade construction and per-call configuration (§6.2).

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

use gatekeeper_core::Protocol;

/// Construction options for [`crate::Gatekeeper`], held immutably after
/// construction.
#[derive(Debug, Clone)]
pub struct Config {
    /// Local IPv4 request sockets bind to.
    pub bind: Ipv4Addr,
    /// Endpoint broadcast sends target, `host:port`.
    pub broadcast: String,
    /// Endpoint the event listener binds to, `host:port`.
    pub listen: String,
    /// When true, every transmitted/received frame is logged as a hex
    /// dump at `trace` level.
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: Ipv4Addr::UNSPECIFIED,
            broadcast: "255.255.255.255:60000".to_string(),
            listen: "0.0.0.0:60001".to_string(),
            debug: false,
        }
    }
}

/// Per-call options; all fields default to the values described in §6.2.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    /// Overrides the default 2.5 s timeout (clamped to `[0.05, 30]` s).
    pub timeout: Option<Duration>,
    /// Explicit controller endpoint, overriding the configured broadcast
    /// default.
    pub destination: Option<String>,
    /// Which transport to use for this call.
    pub protocol: Protocol,
}

pub(crate) fn bind_addr(bind: Ipv4Addr) -> SocketAddrV4 {
    SocketAddrV4::new(bind, 0)
}
