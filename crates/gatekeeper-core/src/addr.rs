//! Address resolver (§4.7): parses `host[:port]` strings into socket
//! addresses. Hosts are expected to be dotted-quad IPv4 literals; DNS
//! resolution is not part of the core contract.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Default port for unicast/broadcast destinations.
pub const DEFAULT_DESTINATION_PORT: u16 = 60000;

/// Default port for the event listener endpoint.
pub const DEFAULT_LISTENER_PORT: u16 = 60001;

/// Resolves `spec` (`"host"` or `"host:port"`) to a socket address, applying
/// `default_port` when `spec` omits a port.
///
/// # Errors
///
/// Returns `CoreError::InvalidAddress` if the host is not a dotted-quad IPv4
/// literal, or if a supplied port does not parse as `u16`.
pub fn resolve(spec: &str, default_port: u16) -> Result<SocketAddrV4> {
    let (host, port) = match spec.rsplit_once(':') {
        Some((host, port)) => {
            let port = port.parse::<u16>().map_err(|_| {
                CoreError::InvalidAddress(spec.to_string(), "port is not a valid u16")
            })?;
            (host, port)
        },
        None => (spec, default_port),
    };
    let ip = Ipv4Addr::from_str(host)
        .map_err(|_| CoreError::InvalidAddress(spec.to_string(), "host is not a dotted-quad IPv4 literal"))?;
    Ok(SocketAddrV4::new(ip, port))
}

/// Resolves a destination address, defaulting to port 60000.
///
/// # Errors
///
/// See [`resolve`].
pub fn resolve_destination(spec: &str) -> Result<SocketAddrV4> {
    resolve(spec, DEFAULT_DESTINATION_PORT)
}

/// Resolves a listener address, defaulting to port 60001.
///
/// # Errors
///
/// See [`resolve`].
pub fn resolve_listener(spec: &str) -> Result<SocketAddrV4> {
    resolve(spec, DEFAULT_LISTENER_PORT)
}

/// True if `addr` is `0.0.0.0` regardless of port (INADDR_ANY).
#[must_use]
pub fn is_unspecified(addr: &SocketAddrV4) -> bool {
    addr.ip().is_unspecified()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn resolves_host_and_port() {
        let addr = resolve("192.168.1.1:60005", DEFAULT_DESTINATION_PORT).unwrap();
        assert_eq!(addr, SocketAddrV4::new(Ipv4Addr::new(192, 168, 1, 1), 60005));
    }

    #[test]
    fn missing_port_uses_default() {
        let addr = resolve_destination("192.168.1.1").unwrap();
        assert_eq!(addr.port(), DEFAULT_DESTINATION_PORT);

        let addr = resolve_listener("0.0.0.0").unwrap();
        assert_eq!(addr.port(), DEFAULT_LISTENER_PORT);
    }

    #[test]
    fn rejects_non_numeric_host() {
        assert!(resolve_destination("controller.local").is_err());
    }

    #[test]
    fn rejects_bad_port() {
        assert!(resolve("192.168.1.1:notaport", DEFAULT_DESTINATION_PORT).is_err());
    }

    #[test]
    fn detects_inaddr_any() {
        let addr = resolve_destination("0.0.0.0").unwrap();
        assert!(is_unspecified(&addr));
        let addr = resolve_destination("192.168.1.1").unwrap();
        assert!(!is_unspecified(&addr));
    }
}
