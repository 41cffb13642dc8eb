//! Controller descriptor (§3.2): the (serial, address, protocol) triple
//! every facade call normalizes its argument to.

/// Transport protocol a call should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Send over UDP (the default).
    #[default]
    Udp,
    /// Send over TCP; requires an explicit address.
    Tcp,
}

/// A normalized controller reference: which controller, where to reach it,
/// and over which protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerDescriptor {
    /// Controller serial number; 0 is reserved for the broadcast/discovery
    /// form.
    pub serial: u32,
    /// Explicit `host:port` destination; `None` means "use the configured
    /// broadcast endpoint".
    pub address: Option<String>,
    /// Which transport to use.
    pub protocol: Protocol,
}

impl ControllerDescriptor {
    /// Builds a descriptor for a bare serial: no explicit address, UDP.
    #[must_use]
    pub fn new(serial: u32) -> Self {
        Self { serial, address: None, protocol: Protocol::Udp }
    }

    /// Builds a fully specified descriptor.
    #[must_use]
    pub fn with_address(serial: u32, address: impl Into<String>, protocol: Protocol) -> Self {
        Self { serial, address: Some(address.into()), protocol }
    }

    /// The broadcast/discovery form: serial 0, no address, UDP.
    #[must_use]
    pub fn broadcast() -> Self {
        Self::new(0)
    }
}

impl From<u32> for ControllerDescriptor {
    fn from(serial: u32) -> Self {
        Self::new(serial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_serial_normalizes_to_udp_with_no_address() {
        let descriptor: ControllerDescriptor = 405_419_896.into();
        assert_eq!(descriptor.serial, 405_419_896);
        assert_eq!(descriptor.address, None);
        assert_eq!(descriptor.protocol, Protocol::Udp);
    }

    #[test]
    fn with_address_carries_protocol_and_endpoint() {
        let descriptor =
            ControllerDescriptor::with_address(1, "192.168.1.50:60000", Protocol::Tcp);
        assert_eq!(descriptor.address.as_deref(), Some("192.168.1.50:60000"));
        assert_eq!(descriptor.protocol, Protocol::Tcp);
    }
}
