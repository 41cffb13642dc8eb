//! TCP transport (§4.6): an alternative unicast request/reply path with
//! explicit socket timeouts.

use std::io::{Read, Write};
use std::net::{SocketAddrV4, TcpStream};
use std::time::Duration;

use gatekeeper_proto::RawFrame;
use tracing::{debug, trace};

use crate::error::{Result, TransportError};
use crate::timeout;

/// Configuration for the TCP transport.
#[derive(Debug, Clone, Copy)]
pub struct TcpTransport {
    /// Local address the socket binds to, if not INADDR_ANY.
    pub bind: SocketAddrV4,
    /// When set, every transmitted/received frame is logged as a hex dump.
    pub debug: bool,
}

impl TcpTransport {
    /// Connects to `address`, writes `frame`, then reads a single 64-byte
    /// reply — unless `frame` is a `SetIP` request, which never replies.
    /// The socket is closed on every exit path.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Io` on connection or I/O failure, or
    /// `TransportError::Timeout` if the read deadline elapses before a full
    /// reply arrives.
    pub fn send(
        &self,
        frame: &RawFrame,
        address: SocketAddrV4,
        timeout_in: Option<Duration>,
    ) -> Result<Option<RawFrame>> {
        let effective = timeout::normalize(timeout_in);
        let mut stream = if gatekeeper_core::addr::is_unspecified(&self.bind) {
            TcpStream::connect(address)?
        } else {
            connect_from(self.bind, address)?
        };
        stream.set_write_timeout(Some(effective))?;
        stream.set_read_timeout(Some(effective))?;

        debug!(function_code = frame.function_code(), serial = frame.serial(), %address, "sending frame");
        if self.debug {
            trace!("\n{}", gatekeeper_proto::hex_dump(frame));
        }
        stream.write_all(frame.as_bytes())?;

        if frame.function_code() == gatekeeper_proto::opcode::SET_IP {
            return Ok(None);
        }

        let mut bytes = [0u8; 64];
        match stream.read_exact(&mut bytes) {
            Ok(()) => {},
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                return Err(TransportError::Timeout);
            },
            Err(e) => return Err(e.into()),
        }
        let reply = RawFrame::from_array(bytes);
        debug!(function_code = reply.function_code(), serial = reply.serial(), "received frame");
        if self.debug {
            trace!("\n{}", gatekeeper_proto::hex_dump(&reply));
        }
        Ok(Some(reply))
    }
}

fn connect_from(bind: SocketAddrV4, address: SocketAddrV4) -> std::io::Result<TcpStream> {
    use socket2::{Domain, Socket, Type};
    let socket = Socket::new(Domain::IPV4, Type::STREAM, None)?;
    socket.bind(&bind.into())?;
    socket.connect(&address.into())?;
    Ok(socket.into())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::{Ipv4Addr, TcpListener};

    use gatekeeper_proto::opcode;

    use super::*;

    fn transport() -> TcpTransport {
        TcpTransport { bind: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0), debug: false }
    }

    #[test]
    fn send_receives_a_reply() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = match listener.local_addr().unwrap() {
            std::net::SocketAddr::V4(v4) => v4,
            std::net::SocketAddr::V6(_) => unreachable!(),
        };

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut bytes = [0u8; 64];
            stream.read_exact(&mut bytes).unwrap();
            bytes[1] = opcode::GET_CARDS;
            stream.write_all(&bytes).unwrap();
        });

        let frame = gatekeeper_proto::encode::get_cards(1);
        let result = transport().send(&frame, addr, Some(Duration::from_secs(1))).unwrap();
        assert!(result.is_some());
        handle.join().unwrap();
    }

    #[test]
    fn send_returns_none_immediately_for_set_ip() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = match listener.local_addr().unwrap() {
            std::net::SocketAddr::V4(v4) => v4,
            _ => unreachable!(),
        };
        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut bytes = [0u8; 64];
            let _ = stream.read(&mut bytes);
        });

        let frame = gatekeeper_proto::encode::set_ip(
            1,
            Ipv4Addr::new(192, 168, 1, 100),
            Ipv4Addr::new(255, 255, 255, 0),
            Ipv4Addr::new(192, 168, 1, 1),
        );
        let result = transport().send(&frame, addr, Some(Duration::from_millis(200))).unwrap();
        assert_eq!(result, None);
        handle.join().unwrap();
    }

    #[test]
    fn connect_failure_surfaces_as_io_error() {
        let addr = SocketAddrV4::new(Ipv4Addr::new(127, 0, 0, 1), 1); // nothing listens on port 1
        let frame = gatekeeper_proto::encode::get_cards(1);
        let result = transport().send(&frame, addr, Some(Duration::from_millis(200)));
        assert!(result.is_err());
    }

    #[test]
    fn reply_timeout_surfaces_as_timeout_not_io_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = match listener.local_addr().unwrap() {
            std::net::SocketAddr::V4(v4) => v4,
            std::net::SocketAddr::V6(_) => unreachable!(),
        };

        let handle = std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut bytes = [0u8; 64];
            stream.read_exact(&mut bytes).unwrap();
            // accept the request but never reply
            std::thread::sleep(Duration::from_millis(300));
        });

        let frame = gatekeeper_proto::encode::get_cards(1);
        let result = transport().send(&frame, addr, Some(Duration::from_millis(100)));
        assert!(matches!(result, Err(TransportError::Timeout)));
        handle.join().unwrap();
    }
}
