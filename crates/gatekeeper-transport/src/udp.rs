//! UDP transport (§4.5): broadcast discovery, unicast request/reply, and the
//! bound-socket listen loop used for the event channel.

use std::net::{SocketAddrV4, UdpSocket};
use std::time::Duration;

use gatekeeper_proto::RawFrame;
use tracing::{debug, trace, warn};

use crate::error::{Result, TransportError};
use crate::timeout;

/// Configuration for the UDP transport, held immutably by the facade after
/// construction (§5 shared resource policy).
#[derive(Debug, Clone, Copy)]
pub struct UdpTransport {
    /// Local address request sockets bind to.
    pub bind: SocketAddrV4,
    /// Endpoint broadcast sends target.
    pub broadcast_endpoint: SocketAddrV4,
    /// Endpoint the listener binds to.
    pub listen_endpoint: SocketAddrV4,
    /// When set, every transmitted/received frame is logged as a hex dump.
    pub debug: bool,
}

impl UdpTransport {
    fn open_call_socket(&self) -> Result<UdpSocket> {
        let socket = UdpSocket::bind(SocketAddrV4::new(*self.bind.ip(), 0))?;
        socket.set_broadcast(true)?;
        Ok(socket)
    }

    fn log_send(&self, frame: &RawFrame, to: SocketAddrV4) {
        debug!(function_code = frame.function_code(), serial = frame.serial(), %to, "sending frame");
        if self.debug {
            trace!("\n{}", gatekeeper_proto::hex_dump(frame));
        }
    }

    fn log_recv(&self, frame: &RawFrame, from: SocketAddrV4) {
        debug!(function_code = frame.function_code(), serial = frame.serial(), %from, "received frame");
        if self.debug {
            trace!("\n{}", gatekeeper_proto::hex_dump(frame));
        }
    }

    /// Broadcasts `frame` and accumulates every 64-byte datagram received
    /// within `timeout`. An empty result is not an error.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Io` if the socket cannot be opened or
    /// configured.
    pub fn broadcast(&self, frame: &RawFrame, timeout: Option<Duration>) -> Result<Vec<RawFrame>> {
        let socket = self.open_call_socket()?;
        self.log_send(frame, self.broadcast_endpoint);
        socket.send_to(frame.as_bytes(), self.broadcast_endpoint)?;

        let effective = timeout::normalize(timeout);
        socket.set_read_timeout(Some(effective))?;

        let mut replies = Vec::new();
        let mut buf = [0u8; 256];
        loop {
            match socket.recv_from(&mut buf) {
                Ok((len, from)) if len == RawFrame::SIZE => {
                    let mut bytes = [0u8; 64];
                    bytes.copy_from_slice(&buf[..64]);
                    let reply = RawFrame::from_array(bytes);
                    if let std::net::SocketAddr::V4(from) = from {
                        self.log_recv(&reply, from);
                    }
                    replies.push(reply);
                },
                Ok(_) => {}, // wrong-length datagram, ignored
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    break;
                },
                Err(e) => return Err(e.into()),
            }
        }
        Ok(replies)
    }

    /// Sends `frame` to `address` (or the broadcast endpoint if `address` is
    /// `None`) and awaits a single reply, unless the frame is a `SetIP`
    /// request, which never replies.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Timeout` if no reply arrives within the
    /// bounded timeout, or `TransportError::Io` on socket failure.
    pub fn send(
        &self,
        frame: &RawFrame,
        address: Option<SocketAddrV4>,
        timeout: Option<Duration>,
    ) -> Result<Option<RawFrame>> {
        let socket = self.open_call_socket()?;
        let destination = address.unwrap_or(self.broadcast_endpoint);
        self.log_send(frame, destination);
        socket.send_to(frame.as_bytes(), destination)?;

        if frame.function_code() == gatekeeper_proto::opcode::SET_IP {
            return Ok(None);
        }

        let effective = timeout::normalize(timeout);
        socket.set_read_timeout(Some(effective))?;

        let mut buf = [0u8; 256];
        match socket.recv_from(&mut buf) {
            Ok((len, from)) if len == RawFrame::SIZE => {
                let mut bytes = [0u8; 64];
                bytes.copy_from_slice(&buf[..64]);
                let reply = RawFrame::from_array(bytes);
                if let std::net::SocketAddr::V4(from) = from {
                    self.log_recv(&reply, from);
                }
                Ok(Some(reply))
            },
            Ok(_) => Err(TransportError::Timeout),
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                warn!(%destination, "unicast send timed out");
                Err(TransportError::Timeout)
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Binds a socket to the configured listen endpoint with no receive
    /// timeout, ready for [`listen_loop`].
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Io` if the bind fails.
    pub fn bind_listener(&self) -> Result<UdpSocket> {
        let socket = UdpSocket::bind(self.listen_endpoint)?;
        socket.set_read_timeout(None)?;
        Ok(socket)
    }
}

/// Runs the event listener loop against an already-bound socket (see
/// [`UdpTransport::bind_listener`]). Invokes `consumer` for every 64-byte
/// datagram received; other datagrams are ignored. Returns once the socket
/// is closed, the consumer returns [`ControlFlow::Break`], or recv errors
/// out from under the loop (§5 cancellation policy).
pub fn listen_loop(
    socket: &UdpSocket,
    debug: bool,
    mut consumer: impl FnMut(RawFrame) -> std::ops::ControlFlow<()>,
) {
    let mut buf = [0u8; 256];
    loop {
        match socket.recv_from(&mut buf) {
            Ok((len, from)) if len == RawFrame::SIZE => {
                let mut bytes = [0u8; 64];
                bytes.copy_from_slice(&buf[..64]);
                let frame = RawFrame::from_array(bytes);
                debug!(function_code = frame.function_code(), serial = frame.serial(), ?from, "event received");
                if debug {
                    trace!("\n{}", gatekeeper_proto::hex_dump(&frame));
                }
                if consumer(frame).is_break() {
                    break;
                }
            },
            Ok(_) => {},
            Err(e) => {
                debug!(error = %e, "listener socket closed, stopping loop");
                break;
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use gatekeeper_proto::opcode;

    use super::*;

    fn transport_on(port: u16) -> UdpTransport {
        UdpTransport {
            bind: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
            broadcast_endpoint: SocketAddrV4::new(Ipv4Addr::LOCALHOST, port),
            listen_endpoint: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
            debug: false,
        }
    }

    #[test]
    fn send_times_out_with_nothing_listening() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = socket.local_addr().unwrap().port();
        drop(socket); // free the port but ensure nobody replies

        let transport = transport_on(port);
        let frame = gatekeeper_proto::encode::get_controller(1);
        let result = transport.send(&frame, None, Some(Duration::from_millis(100)));
        assert!(matches!(result, Err(TransportError::Timeout)));
    }

    #[test]
    fn send_returns_none_immediately_for_set_ip() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = socket.local_addr().unwrap().port();

        let transport = transport_on(port);
        let frame = gatekeeper_proto::encode::set_ip(
            1,
            Ipv4Addr::new(192, 168, 1, 100),
            Ipv4Addr::new(255, 255, 255, 0),
            Ipv4Addr::new(192, 168, 1, 1),
        );
        assert_eq!(frame.function_code(), opcode::SET_IP);
        let result = transport.send(&frame, None, Some(Duration::from_millis(50))).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn send_receives_a_reply() {
        let responder = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = responder.local_addr().unwrap().port();

        let transport = transport_on(port);
        let frame = gatekeeper_proto::encode::get_cards(1);

        let handle = std::thread::spawn(move || {
            let mut buf = [0u8; 64];
            let (_, from) = responder.recv_from(&mut buf).unwrap();
            let mut reply = buf;
            reply[1] = opcode::GET_CARDS;
            responder.send_to(&reply, from).unwrap();
        });

        let result = transport.send(&frame, None, Some(Duration::from_secs(1))).unwrap();
        assert!(result.is_some());
        handle.join().unwrap();
    }

    #[test]
    fn broadcast_returns_empty_list_on_timeout() {
        let transport = transport_on(60555);
        let frame = gatekeeper_proto::encode::get_controller(0);
        let replies = transport.broadcast(&frame, Some(Duration::from_millis(100))).unwrap();
        assert!(replies.is_empty());
    }

    #[test]
    fn listen_loop_invokes_consumer_for_64_byte_datagrams_only() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = socket.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();

        sender.send_to(&[0u8; 10], addr).unwrap(); // ignored: wrong length
        let mut frame_bytes = [0u8; 64];
        frame_bytes[0] = 0x17;
        frame_bytes[1] = opcode::GET_STATUS;
        sender.send_to(&frame_bytes, addr).unwrap();

        socket.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
        let mut seen = Vec::new();
        listen_loop(&socket, false, |frame| {
            seen.push(frame);
            std::ops::ControlFlow::Continue(())
        });
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].function_code(), opcode::GET_STATUS);
    }

    #[test]
    fn listen_loop_stops_when_consumer_signals_break() {
        let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let addr = socket.local_addr().unwrap();
        let sender = UdpSocket::bind("127.0.0.1:0").unwrap();
        for _ in 0..3 {
            sender.send_to(&[0u8; 64], addr).unwrap();
        }

        socket.set_read_timeout(Some(Duration::from_millis(500))).unwrap();
        let mut count = 0;
        listen_loop(&socket, false, |_frame| {
            count += 1;
            std::ops::ControlFlow::Break(())
        });
        assert_eq!(count, 1);
    }
}
