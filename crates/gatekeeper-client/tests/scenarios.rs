//! Facade-level integration tests against real loopback UDP sockets —
//! scenarios 5 and 6 from the protocol's testable-properties list, plus a
//! full encode/dispatch/decode round trip for `GetController`.

use std::net::{Ipv4Addr, UdpSocket};
use std::time::{Duration, Instant};

use gatekeeper_client::{CallOptions, Config, Gatekeeper};
use gatekeeper_proto::opcode;

fn client_on(port: u16) -> Gatekeeper {
    Gatekeeper::new(Config {
        bind: Ipv4Addr::UNSPECIFIED,
        broadcast: format!("127.0.0.1:{port}"),
        listen: "0.0.0.0:0".to_string(),
        debug: false,
    })
    .expect("valid loopback config")
}

#[test]
fn get_controller_round_trips_through_a_real_stub() {
    let responder = UdpSocket::bind("127.0.0.1:0").expect("bind stub socket");
    let port = responder.local_addr().expect("local addr").port();

    let handle = std::thread::spawn(move || {
        let mut buf = [0u8; 64];
        let (_, from) = responder.recv_from(&mut buf).expect("recv request");
        let hex = "17 94 00 00 78 37 2a 18 c0 a8 01 64 ff ff ff 00 c0 a8 01 01 00 12 23 34 45 56 08 92 20 18 11 05";
        let mut reply = [0u8; 64];
        for (i, b) in hex.split(' ').enumerate() {
            reply[i] = u8::from_str_radix(b, 16).expect("valid hex byte");
        }
        responder.send_to(&reply, from).expect("send reply");
    });

    let client = client_on(port);
    let options = CallOptions { timeout: Some(Duration::from_secs(1)), ..Default::default() };
    let info = client.get_controller(405_419_896, &options).expect("get_controller succeeds");

    assert_eq!(info.serial, 405_419_896);
    assert_eq!(info.ip, [192, 168, 1, 100]);
    assert_eq!(info.mask, [255, 255, 255, 0]);
    assert_eq!(info.gateway, [192, 168, 1, 1]);
    assert_eq!(info.version, "v8.92");
    handle.join().expect("stub thread exits cleanly");
}

#[test]
fn broadcast_with_slow_stub_times_out_within_bound_and_returns_empty() {
    let responder = UdpSocket::bind("127.0.0.1:0").expect("bind stub socket");
    let port = responder.local_addr().expect("local addr").port();

    let handle = std::thread::spawn(move || {
        let mut buf = [0u8; 64];
        if let Ok((_, from)) = responder.recv_from(&mut buf) {
            std::thread::sleep(Duration::from_millis(500));
            let mut reply = buf;
            reply[1] = opcode::GET_CONTROLLER;
            let _ = responder.send_to(&reply, from);
        }
    });

    let client = client_on(port);
    let options = CallOptions { timeout: Some(Duration::from_millis(250)), ..Default::default() };

    let started = Instant::now();
    let controllers = client.get_all_controllers(&options).expect("broadcast never errors");
    let elapsed = started.elapsed();

    assert!(controllers.is_empty());
    assert!(elapsed <= Duration::from_millis(350), "elapsed was {elapsed:?}");
    handle.join().expect("stub thread exits cleanly");
}

#[test]
fn set_ip_returns_immediately_with_no_stub_listening() {
    let client = client_on(60_502);
    let options = CallOptions { timeout: Some(Duration::from_secs(5)), ..Default::default() };

    let started = Instant::now();
    client
        .set_ip(
            405_419_896,
            Ipv4Addr::new(192, 168, 1, 100),
            Ipv4Addr::new(255, 255, 255, 0),
            Ipv4Addr::new(192, 168, 1, 1),
            &options,
        )
        .expect("set_ip never waits for a reply");
    let elapsed = started.elapsed();

    assert!(elapsed < Duration::from_millis(200), "elapsed was {elapsed:?}");
}

#[test]
fn zero_serial_is_rejected_for_unicast_operations() {
    let client = client_on(60_503);
    let result = client.get_status(0, &CallOptions::default());
    assert!(matches!(result, Err(gatekeeper_client::ClientError::InvalidArgument(_))));
}

#[test]
fn set_interlock_rejects_unsupported_mode() {
    let client = client_on(60_504);
    let result = client.set_interlock(405_419_896, 9, &CallOptions::default());
    assert!(matches!(result, Err(gatekeeper_client::ClientError::InvalidArgument(_))));
}
