//! End-to-end tests: UDP command round-trips and telemetry replay
//! against a live gateway core.

use std::io::Write;
use std::net::UdpSocket;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use ebike_gateway::{
    DeviceRegistry, DispatchServer, FleetStore, GatewayConfig, GpsSensor, TelemetryIngester,
};

fn test_config() -> GatewayConfig {
    GatewayConfig {
        dispatch_bind_address: "127.0.0.1:0".to_string(),
        recv_timeout: Duration::from_millis(50),
        poll_interval: Duration::from_millis(10),
        ..GatewayConfig::default()
    }
}

/// Send one datagram and wait for its response.
fn exchange(client: &UdpSocket, server_addr: std::net::SocketAddr, payload: &str) -> String {
    client.send_to(payload.as_bytes(), server_addr).unwrap();
    let mut buffer = [0u8; 1024];
    let (length, _) = client.recv_from(&mut buffer).unwrap();
    String::from_utf8_lossy(&buffer[..length]).into_owned()
}

#[test]
fn udp_round_trip_position_then_maintenance() {
    let store = Arc::new(FleetStore::new());
    let mut server = DispatchServer::new(test_config(), Arc::clone(&store));
    server.start().unwrap();
    let server_addr = server.local_addr().unwrap();

    let client = UdpSocket::bind("127.0.0.1:0").unwrap();
    client
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    let response = exchange(
        &client,
        server_addr,
        r#"{"type":"position","id":7,"lat":45.5,"lon":9.2}"#,
    );
    assert_eq!(response, "OK");

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, 7);
    assert_eq!(snapshot[0].lon, 9.2);
    assert_eq!(snapshot[0].lat, 45.5);
    assert_eq!(snapshot[0].status, "unlocked");

    let response = exchange(
        &client,
        server_addr,
        r#"{"type":"maintenance","id":7,"action":"lock"}"#,
    );
    assert_eq!(response, "OK: eBike locked");

    let snapshot = store.snapshot();
    assert_eq!(snapshot[0].status, "locked");
    assert_eq!(snapshot[0].lon, 9.2);
    assert_eq!(snapshot[0].lat, 45.5);

    let response = exchange(
        &client,
        server_addr,
        r#"{"type":"maintenance","id":7,"action":"unlock"}"#,
    );
    assert_eq!(response, "OK: eBike unlocked");

    server.stop();
}

#[test]
fn udp_error_responses() {
    let store = Arc::new(FleetStore::new());
    let mut server = DispatchServer::new(test_config(), Arc::clone(&store));
    server.start().unwrap();
    let server_addr = server.local_addr().unwrap();

    let client = UdpSocket::bind("127.0.0.1:0").unwrap();
    client
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    assert_eq!(
        exchange(&client, server_addr, "this is not json"),
        "ERROR: Invalid message format"
    );
    assert_eq!(
        exchange(&client, server_addr, r#"{"id":7,"lat":45.5,"lon":9.2}"#),
        "ERROR: Invalid message format"
    );
    assert_eq!(
        exchange(&client, server_addr, r#"{"type":"telemetry","id":7}"#),
        "ERROR: Unknown message type"
    );
    assert_eq!(
        exchange(&client, server_addr, r#"{"type":"maintenance","action":"lock"}"#),
        "ERROR: Missing eBike ID"
    );
    assert_eq!(
        exchange(
            &client,
            server_addr,
            r#"{"type":"maintenance","id":7,"action":"pause"}"#
        ),
        "ERROR: Unknown maintenance action"
    );

    // No mutation from any of the rejected messages
    assert!(store.is_empty());

    server.stop();
}

#[test]
fn server_stop_unblocks_within_one_receive_timeout() {
    let store = Arc::new(FleetStore::new());
    let mut server = DispatchServer::new(test_config(), store);
    server.start().unwrap();
    thread::sleep(Duration::from_millis(20));

    let started = Instant::now();
    server.stop();
    // One 50ms receive timeout plus scheduling slack
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "stop took {:?}",
        started.elapsed()
    );
    assert!(!server.is_running());
}

#[test]
fn ingester_replays_rows_and_survives_exhaustion() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "45.50;9.20").unwrap();
    writeln!(file, "45.51;9.21").unwrap();

    let mut registry = DeviceRegistry::new(1);
    registry.initialise(file.path()).unwrap();
    registry.attach_device(0, Box::new(GpsSensor::new())).unwrap();
    let registry = Arc::new(Mutex::new(registry));

    let store = Arc::new(FleetStore::new());
    let mut ingester = TelemetryIngester::new(test_config());
    ingester.start(Arc::clone(&registry), Arc::clone(&store));

    let deadline = Instant::now() + Duration::from_secs(2);
    loop {
        let snapshot = store.snapshot();
        if snapshot.len() == 1 && snapshot[0].lat == 45.51 {
            break;
        }
        assert!(Instant::now() < deadline, "ingester never replayed both rows");
        thread::sleep(Duration::from_millis(5));
    }

    // The source is exhausted by now; the loop keeps running and the
    // state stays at the last reading.
    thread::sleep(Duration::from_millis(50));
    assert!(ingester.is_running());
    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, 1);
    assert_eq!(snapshot[0].lat, 45.51);
    assert_eq!(snapshot[0].lon, 9.21);
    assert_eq!(snapshot[0].status, "unlocked");

    ingester.stop();
    assert!(!ingester.is_running());
}

#[test]
fn ingester_and_dispatcher_share_the_store() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    for i in 0..200 {
        writeln!(file, "45.{:03};9.{:03}", i, i).unwrap();
    }

    let mut registry = DeviceRegistry::new(1);
    registry.initialise(file.path()).unwrap();
    registry.attach_device(0, Box::new(GpsSensor::new())).unwrap();
    let registry = Arc::new(Mutex::new(registry));

    let store = Arc::new(FleetStore::new());
    let config = test_config();

    let mut ingester = TelemetryIngester::new(config.clone());
    ingester.start(registry, Arc::clone(&store));

    let mut server = DispatchServer::new(config, Arc::clone(&store));
    server.start().unwrap();
    let server_addr = server.local_addr().unwrap();

    let client = UdpSocket::bind("127.0.0.1:0").unwrap();
    client
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    // Vehicle 2 arrives over UDP while vehicle 1 streams from telemetry
    for _ in 0..20 {
        let response = exchange(
            &client,
            server_addr,
            r#"{"type":"position","id":2,"lat":46.0,"lon":8.0}"#,
        );
        assert_eq!(response, "OK");
    }

    let deadline = Instant::now() + Duration::from_secs(2);
    while store.len() < 2 {
        assert!(Instant::now() < deadline, "telemetry entry never appeared");
        thread::sleep(Duration::from_millis(5));
    }

    let snapshot = store.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot.iter().any(|e| e.id == 1));
    let pushed = snapshot.iter().find(|e| e.id == 2).unwrap();
    assert_eq!(pushed.lat, 46.0);
    assert_eq!(pushed.lon, 8.0);

    server.stop();
    ingester.stop();
}
