//! Fleet gateway daemon
//!
//! Replays a recorded GPS trip through port 0, accepts position and
//! maintenance commands over UDP, and keeps the live fleet state that a
//! read endpoint serializes via `FleetStore::snapshot()`.
//!
//! Usage:
//!   gateway [replay_csv] [bind_addr]

use std::env;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Context;
use parking_lot::Mutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use ebike_gateway::{
    DeviceRegistry, DispatchServer, FleetStore, GatewayConfig, GpsSensor, TelemetryIngester,
};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let replay_path = args
        .get(1)
        .map(String::as_str)
        .unwrap_or("data/sim-eBike-1.csv");

    let mut config = GatewayConfig::default();
    if let Some(bind_addr) = args.get(2) {
        config.dispatch_bind_address = bind_addr.clone();
    }

    let mut registry = DeviceRegistry::new(1);
    registry
        .initialise(replay_path)
        .with_context(|| format!("failed to bind replay source {}", replay_path))?;
    registry
        .attach_device(config.telemetry_port, Box::new(GpsSensor::new()))
        .context("failed to attach GPS sensor")?;
    info!("Device attached to port {}", config.telemetry_port);

    let registry = Arc::new(Mutex::new(registry));
    let store = Arc::new(FleetStore::new());

    let mut ingester = TelemetryIngester::new(config.clone());
    ingester.start(registry, Arc::clone(&store));

    let mut server = DispatchServer::new(config, Arc::clone(&store));
    server.start().context("failed to start dispatch server")?;

    // The read endpoint polls `store.snapshot()` / `feature_collection()`
    // over its own transport; the gateway itself just keeps running.
    loop {
        thread::sleep(Duration::from_secs(10));
        info!("Fleet holds {} vehicle(s)", store.len());
    }
}
