//! Telemetry ingester - recurring replay of recorded readings into the fleet store

use std::sync::Arc;
use std::thread;

use chrono::Local;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::core::config::GatewayConfig;
use crate::fleet::store::FleetStore;
use crate::hal::registry::DeviceRegistry;
use crate::hal::sensor::RAW_FIELD_SEPARATOR;

/// Recurring background task polling one registry port and upserting the
/// decoded reading into the fleet store. A failed or missing reading
/// (including replay exhaustion) skips the cycle; the loop runs until
/// `stop()`.
pub struct TelemetryIngester {
    config: GatewayConfig,
    running: Arc<RwLock<bool>>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl TelemetryIngester {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            running: Arc::new(RwLock::new(false)),
            thread_handle: None,
        }
    }

    /// Start the polling loop. No-op with a log notice when running.
    pub fn start(&mut self, registry: Arc<Mutex<DeviceRegistry>>, store: Arc<FleetStore>) {
        if *self.running.read() {
            info!("[INGEST] Ingester is already running");
            return;
        }

        *self.running.write() = true;
        let running = Arc::clone(&self.running);
        let port = self.config.telemetry_port;
        let vehicle_id = self.config.telemetry_vehicle_id;
        let status = self.config.default_status.clone();
        let poll_interval = self.config.poll_interval;

        let handle = thread::spawn(move || {
            info!(
                "[INGEST] Polling port {} every {:?} as vehicle {}",
                port, poll_interval, vehicle_id
            );

            while *running.read() {
                Self::tick(&registry, &store, port, vehicle_id, &status);
                thread::sleep(poll_interval);
            }

            info!("[INGEST] Polling loop exited");
        });

        self.thread_handle = Some(handle);
    }

    /// One polling cycle: read, decode, upsert. Any registry or parse
    /// failure logs and leaves the store untouched.
    fn tick(
        registry: &Mutex<DeviceRegistry>,
        store: &FleetStore,
        port: usize,
        vehicle_id: i64,
        status: &str,
    ) {
        let (raw, formatted) = {
            let mut registry = registry.lock();
            let raw = match registry.read(port) {
                Ok(raw) => raw,
                Err(err) if err.is_exhausted() => {
                    debug!("[INGEST] Replay exhausted, nothing to do this cycle");
                    return;
                }
                Err(err) => {
                    warn!("[INGEST] Device read failed: {}", err);
                    return;
                }
            };
            let formatted = registry.format(port, &raw).unwrap_or_default();
            (raw, formatted)
        };

        let text = String::from_utf8_lossy(&raw);
        let Some((lat_text, lon_text)) = text.split_once(RAW_FIELD_SEPARATOR) else {
            warn!("[INGEST] Malformed reading (no field separator): {}", text);
            return;
        };

        let (Ok(lat), Ok(lon)) = (
            lat_text.trim().parse::<f64>(),
            lon_text.trim().parse::<f64>(),
        ) else {
            warn!("[INGEST] Non-numeric coordinates in reading: {}", text);
            return;
        };

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        store.upsert(vehicle_id, lon, lat, status, &timestamp);
        info!("[INGEST] {}", formatted);
    }

    /// Stop the polling loop and join the thread. No-op when stopped.
    pub fn stop(&mut self) {
        if !*self.running.read() {
            return;
        }

        *self.running.write() = false;
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
        info!("[INGEST] Ingester stopped");
    }

    pub fn is_running(&self) -> bool {
        *self.running.read()
    }
}

impl Drop for TelemetryIngester {
    fn drop(&mut self) {
        self.stop();
    }
}
