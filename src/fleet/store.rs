//! Fleet feature store: the single shared-mutable structure
//!
//! Written concurrently by the telemetry ingester and the datagram
//! dispatcher. Every operation takes the internal mutex for its whole
//! scan-then-write extent; the raw entry sequence is never exposed, only
//! `upsert`/`set_status`/`snapshot`.

use parking_lot::Mutex;

use crate::fleet::feature::VehicleFeature;

/// Id-keyed collection of current vehicle positions and status.
///
/// Lookup is a linear scan: fleet sizes are a handful of vehicles, so no
/// secondary index is kept. Entry order is insertion order and carries no
/// meaning to consumers.
#[derive(Default)]
pub struct FleetStore {
    entries: Mutex<Vec<VehicleFeature>>,
}

impl FleetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entry for `id` in place, or append a new one.
    pub fn upsert(&self, id: i64, lon: f64, lat: f64, status: &str, timestamp: &str) {
        let feature = VehicleFeature {
            id,
            lon,
            lat,
            status: status.to_string(),
            timestamp: timestamp.to_string(),
        };

        let mut entries = self.entries.lock();
        match entries.iter_mut().find(|entry| entry.id == id) {
            Some(existing) => *existing = feature,
            None => entries.push(feature),
        }
    }

    /// Update status and timestamp of an existing entry. Unknown ids are a
    /// silent no-op: maintenance applies only to vehicles already known
    /// from telemetry or a position update.
    pub fn set_status(&self, id: i64, status: &str, timestamp: &str) {
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.iter_mut().find(|entry| entry.id == id) {
            entry.status = status.to_string();
            entry.timestamp = timestamp.to_string();
        }
    }

    /// Point-in-time copy of the full collection, taken under the same
    /// lock as the writers so no entry is observed half-written.
    pub fn snapshot(&self) -> Vec<VehicleFeature> {
        self.entries.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
