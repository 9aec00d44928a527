//! Per-datagram command routing against the fleet store

use std::net::SocketAddr;
use std::sync::Arc;

use chrono::Local;
use tracing::{info, warn};

use crate::dispatch::command::{self, Command};
use crate::fleet::store::FleetStore;

fn current_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Routes decoded commands to the fleet store and produces the textual
/// response sent back to the originating address. Every datagram yields
/// exactly one response and one log line.
pub struct MessageHandler {
    store: Arc<FleetStore>,
}

impl MessageHandler {
    pub fn new(store: Arc<FleetStore>) -> Self {
        Self { store }
    }

    pub fn handle(&self, payload: &[u8], peer: SocketAddr) -> String {
        info!(
            "[DISPATCH] Handling message from {} - {}",
            peer,
            String::from_utf8_lossy(payload)
        );

        let command = match command::decode(payload) {
            Ok(command) => command,
            Err(err) => {
                warn!("[DISPATCH] Rejected datagram from {}: {:?}", peer, err);
                return err.wire_response().to_string();
            }
        };

        match command {
            Command::Position {
                id,
                lat,
                lon,
                status,
            } => {
                self.store.upsert(id, lon, lat, &status, &current_timestamp());
                info!(
                    "[DISPATCH] Updated eBike {} at {}, {} with status {}",
                    id, lat, lon, status
                );
                "OK".to_string()
            }
            Command::Maintenance { id, action } => match action.as_str() {
                "lock" => {
                    self.store.set_status(id, "locked", &current_timestamp());
                    info!("[DISPATCH] eBike {} locked", id);
                    "OK: eBike locked".to_string()
                }
                "unlock" => {
                    self.store.set_status(id, "unlocked", &current_timestamp());
                    info!("[DISPATCH] eBike {} unlocked", id);
                    "OK: eBike unlocked".to_string()
                }
                other => {
                    warn!(
                        "[DISPATCH] Unknown maintenance action {:?} for eBike {}",
                        other, id
                    );
                    "ERROR: Unknown maintenance action".to_string()
                }
            },
        }
    }
}
