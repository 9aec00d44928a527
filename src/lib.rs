//! eBike Fleet Gateway
//!
//! Simulates a small fleet of shared eBikes. Recorded GPS trips are
//! replayed through a fixed table of device ports, a recurring ingester
//! turns the readings into live fleet state, and a UDP dispatcher lets
//! remote clients push position and maintenance updates into the same
//! state. A read endpoint consumes point-in-time snapshots rendered as
//! GeoJSON.
//!
//! # Architecture
//!
//! - **`core/`**: Error taxonomy and configuration
//! - **`hal/`**: Sensor capabilities and the device registry (replay cursors)
//! - **`fleet/`**: The shared fleet feature store and GeoJSON rendering
//! - **`ingest/`**: Recurring telemetry polling loop
//! - **`dispatch/`**: Datagram command decode, routing and receive loop
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use parking_lot::Mutex;
//! use ebike_gateway::{DeviceRegistry, DispatchServer, FleetStore, GatewayConfig, GpsSensor, TelemetryIngester};
//!
//! # fn main() -> ebike_gateway::Result<()> {
//! let config = GatewayConfig::default();
//!
//! let mut registry = DeviceRegistry::new(1);
//! registry.initialise("data/sim-eBike-1.csv")?;
//! registry.attach_device(0, Box::new(GpsSensor::new()))?;
//! let registry = Arc::new(Mutex::new(registry));
//!
//! let store = Arc::new(FleetStore::new());
//!
//! let mut ingester = TelemetryIngester::new(config.clone());
//! ingester.start(registry, Arc::clone(&store));
//!
//! let mut server = DispatchServer::new(config, Arc::clone(&store));
//! server.start()?;
//!
//! // ... serve snapshots ...
//! let snapshot = store.snapshot();
//!
//! server.stop();
//! ingester.stop();
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod dispatch;
pub mod fleet;
pub mod hal;
pub mod ingest;

// Re-export commonly used types
pub use crate::core::{GatewayConfig, GatewayError, Result};
pub use crate::dispatch::{Command, CommandError, DispatchServer, MessageHandler};
pub use crate::fleet::{feature_collection, FleetStore, VehicleFeature};
pub use crate::hal::{DeviceRegistry, GpsSensor, PositioningSensor, Sensor};
pub use crate::ingest::TelemetryIngester;
