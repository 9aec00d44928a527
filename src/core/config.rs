//! Gateway configuration

use std::time::Duration;

use crate::core::types::{GatewayError, Result};

/// Configuration for the gateway's two background loops.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    // === Dispatcher ===
    /// Bind address for the datagram command socket
    pub dispatch_bind_address: String,
    /// Socket read timeout; bounds how long `stop()` waits for the
    /// receive loop to notice the flag
    pub recv_timeout: Duration,
    /// Largest accepted datagram payload
    pub max_datagram_size: usize,

    // === Telemetry ingester ===
    /// Interval between replay reads
    pub poll_interval: Duration,
    /// Registry port the ingester polls
    pub telemetry_port: usize,
    /// Vehicle id telemetry upserts are recorded under
    pub telemetry_vehicle_id: i64,
    /// Status tag applied to telemetry upserts and defaulted position updates
    pub default_status: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            dispatch_bind_address: "0.0.0.0:8081".to_string(),
            recv_timeout: Duration::from_millis(500),
            max_datagram_size: 1024,
            poll_interval: Duration::from_secs(2),
            telemetry_port: 0,
            telemetry_vehicle_id: 1,
            default_status: "unlocked".to_string(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.recv_timeout.is_zero() {
            return Err(GatewayError::Config(
                "recv_timeout must be non-zero (a zero timeout blocks stop() forever)".to_string(),
            ));
        }
        if self.max_datagram_size == 0 {
            return Err(GatewayError::Config(
                "max_datagram_size must be > 0".to_string(),
            ));
        }
        if self.poll_interval.is_zero() {
            return Err(GatewayError::Config(
                "poll_interval must be non-zero".to_string(),
            ));
        }
        if self.default_status.is_empty() {
            return Err(GatewayError::Config(
                "default_status must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
