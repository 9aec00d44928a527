//! Core types used across all gateway modules

use thiserror::Error;

/// Errors that can occur in gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Port index out of bounds, unattached, or source not yet initialised
    #[error("Device range error: {0}")]
    DeviceRange(String),
    /// Attach attempted on a port that already holds a sensor
    #[error("Port {0} is already occupied")]
    PortOccupied(usize),
    /// Replay source fully consumed. Expected end-of-data, not a failure.
    #[error("Replay source exhausted")]
    Exhausted,
    /// Replay source cannot be opened or is structurally invalid
    #[error("Source error: {0}")]
    Source(String),
    /// Socket-level failure (bind/recv). Fatal to the dispatcher instance.
    #[error("Transport error: {0}")]
    Transport(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// True for the distinguished end-of-replay condition.
    ///
    /// Callers polling a replay source must branch on this rather than
    /// treating exhaustion like an unexpected device failure.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, GatewayError::Exhausted)
    }
}

/// Result type for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
