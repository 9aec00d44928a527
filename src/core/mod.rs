//! Core types and configuration shared across all gateway modules

pub mod config;
pub mod types;

pub use config::GatewayConfig;
pub use types::{GatewayError, Result};
