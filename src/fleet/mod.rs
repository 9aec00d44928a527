//! Shared fleet state and its geospatial representation

pub mod feature;
pub mod store;

pub use feature::{feature_collection, VehicleFeature};
pub use store::FleetStore;
