//! Geospatial fleet entries and their GeoJSON rendering

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Current position and status of one vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleFeature {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
    pub status: String,
    /// Human-readable `%Y-%m-%d %H:%M:%S` timestamp of the last update
    pub timestamp: String,
}

impl VehicleFeature {
    /// Render as a GeoJSON `Feature` with `[lon, lat]` point geometry.
    pub fn to_feature(&self) -> Value {
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [self.lon, self.lat],
            },
            "properties": {
                "id": self.id,
                "status": self.status,
                "timestamp": self.timestamp,
            },
        })
    }
}

/// Render a store snapshot as a GeoJSON `FeatureCollection`. This is the
/// serialization hook handed to the read endpoint.
pub fn feature_collection(features: &[VehicleFeature]) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": features.iter().map(VehicleFeature::to_feature).collect::<Vec<_>>(),
    })
}
