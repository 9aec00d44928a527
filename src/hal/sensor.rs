//! Sensor capability traits and the simulated GPS implementation
//!
//! Sensors are polymorphic units attached to registry ports. The base
//! `Sensor` trait covers identity, output dimensionality and raw-byte
//! formatting; positioning sensors additionally carry a two-phase
//! connect/read/disconnect protocol over a held current value.

use chrono::Local;

/// Separator between fields inside one raw replay row
pub const RAW_FIELD_SEPARATOR: char = ';';

/// Separator accepted by [`PositioningSensor::connect`]
pub const READING_SEPARATOR: char = ',';

fn current_timestamp() -> String {
    Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Base capability implemented by every attachable sensor.
pub trait Sensor: Send {
    /// Stable identity of the sensor type.
    fn id(&self) -> i32;

    /// Declared output dimensionality (>= 1).
    fn dimension(&self) -> usize;

    /// Render one raw reading as a human-readable line. Pure transform,
    /// no error path: input without a separator passes through unmodified
    /// after the timestamp/tag prefix.
    fn format(&self, raw: &[u8]) -> String;
}

/// Positioning sensors hold one ingested reading at a time.
pub trait PositioningSensor: Sensor {
    /// Ingest one raw record. Returns false (leaving the held value
    /// unchanged) when the record carries no field separator.
    fn connect(&mut self, raw: &str) -> bool;

    /// Current held value; empty until the first successful `connect`.
    fn read(&self) -> String;

    /// Clear the held value. Idempotent; the sensor stays attachable.
    fn disconnect(&mut self);
}

/// Simulated GPS sensor replaying recorded coordinate pairs.
pub struct GpsSensor {
    current_reading: String,
}

impl GpsSensor {
    pub fn new() -> Self {
        Self {
            current_reading: String::new(),
        }
    }
}

impl Default for GpsSensor {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for GpsSensor {
    fn id(&self) -> i32 {
        // Fixed sentinel rather than a per-instance id: it indexes the
        // GPS output column in the recorded replay data.
        0
    }

    fn dimension(&self) -> usize {
        2 // latitude and longitude
    }

    fn format(&self, raw: &[u8]) -> String {
        let mut reading = String::from_utf8_lossy(raw).into_owned();
        if let Some(pos) = reading.find(RAW_FIELD_SEPARATOR) {
            reading.replace_range(pos..pos + 1, "; ");
        }
        format!("{} GPS: {}", current_timestamp(), reading)
    }
}

impl PositioningSensor for GpsSensor {
    fn connect(&mut self, raw: &str) -> bool {
        match raw.split_once(READING_SEPARATOR) {
            Some((lat, lon)) => {
                self.current_reading = format!("{} GPS: {}; {}", current_timestamp(), lat, lon);
                true
            }
            None => false,
        }
    }

    fn read(&self) -> String {
        self.current_reading.clone()
    }

    fn disconnect(&mut self) {
        self.current_reading.clear();
    }
}
