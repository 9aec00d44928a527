//! Device registry: a fixed table of numbered ports hosting sensors
//!
//! Each port holds at most one attached sensor plus a replay cursor into
//! the bound recorded-data source. Replay is strictly sequential per
//! port; there is no rewind. A consumer that wants data past exhaustion
//! must re-initialise the source.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::core::types::{GatewayError, Result};
use crate::hal::sensor::PositioningSensor;

struct Port {
    sensor: Option<Box<dyn PositioningSensor>>,
    cursor: usize,
}

/// Fixed-capacity device table with per-port replay cursors.
pub struct DeviceRegistry {
    ports: Vec<Port>,
    rows: Option<Vec<String>>,
}

impl DeviceRegistry {
    /// Create a registry with `port_count` vacant ports and no bound source.
    pub fn new(port_count: usize) -> Self {
        let ports = (0..port_count)
            .map(|_| Port {
                sensor: None,
                cursor: 0,
            })
            .collect();
        Self { ports, rows: None }
    }

    /// Bind the replay source for all ports. One trimmed non-empty line
    /// per row. Re-initialising resets every port's cursor.
    pub fn initialise<P: AsRef<Path>>(&mut self, source: P) -> Result<()> {
        let path = source.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| GatewayError::Source(format!("{}: {}", path.display(), e)))?;

        let rows: Vec<String> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();

        if rows.is_empty() {
            return Err(GatewayError::Source(format!(
                "{}: replay source holds no rows",
                path.display()
            )));
        }

        info!(
            "[HAL] Replay source bound: {} ({} rows)",
            path.display(),
            rows.len()
        );

        self.rows = Some(rows);
        for port in &mut self.ports {
            port.cursor = 0;
        }
        Ok(())
    }

    /// Attach a sensor to a vacant port, resetting its replay cursor.
    pub fn attach_device(&mut self, port: usize, sensor: Box<dyn PositioningSensor>) -> Result<()> {
        let slot = self
            .ports
            .get_mut(port)
            .ok_or_else(|| GatewayError::DeviceRange(format!("port {} out of range", port)))?;

        if slot.sensor.is_some() {
            return Err(GatewayError::PortOccupied(port));
        }

        info!(
            "[HAL] Sensor attached to port {} (dimension {})",
            port,
            sensor.dimension()
        );
        slot.sensor = Some(sensor);
        slot.cursor = 0;
        Ok(())
    }

    /// Detach the sensor from a port. Subsequent reads on the port fail
    /// until a sensor is re-attached.
    pub fn release_device(&mut self, port: usize) -> Result<Box<dyn PositioningSensor>> {
        let slot = self
            .ports
            .get_mut(port)
            .ok_or_else(|| GatewayError::DeviceRange(format!("port {} out of range", port)))?;

        let sensor = slot
            .sensor
            .take()
            .ok_or_else(|| GatewayError::DeviceRange(format!("port {} has no sensor", port)))?;

        info!("[HAL] Sensor released from port {}", port);
        Ok(sensor)
    }

    /// Read the next raw row for a port and advance its cursor.
    ///
    /// Returns [`GatewayError::Exhausted`] once the cursor passes the last
    /// row; callers treat that as end-of-stream, not as a failure.
    pub fn read(&mut self, port: usize) -> Result<Vec<u8>> {
        let rows = self
            .rows
            .as_ref()
            .ok_or_else(|| GatewayError::DeviceRange("replay source not initialised".to_string()))?;

        let slot = self
            .ports
            .get_mut(port)
            .ok_or_else(|| GatewayError::DeviceRange(format!("port {} out of range", port)))?;

        if slot.sensor.is_none() {
            return Err(GatewayError::DeviceRange(format!(
                "port {} has no sensor",
                port
            )));
        }

        let row = rows.get(slot.cursor).ok_or(GatewayError::Exhausted)?;
        slot.cursor += 1;
        Ok(row.clone().into_bytes())
    }

    /// Render a raw reading through the sensor attached at `port`.
    pub fn format(&self, port: usize, raw: &[u8]) -> Result<String> {
        let slot = self
            .ports
            .get(port)
            .ok_or_else(|| GatewayError::DeviceRange(format!("port {} out of range", port)))?;

        let sensor = slot
            .sensor
            .as_ref()
            .ok_or_else(|| GatewayError::DeviceRange(format!("port {} has no sensor", port)))?;

        Ok(sensor.format(raw))
    }

    pub fn port_count(&self) -> usize {
        self.ports.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::sensor::GpsSensor;
    use std::io::Write;

    fn registry_with_rows(rows: &[&str]) -> DeviceRegistry {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for row in rows {
            writeln!(file, "{}", row).unwrap();
        }
        let mut registry = DeviceRegistry::new(2);
        registry.initialise(file.path()).unwrap();
        registry
    }

    #[test]
    fn read_replays_rows_in_order_then_exhausts() {
        let mut registry = registry_with_rows(&["45.1;9.0", "45.2;9.1"]);
        registry.attach_device(0, Box::new(GpsSensor::new())).unwrap();

        assert_eq!(registry.read(0).unwrap(), b"45.1;9.0".to_vec());
        assert_eq!(registry.read(0).unwrap(), b"45.2;9.1".to_vec());

        // Every read past the end reports exhaustion, never data and
        // never a different error kind.
        for _ in 0..3 {
            let err = registry.read(0).unwrap_err();
            assert!(err.is_exhausted(), "expected exhaustion, got {:?}", err);
        }
    }

    #[test]
    fn attach_on_occupied_port_fails_without_disturbing_attachment() {
        let mut registry = registry_with_rows(&["45.1;9.0"]);
        registry.attach_device(0, Box::new(GpsSensor::new())).unwrap();

        let err = registry.attach_device(0, Box::new(GpsSensor::new())).unwrap_err();
        assert!(matches!(err, GatewayError::PortOccupied(0)));

        // Existing attachment still serves reads
        assert!(registry.read(0).is_ok());
    }

    #[test]
    fn read_on_unattached_or_out_of_range_port_is_a_range_error() {
        let mut registry = registry_with_rows(&["45.1;9.0"]);
        assert!(matches!(
            registry.read(1),
            Err(GatewayError::DeviceRange(_))
        ));
        assert!(matches!(
            registry.read(9),
            Err(GatewayError::DeviceRange(_))
        ));
    }

    #[test]
    fn read_before_initialise_is_a_range_error() {
        let mut registry = DeviceRegistry::new(1);
        registry.attach_device(0, Box::new(GpsSensor::new())).unwrap();
        assert!(matches!(
            registry.read(0),
            Err(GatewayError::DeviceRange(_))
        ));
    }

    #[test]
    fn release_then_read_fails_until_reattach() {
        let mut registry = registry_with_rows(&["45.1;9.0", "45.2;9.1"]);
        registry.attach_device(0, Box::new(GpsSensor::new())).unwrap();
        registry.read(0).unwrap();

        registry.release_device(0).unwrap();
        assert!(matches!(
            registry.read(0),
            Err(GatewayError::DeviceRange(_))
        ));

        registry.attach_device(0, Box::new(GpsSensor::new())).unwrap();
        // Attach resets the cursor to the start of the source
        assert_eq!(registry.read(0).unwrap(), b"45.1;9.0".to_vec());
    }

    #[test]
    fn attach_out_of_range_fails() {
        let mut registry = DeviceRegistry::new(1);
        let err = registry.attach_device(5, Box::new(GpsSensor::new())).unwrap_err();
        assert!(matches!(err, GatewayError::DeviceRange(_)));
    }

    #[test]
    fn initialise_rejects_missing_and_empty_sources() {
        let mut registry = DeviceRegistry::new(1);
        assert!(matches!(
            registry.initialise("/nonexistent/replay.csv"),
            Err(GatewayError::Source(_))
        ));

        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            registry.initialise(file.path()),
            Err(GatewayError::Source(_))
        ));
    }

    #[test]
    fn format_delegates_to_attached_sensor() {
        let mut registry = registry_with_rows(&["45.1;9.0"]);
        registry.attach_device(0, Box::new(GpsSensor::new())).unwrap();
        let raw = registry.read(0).unwrap();
        let line = registry.format(0, &raw).unwrap();
        assert!(line.contains("GPS: 45.1; 9.0"));

        assert!(registry.format(1, &raw).is_err());
    }
}
