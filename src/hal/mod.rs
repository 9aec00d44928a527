//! Hardware abstraction layer: sensor capabilities and the device registry

pub mod registry;
pub mod sensor;

pub use registry::DeviceRegistry;
pub use sensor::{GpsSensor, PositioningSensor, Sensor, RAW_FIELD_SEPARATOR, READING_SEPARATOR};
