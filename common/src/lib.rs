//! Shared vocabulary for the `sensorlog-rs` workspace

#[doc(hidden)]
pub mod types;

// Re-export types
#[doc(inline)]
pub use types::{buffers, AggregateView, DeviceMapping, RollingBuffer, Row, SensorCatalog, SensorGroup};
