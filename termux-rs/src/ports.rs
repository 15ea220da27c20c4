use std::collections::HashMap;

use async_trait::async_trait;

/// Boundary to the device sensing subsystem. This is the only place real I/O
/// latency or external-process failure can occur; implementations absorb
/// every failure and log it, so a probe call never raises to the sampling
/// loop.
#[async_trait]
pub trait ProbePort {
    /// Raw sensor names as reported by the device, in device order.
    /// Any failure yields an empty list.
    async fn list_sensors(&self) -> Vec<String>;

    /// One-shot reading of the named sensors: raw name to numeric values.
    /// Any failure yields an empty map.
    async fn read_once(&self, names: &[String]) -> HashMap<String, Vec<f64>>;
}
