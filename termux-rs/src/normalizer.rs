//! Raw reading to canonical row conversion.

use std::collections::HashMap;

use common::{DeviceMapping, Row, SensorCatalog};

/// Converts one raw reading set into a canonical row. Total function: missing
/// sensors, missing axes and unmapped groups all become `0.0`.
///
/// Proximity is special-cased: when no dedicated sensor is mapped, it is
/// derived from the Light reading's second value if present.
pub(crate) fn normalize(
    catalog: &SensorCatalog,
    mapping: &DeviceMapping,
    raw: &HashMap<String, Vec<f64>>,
    timestamp: impl Into<String>,
) -> Row {
    let mut values = Vec::new();
    for group in catalog.groups() {
        let device = mapping.device_for(group.name());
        let mut vals: Vec<f64> = device
            .and_then(|name| raw.get(name))
            .cloned()
            .unwrap_or_default();

        if group.name() == "Proximity" && device.is_none() {
            vals = derive_proximity(mapping, raw);
        }

        values.extend(pad(vals, group.axes().len()));
    }
    Row::new(timestamp, values)
}

/// Fallback for devices reporting proximity through a combined
/// light/proximity part: the Light reading's second value.
fn derive_proximity(mapping: &DeviceMapping, raw: &HashMap<String, Vec<f64>>) -> Vec<f64> {
    mapping
        .device_for("Light")
        .and_then(|name| raw.get(name))
        .filter(|vals| vals.len() > 1)
        .map(|vals| vec![vals[1]])
        .unwrap_or_default()
}

/// Truncates or zero-pads `vals` to exactly `n` entries.
fn pad(mut vals: Vec<f64>, n: usize) -> Vec<f64> {
    vals.truncate(n);
    vals.resize(n, 0.0);
    vals
}
