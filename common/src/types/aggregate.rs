use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::types::catalog::SensorCatalog;
use crate::types::row::Row;

/// Point-in-time projection of the rolling window, shaped for viewers:
/// a shared timestamp array, per-group per-axis value arrays aligned to it
/// (axis labels upper-cased), and the latest and second-latest rows as field
/// maps. Recomputed per request, never persisted.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AggregateView {
    pub time: Vec<String>,
    pub sensors: BTreeMap<String, BTreeMap<String, Vec<f64>>>,
    pub latest_row: Map<String, Value>,
    pub previous_row: Map<String, Value>,
}

impl AggregateView {
    /// Builds the view from a chronological slice of rows. Column keys are
    /// resolved back to `(group, axis)` through the catalog; keys outside the
    /// canonical groups are dropped. An empty slice yields the empty view.
    pub fn from_rows(catalog: &SensorCatalog, rows: &[Row]) -> Self {
        let latest = match rows.last() {
            Some(latest) => latest,
            None => return Self::default(),
        };

        let keys = catalog.column_keys();
        let time = rows.iter().map(|r| r.timestamp().to_string()).collect();

        let mut sensors: BTreeMap<String, BTreeMap<String, Vec<f64>>> = BTreeMap::new();
        for row in rows {
            for (key, value) in keys.iter().zip(row.values()) {
                if let Some((group, axis)) = catalog.resolve_column(key) {
                    sensors
                        .entry(group.to_string())
                        .or_default()
                        .entry(axis)
                        .or_default()
                        .push(*value);
                }
            }
        }

        let latest_row = row_fields(catalog, &keys, latest);
        let previous_row = if rows.len() > 1 {
            row_fields(catalog, &keys, &rows[rows.len() - 2])
        } else {
            Map::new()
        };

        Self {
            time,
            sensors,
            latest_row,
            previous_row,
        }
    }
}

/// One row as a `column key -> value` map, `timestamp` included, filtered to
/// columns that resolve to a canonical group.
fn row_fields(catalog: &SensorCatalog, keys: &[String], row: &Row) -> Map<String, Value> {
    let mut fields = Map::new();
    fields.insert(
        "timestamp".to_string(),
        Value::String(row.timestamp().to_string()),
    );
    for (key, value) in keys.iter().zip(row.values()) {
        if catalog.resolve_column(key).is_some() {
            fields.insert(key.clone(), Value::from(*value));
        }
    }
    fields
}
