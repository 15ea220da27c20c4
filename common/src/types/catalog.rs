use std::collections::HashMap;

/// One canonical sensor group: its axis labels, and the raw-name substrings
/// used to match it against whatever the device reports.
///
/// Candidate order matters: it is the tie-break rule when several raw names
/// could match (first candidate wins, then first raw name in device order).
#[derive(Clone, Debug, PartialEq)]
pub struct SensorGroup {
    name: &'static str,
    axes: &'static [&'static str],
    candidates: &'static [&'static str],
}

impl SensorGroup {
    pub const fn new(
        name: &'static str,
        axes: &'static [&'static str],
        candidates: &'static [&'static str],
    ) -> Self {
        Self {
            name,
            axes,
            candidates,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn axes(&self) -> &'static [&'static str] {
        self.axes
    }

    /// Returns the first raw name containing any of this group's candidate
    /// substrings, case-insensitive. Candidates are scanned in declared order,
    /// raw names in device-reported order. No match is not an error.
    pub fn match_against<'a>(&self, raw_names: &'a [String]) -> Option<&'a str> {
        for candidate in self.candidates {
            let candidate = candidate.to_lowercase();
            for raw in raw_names {
                if raw.to_lowercase().contains(&candidate) {
                    return Some(raw.as_str());
                }
            }
        }
        None
    }
}

const DEFAULT_GROUPS: [SensorGroup; 12] = [
    SensorGroup::new("Accelerometer", &["X", "Y", "Z"], &["accelerometer"]),
    SensorGroup::new("Gyroscope", &["X", "Y", "Z"], &["gyroscope"]),
    SensorGroup::new("Magnetometer", &["X", "Y", "Z"], &["magnetometer"]),
    SensorGroup::new("Gravity", &["X", "Y", "Z"], &["gravity"]),
    SensorGroup::new("Linear", &["X", "Y", "Z"], &["linear acceleration"]),
    SensorGroup::new("Rotation", &["X", "Y", "Z", "W", "E"], &["rotation vector"]),
    SensorGroup::new("GameRotation", &["X", "Y", "Z", "W"], &["game rotation vector"]),
    SensorGroup::new(
        "GeoRotation",
        &["X", "Y", "Z", "W"],
        &["geomagnetic rotation vector", "geomagnetic rotation"],
    ),
    SensorGroup::new("Orientation", &["Azimuth", "Pitch", "Roll"], &["orientation"]),
    SensorGroup::new("Light", &["Lux"], &["light", "alsps"]),
    SensorGroup::new("Proximity", &["Distance"], &["proximity", "alsps"]),
    SensorGroup::new("Step", &["Count"], &["step counter"]),
];

/// The canonical sensor schema: an ordered list of [`SensorGroup`]s.
///
/// Declaration order is normative. It fixes the durable-log column order and
/// the iteration order of everything derived from the schema.
#[derive(Clone, Debug)]
pub struct SensorCatalog {
    groups: Vec<SensorGroup>,
}

impl Default for SensorCatalog {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS.to_vec(),
        }
    }
}

impl SensorCatalog {
    pub fn from_groups(groups: Vec<SensorGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[SensorGroup] {
        &self.groups
    }

    pub fn group(&self, name: &str) -> Option<&SensorGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Column keys in declaration order: `{group}_{axis}` per axis per group.
    pub fn column_keys(&self) -> Vec<String> {
        self.groups
            .iter()
            .flat_map(|group| {
                group
                    .axes
                    .iter()
                    .map(move |axis| format!("{}_{}", group.name, axis))
            })
            .collect()
    }

    /// Durable-log header: `timestamp` followed by every column key.
    pub fn header(&self) -> Vec<String> {
        let mut header = vec!["timestamp".to_string()];
        header.extend(self.column_keys());
        header
    }

    /// Builds the group -> raw device name mapping from the live device's
    /// sensor list. Every catalog group gets an entry; unmatched groups map
    /// to `None`.
    pub fn build_mapping(&self, raw_names: &[String]) -> DeviceMapping {
        let entries = self
            .groups
            .iter()
            .map(|group| {
                (
                    group.name.to_string(),
                    group.match_against(raw_names).map(String::from),
                )
            })
            .collect();
        DeviceMapping { entries }
    }

    /// Reverse lookup from a stored column key back to `(group, axis)`.
    ///
    /// Splits on the first `_` (axis defaults to `X` when absent), then
    /// prefix-matches the group part against canonical names, longest name
    /// first so `GameRotation_X` never resolves to `Rotation`. The axis label
    /// is upper-cased. Keys whose prefix matches no canonical group resolve
    /// to `None`.
    pub fn resolve_column(&self, key: &str) -> Option<(&'static str, String)> {
        let (sensor, axis) = match key.split_once('_') {
            Some((sensor, axis)) => (sensor, axis),
            None => (key, "X"),
        };

        let mut by_length: Vec<&SensorGroup> = self.groups.iter().collect();
        by_length.sort_by_key(|group| std::cmp::Reverse(group.name.len()));

        by_length
            .iter()
            .find(|group| sensor.starts_with(group.name))
            .map(|group| (group.name, axis.to_uppercase()))
    }
}

/// Mapping from canonical group name to the matched raw device sensor name,
/// built once per process lifetime by [`SensorCatalog::build_mapping`].
#[derive(Clone, Debug, Default)]
pub struct DeviceMapping {
    entries: HashMap<String, Option<String>>,
}

impl DeviceMapping {
    /// The raw device name matched for `group`, if any.
    pub fn device_for(&self, group: &str) -> Option<&str> {
        self.entries.get(group).and_then(|name| name.as_deref())
    }

    /// Sorted, deduplicated list of matched device names: the probe call list.
    pub fn device_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.values().flatten().cloned().collect();
        names.sort();
        names.dedup();
        names
    }

    pub fn matched_count(&self) -> usize {
        self.entries.values().filter(|name| name.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
