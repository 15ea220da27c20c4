//! Module termux
//!
//! Data acquisition from the phone's sensing subsystem through the Termux:API
//! `termux-sensor` command. All interaction with the external process lives
//! here: listing the available sensors and one-shot multi-sensor reads,
//! including the textual/JSON fallback parsing of the command output.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use log::error;
use serde_json::Value;
use tokio::process::Command;

use crate::models::errors::SamplerError;
use crate::ports::ProbePort;

/// Constants for the sensor command invocation.
const SENSOR_CMD: &str = "termux-sensor";
const LIST_FLAG: &str = "-l";
const SELECT_FLAG: &str = "-s";
const COUNT_FLAG: &str = "-n";

const PROBE_TIMEOUT_SECS: u64 = 10;

/// Probe over the `termux-sensor` CLI. Every failure (command missing,
/// non-zero exit, timeout, malformed output) is absorbed here and logged;
/// callers see empty results.
pub struct TermuxProbe {
    command: String,
    timeout: Duration,
}

impl TermuxProbe {
    pub fn new() -> Self {
        Self {
            command: SENSOR_CMD.to_string(),
            timeout: Duration::from_secs(PROBE_TIMEOUT_SECS),
        }
    }

    /// Overrides the executable and the per-call time bound.
    pub fn with_command(command: &str, timeout: Duration) -> Self {
        Self {
            command: command.to_string(),
            timeout,
        }
    }

    /// Runs the sensor command and captures stdout. Calls are time-bounded;
    /// a hung command is reported as a timeout error.
    async fn run(&self, args: &[&str]) -> Result<String, SamplerError> {
        let output = tokio::time::timeout(
            self.timeout,
            Command::new(&self.command).args(args).output(),
        )
        .await
        .map_err(|_| SamplerError::Command(format!("{} timed out", self.command)))?
        .map_err(|e| SamplerError::Command(e.to_string()))?;

        if !output.status.success() {
            return Err(SamplerError::Command(format!(
                "{} exited with {}",
                self.command, output.status
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for TermuxProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProbePort for TermuxProbe {
    async fn list_sensors(&self) -> Vec<String> {
        match self.run(&[LIST_FLAG]).await {
            Ok(out) => parse_sensor_list(&out),
            Err(e) => {
                error!("Could not list sensors: {:?}", e);
                Vec::new()
            }
        }
    }

    async fn read_once(&self, names: &[String]) -> HashMap<String, Vec<f64>> {
        if names.is_empty() {
            return HashMap::new();
        }
        let selection = names.join(",");
        let result = self
            .run(&[SELECT_FLAG, &selection, COUNT_FLAG, "1"])
            .await
            .and_then(|out| parse_readings(&out));
        match result {
            Ok(readings) => readings,
            Err(e) => {
                error!("Sensor read failed: {:?}", e);
                HashMap::new()
            }
        }
    }
}

/// Parses the sensor list: JSON `{"sensors": [...]}` when the API reports a
/// structured list, otherwise one sensor per line, colon-terminated or bare.
fn parse_sensor_list(out: &str) -> Vec<String> {
    if let Ok(value) = serde_json::from_str::<Value>(out) {
        if let Some(sensors) = value.get("sensors").and_then(Value::as_array) {
            return sensors
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect();
        }
    }

    out.lines()
        .filter_map(|line| {
            let line = line.trim();
            if line.is_empty() {
                return None;
            }
            let name = match line.split_once(':') {
                Some((name, _)) => name.trim(),
                None => line,
            };
            Some(name.to_string())
        })
        .collect()
}

/// Parses a one-shot read: a JSON object mapping each sensor name to an
/// object with a `values` numeric array. Entries without values yield an
/// empty vector.
fn parse_readings(out: &str) -> Result<HashMap<String, Vec<f64>>, SamplerError> {
    let value: Value =
        serde_json::from_str(out).map_err(|e| SamplerError::IncorrectDataFormat(e.to_string()))?;
    let object = value.as_object().ok_or_else(|| {
        SamplerError::IncorrectDataFormat("Expected a JSON object of readings".to_string())
    })?;

    let mut readings = HashMap::with_capacity(object.len());
    for (name, entry) in object {
        let values = entry
            .get("values")
            .and_then(Value::as_array)
            .map(|array| array.iter().filter_map(Value::as_f64).collect())
            .unwrap_or_default();
        readings.insert(name.clone(), values);
    }
    Ok(readings)
}
