// Emulates the device probe for tests and development runs.

mod gaussian;

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::ports::ProbePort;

use gaussian::GaussianNoise;

const GAUSSIAN_SENSOR_MEAN: f64 = 0.0;
const GAUSSIAN_SENSOR_STDEV: f64 = 0.5;

/// Configures mock data acquisition: either a finite script of readings
/// (exhaustion yields empty reads, which the sampling loop treats as skipped
/// ticks) or a constant reading repeated forever, optionally with Gaussian
/// noise.
pub struct ProbeMock {
    sensors: Vec<String>,
    scripted: Mutex<VecDeque<HashMap<String, Vec<f64>>>>,
    constant: Option<HashMap<String, Vec<f64>>>,
    noise: Option<GaussianNoise>,
}

impl ProbeMock {
    pub fn new(sensors: &[&str]) -> Self {
        Self {
            sensors: sensors.iter().map(|s| s.to_string()).collect(),
            scripted: Mutex::new(VecDeque::new()),
            constant: None,
            noise: None,
        }
    }

    /// Queues readings returned one per tick, in order.
    pub fn with_script(self, readings: Vec<HashMap<String, Vec<f64>>>) -> Self {
        Self {
            scripted: Mutex::new(readings.into()),
            ..self
        }
    }

    /// Repeats `reading` on every tick once the script (if any) is exhausted.
    pub fn with_constant(self, reading: HashMap<String, Vec<f64>>) -> Self {
        Self {
            constant: Some(reading),
            ..self
        }
    }

    /// Adds Gaussian noise to every constant reading.
    pub fn with_noise(self) -> Self {
        Self {
            noise: Some(GaussianNoise::new(
                GAUSSIAN_SENSOR_MEAN,
                GAUSSIAN_SENSOR_STDEV,
            )),
            ..self
        }
    }

    /// A phone-shaped mock: accelerometer, gyroscope and a combined
    /// light/proximity part, with noisy steady-state values.
    pub fn synthetic() -> Self {
        let reading = HashMap::from([
            (
                "LSM6DSO Accelerometer".to_string(),
                vec![0.12, -0.04, 9.81],
            ),
            ("LSM6DSO Gyroscope".to_string(), vec![0.01, 0.0, -0.02]),
            ("TCS3701 Light".to_string(), vec![120.0, 3.0]),
        ]);
        Self::new(&[
            "LSM6DSO Accelerometer",
            "LSM6DSO Gyroscope",
            "TCS3701 Light",
        ])
        .with_constant(reading)
        .with_noise()
    }
}

#[async_trait]
impl ProbePort for ProbeMock {
    async fn list_sensors(&self) -> Vec<String> {
        self.sensors.clone()
    }

    async fn read_once(&self, names: &[String]) -> HashMap<String, Vec<f64>> {
        if names.is_empty() {
            return HashMap::new();
        }
        if let Some(next) = self.scripted.lock().unwrap().pop_front() {
            return next;
        }
        let constant = match &self.constant {
            Some(constant) => constant,
            None => return HashMap::new(),
        };

        let mut reading = constant.clone();
        if let Some(noise) = &self.noise {
            let mut rng = StdRng::from_entropy();
            for values in reading.values_mut() {
                *values = noise.add_noise_vec(&mut rng, std::mem::take(values));
            }
        }
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: f64) -> HashMap<String, Vec<f64>> {
        HashMap::from([("LSM Accelerometer".to_string(), vec![value, 0.0, 0.0])])
    }

    #[tokio::test]
    async fn test_scripted_readings_in_order_then_empty() {
        let mock = ProbeMock::new(&["LSM Accelerometer"])
            .with_script(vec![reading(1.0), reading(2.0)]);
        let names = vec!["LSM Accelerometer".to_string()];

        assert_eq!(mock.read_once(&names).await, reading(1.0));
        assert_eq!(mock.read_once(&names).await, reading(2.0));
        assert!(mock.read_once(&names).await.is_empty());
    }

    #[tokio::test]
    async fn test_constant_reading_repeats() {
        let mock = ProbeMock::new(&["LSM Accelerometer"]).with_constant(reading(1.0));
        let names = vec!["LSM Accelerometer".to_string()];

        assert_eq!(mock.read_once(&names).await, reading(1.0));
        assert_eq!(mock.read_once(&names).await, reading(1.0));
    }

    #[tokio::test]
    async fn test_empty_call_list_reads_nothing() {
        let mock = ProbeMock::new(&["LSM Accelerometer"]).with_constant(reading(1.0));
        assert!(mock.read_once(&[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_synthetic_lists_its_sensors() {
        let mock = ProbeMock::synthetic();
        assert_eq!(mock.list_sensors().await.len(), 3);
    }
}
