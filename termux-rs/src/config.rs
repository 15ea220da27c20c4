use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_INTERVAL_MILLIS, DEFAULT_LOG_PATH, DEFAULT_WINDOW, DEFAULT_WRITE_BATCH_SIZE,
};

/// Configuration of the sampler service.
#[derive(Clone, Debug)]
pub struct SamplerConfig {
    /// Samples kept in the in-memory window.
    pub window: usize,
    /// Wall-clock time between sampler ticks; also the live-feed push cadence.
    pub interval: Duration,
    /// Rows buffered before a durable-log write.
    pub write_batch_size: usize,
    /// Durable-log location. `None` disables persistence.
    pub log_path: Option<PathBuf>,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            interval: Duration::from_millis(DEFAULT_INTERVAL_MILLIS),
            write_batch_size: DEFAULT_WRITE_BATCH_SIZE,
            log_path: Some(PathBuf::from(DEFAULT_LOG_PATH)),
        }
    }
}
