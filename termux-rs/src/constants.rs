/// How many samples the in-memory window keeps and streams.
pub(crate) const DEFAULT_WINDOW: usize = 150;

/// Milliseconds between sampler ticks and live-feed pushes.
pub(crate) const DEFAULT_INTERVAL_MILLIS: u64 = 500;

/// How many rows to buffer before writing to disk.
pub(crate) const DEFAULT_WRITE_BATCH_SIZE: usize = 20;

/// Default durable-log location, relative to the working directory.
pub(crate) const DEFAULT_LOG_PATH: &str = "data/sensor_log.csv";
