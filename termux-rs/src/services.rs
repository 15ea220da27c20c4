use std::path::Path;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::Local;
use log::{debug, error, info};
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

use common::{AggregateView, DeviceMapping, RollingBuffer, Row, SensorCatalog};

use crate::adapters::mock::ProbeMock;
use crate::adapters::production::TermuxProbe;
use crate::config::SamplerConfig;
use crate::log_writer::CsvLogWriter;
use crate::models::errors::SamplerError;
use crate::models::events::StreamEvent;
use crate::models::shutdown;
use crate::normalizer;
use crate::ports::ProbePort;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const SUBSCRIBER_CHANNEL_CAPACITY: usize = 8;

/// Generic sampler service over a device probe.
///
/// Owns the two buffers: the rolling window feeding snapshots and live
/// feeds, and (inside the log writer) the pending batch feeding the durable
/// history. The sampling loop is the only writer; snapshot and feed readers
/// take point-in-time copies under a short lock, never blocking the loop
/// across I/O.
pub struct SamplerService<C>
where
    C: ProbePort,
{
    client: C,
    catalog: SensorCatalog,
    config: SamplerConfig,
    window: RwLock<RollingBuffer<Row>>,
    log_writer: Option<CsvLogWriter>,
    abort_signal: Arc<Notify>,
}

impl<C> SamplerService<C>
where
    C: ProbePort,
{
    /// Creates a new sampler over `client`. Fails only when the durable log
    /// cannot be created at `config.log_path`.
    pub fn new(client: C, config: SamplerConfig) -> Result<Self, SamplerError> {
        let catalog = SensorCatalog::default();
        let log_writer = config
            .log_path
            .as_ref()
            .map(|path| CsvLogWriter::new(path, &catalog.header(), config.write_batch_size))
            .transpose()?;

        Ok(Self {
            client,
            window: RwLock::new(RollingBuffer::new(config.window)),
            log_writer,
            abort_signal: Arc::new(Notify::new()),
            catalog,
            config,
        })
    }

    /// Starts the data acquisition loop: resolves the device mapping, then
    /// samples on a fixed wall-clock interval until a SIGINT (or until
    /// `run_for_millis` elapses, for bounded runs). Performs a final flush
    /// before returning.
    ///
    /// Returns a NoSensors error when the device reports no sensors or none
    /// of them match the catalog.
    pub async fn start(&self, run_for_millis: Option<u64>) -> Result<(), SamplerError> {
        let abort_signal = self.abort_signal.clone();
        let _ = shutdown::listen_for_shutdown(Arc::clone(&abort_signal), run_for_millis);

        let mapping = self.resolve_mapping().await?;
        let call_list = mapping.device_names();

        info!(
            "Sampling {} device sensors every {:?}",
            call_list.len(),
            self.config.interval
        );

        loop {
            tokio::select! {
                _ = abort_signal.notified() => {
                    break;
                }

                _ = tokio::time::sleep(self.config.interval) => {
                    if let Err(e) = self.sample_tick(&mapping, &call_list).await {
                        error!("Sampling tick failed, skipping: {:?}", e);
                    }
                }
            }
        }

        info!("Sampler stopping, flushing pending rows...");
        self.flush()
    }

    /// Mapping state: queries the device sensor list once and resolves the
    /// canonical mapping.
    async fn resolve_mapping(&self) -> Result<DeviceMapping, SamplerError> {
        let device_sensors = self.client.list_sensors().await;
        if device_sensors.is_empty() {
            return Err(SamplerError::NoSensors(
                "Device reported no sensors".to_string(),
            ));
        }

        let mapping = self.catalog.build_mapping(&device_sensors);
        info!("Sensor mapping (canonical -> device):");
        for group in self.catalog.groups() {
            match mapping.device_for(group.name()) {
                Some(device) => info!("  {:<14} -> {}", group.name(), device),
                None => info!("  {:<14} -> NOT FOUND", group.name()),
            }
        }

        if mapping.matched_count() == 0 {
            return Err(SamplerError::NoSensors(
                "No catalog group matched a device sensor".to_string(),
            ));
        }
        Ok(mapping)
    }

    /// One Running-state tick: read, normalize, push to the window, queue for
    /// the durable log. An empty reading skips the tick, leaving both buffers
    /// unchanged.
    async fn sample_tick(
        &self,
        mapping: &DeviceMapping,
        call_list: &[String],
    ) -> Result<(), SamplerError> {
        let raw = self.client.read_once(call_list).await;
        if raw.is_empty() {
            debug!("Empty reading, tick skipped");
            return Ok(());
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let row = normalizer::normalize(&self.catalog, mapping, &raw, timestamp);

        self.window.write().unwrap().push(row.clone());

        if let Some(writer) = &self.log_writer {
            writer.append(row)?;
        }
        Ok(())
    }

    /// Point-in-time aggregate view of the rolling window.
    pub fn snapshot(&self) -> AggregateView {
        let rows = self.window.read().unwrap().to_vec();
        AggregateView::from_rows(&self.catalog, &rows)
    }

    /// Forces all pending rows onto disk. Success when the durable log is
    /// disabled or the batch is empty.
    pub fn flush(&self) -> Result<(), SamplerError> {
        match &self.log_writer {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    /// Location of the durable log, when persistence is enabled.
    pub fn log_path(&self) -> Option<&Path> {
        self.log_writer.as_ref().map(|writer| writer.path())
    }

    pub fn interval(&self) -> Duration {
        self.config.interval
    }
}

impl<C> SamplerService<C>
where
    C: ProbePort + Send + Sync + 'static,
{
    /// Opens an independent live-feed subscription: first a start-of-stream
    /// marker carrying the push interval, then a fresh [`AggregateView`]
    /// every interval whether or not the data changed.
    ///
    /// Each subscription runs in its own task; dropping the receiver makes
    /// the next send fail, which promptly ends the task. The feed never
    /// terminates on its own.
    pub fn subscribe(self: Arc<Self>) -> mpsc::Receiver<StreamEvent> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        let id = Uuid::new_v4();
        let interval = self.config.interval;

        tokio::spawn(async move {
            debug!("Subscriber {} connected", id);
            let open = StreamEvent::Open {
                retry_millis: interval.as_millis() as u64,
            };
            if tx.send(open).await.is_ok() {
                loop {
                    let update = StreamEvent::Update(self.snapshot());
                    if tx.send(update).await.is_err() {
                        break;
                    }
                    tokio::time::sleep(interval).await;
                }
            }
            debug!("Subscriber {} disconnected", id);
        });

        rx
    }
}

/// Starts the sampler service over the real Termux probe, handling sensor
/// data acquisition in a background task.
///
/// Returns a tuple containing:
/// * A `tokio::task::JoinHandle<()>` representing the spawned acquisition task.
/// * An `Arc<SamplerService<TermuxProbe>>` for snapshot/subscribe/flush access.
pub fn run_service(
    config: SamplerConfig,
) -> Result<(tokio::task::JoinHandle<()>, Arc<SamplerService<TermuxProbe>>), SamplerError> {
    spawn_service(TermuxProbe::new(), config, None)
}

/// Starts the sampler over a mock probe producing synthetic readings, for
/// development and demos without a device.
pub fn run_mock_service(
    config: SamplerConfig,
    run_for_millis: Option<u64>,
) -> Result<(tokio::task::JoinHandle<()>, Arc<SamplerService<ProbeMock>>), SamplerError> {
    spawn_service(ProbeMock::synthetic(), config, run_for_millis)
}

/// Spawns the acquisition loop of a service built over `client`. Loop errors
/// are logged, not propagated out of the task.
pub fn spawn_service<C>(
    client: C,
    config: SamplerConfig,
    run_for_millis: Option<u64>,
) -> Result<(tokio::task::JoinHandle<()>, Arc<SamplerService<C>>), SamplerError>
where
    C: ProbePort + Send + Sync + 'static,
{
    let service = Arc::new(SamplerService::new(client, config)?);
    let handle = tokio::spawn({
        let service_clone = service.clone();
        async move {
            if let Err(e) = service_clone.start(run_for_millis).await {
                error!("Error in sampler loop: {:?}", e);
            }
        }
    });
    Ok((handle, service))
}
