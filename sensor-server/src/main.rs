//! # sensor-server
//!
//! Phone-side sensor logging and streaming server. Runs the sampler loop in
//! the background and exposes its read and control interfaces over HTTP:
//!
//! - `GET /sensor-stream` - live SSE feed, one aggregate view per interval
//! - `GET /sensor-data`   - one-shot snapshot JSON
//! - `GET /export`        - flush, then download the CSV history
//! - `GET /health`        - liveness probe
//!
//! ```bash
//! # Sample the device every 500 ms, keep the CSV history
//! sensor-server --csv data/sensor_log.csv
//!
//! # Development run without a phone
//! sensor-server --mock --interval-millis 100
//! ```

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{AppendHeaders, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use clap::Parser;
use log::{error, info};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use termux_rs::config::SamplerConfig;
use termux_rs::models::events::StreamEvent;
use termux_rs::ports::ProbePort;
use termux_rs::services::{self, SamplerService};

/// Phone-side sensor logger and streaming server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value = "5000")]
    port: u16,

    /// Milliseconds between samples (and between live-feed pushes)
    #[arg(long, default_value = "500")]
    interval_millis: u64,

    /// How many samples to keep and stream
    #[arg(long, default_value = "150")]
    window: usize,

    /// How many rows to buffer before writing to disk
    #[arg(long, default_value = "20")]
    batch_size: usize,

    /// Durable CSV log location
    #[arg(long, default_value = "data/sensor_log.csv")]
    csv: PathBuf,

    /// Disable the durable CSV log
    #[arg(long)]
    no_csv: bool,

    /// Sample a synthetic mock probe instead of termux-sensor
    #[arg(long)]
    mock: bool,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = SamplerConfig {
        window: args.window,
        interval: Duration::from_millis(args.interval_millis),
        write_batch_size: args.batch_size,
        log_path: (!args.no_csv).then(|| args.csv.clone()),
    };
    let addr = SocketAddr::from((args.host, args.port));

    if args.mock {
        match services::run_mock_service(config, None) {
            Ok((handle, service)) => serve(service, handle, addr).await,
            Err(e) => exit_on_startup_error(e),
        }
    } else {
        match services::run_service(config) {
            Ok((handle, service)) => serve(service, handle, addr).await,
            Err(e) => exit_on_startup_error(e),
        }
    }
}

fn exit_on_startup_error(e: termux_rs::models::errors::SamplerError) -> ! {
    error!("Could not start sampler: {:?}", e);
    std::process::exit(1);
}

async fn serve<C>(service: Arc<SamplerService<C>>, sampler: JoinHandle<()>, addr: SocketAddr)
where
    C: ProbePort + Send + Sync + 'static,
{
    let app = Router::new()
        .route("/sensor-stream", get(sensor_stream::<C>))
        .route("/sensor-data", get(sensor_data::<C>))
        .route("/export", get(export_csv::<C>))
        .route("/health", get(health))
        .with_state(service);

    info!("SSE server at http://{}/sensor-stream", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Could not bind {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    // The sampler hears the same Ctrl+C and flushes its pending batch before
    // finishing; wait for it so the last rows reach the log.
    if let Err(e) = sampler.await {
        error!("Sampler task failed: {}", e);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Error while waiting for Ctrl+C: {}", e);
    }
}

fn cors() -> AppendHeaders<[(header::HeaderName, &'static str); 1]> {
    AppendHeaders([(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")])
}

/// One-shot snapshot of the aggregate view.
async fn sensor_data<C>(State(service): State<Arc<SamplerService<C>>>) -> impl IntoResponse
where
    C: ProbePort + Send + Sync + 'static,
{
    (cors(), Json(service.snapshot()))
}

/// Live feed: a retry hint first, then one JSON aggregate view per interval.
/// A view that cannot be serialized is signaled as an `error` event; the
/// client is expected to treat the stream as broken and reconnect.
async fn sensor_stream<C>(State(service): State<Arc<SamplerService<C>>>) -> impl IntoResponse
where
    C: ProbePort + Send + Sync + 'static,
{
    let feed = ReceiverStream::new(service.subscribe());
    let stream = feed.map(|event| {
        let event = match event {
            StreamEvent::Open { retry_millis } => {
                Event::default().retry(Duration::from_millis(retry_millis))
            }
            StreamEvent::Update(view) => match Event::default().json_data(&view) {
                Ok(event) => event,
                Err(e) => Event::default().event("error").data(e.to_string()),
            },
        };
        Ok::<Event, Infallible>(event)
    });

    (cors(), Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Forces a flush, then serves the durable log for download.
async fn export_csv<C>(State(service): State<Arc<SamplerService<C>>>) -> Response
where
    C: ProbePort + Send + Sync + 'static,
{
    if let Err(e) = service.flush() {
        error!("Flush before export failed: {:?}", e);
    }

    let path = match service.log_path().map(Path::to_path_buf) {
        Some(path) => path,
        None => return csv_not_available(),
    };
    match tokio::fs::read(&path).await {
        Ok(contents) => (
            cors(),
            [
                (header::CONTENT_TYPE, "text/csv"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"sensor_log.csv\"",
                ),
            ],
            contents,
        )
            .into_response(),
        Err(e) => {
            error!("Could not read {}: {}", path.display(), e);
            csv_not_available()
        }
    }
}

fn csv_not_available() -> Response {
    (
        StatusCode::NOT_FOUND,
        cors(),
        Json(serde_json::json!({"error": "CSV not available"})),
    )
        .into_response()
}

/// Liveness probe.
async fn health() -> impl IntoResponse {
    (cors(), Json(serde_json::json!({"status": "ok"})))
}
