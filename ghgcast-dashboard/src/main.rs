// GHGcast Dashboard - Live emission forecast dashboard
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # GHGcast Dashboard
//!
//! Runs the emission forecast loop and serves its live tables, a JSON
//! snapshot and Prometheus metrics over HTTP.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the dashboard on the default port
//! ghgcast-dashboard --model models/ghg_emissions.json
//!
//! # Print to the terminal instead of serving, then export the log
//! ghgcast-dashboard --headless --pause-ms 0 --export-csv run.csv
//! ```

mod export;
mod metrics;
mod page;
mod state;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use clap::Parser;
use ghgcast::{
    load_model, ConsoleSink, DisplaySink, Driver, EmissionLog, EmissionModel, Redraw, RunConfig,
    TelemetrySimulator, TickGases,
};
use metrics::encode_metrics;
use serde::Serialize;
use state::{DashboardState, SharedSink, Snapshot};
use std::net::SocketAddr;
use std::process;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

/// GHGcast live emission forecast
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model artifact (JSON)
    #[arg(short, long)]
    model: Option<String>,

    /// Run configuration file (JSON)
    #[arg(short, long)]
    config: Option<String>,

    /// Number of iterations
    #[arg(short, long)]
    iterations: Option<usize>,

    /// Pause between iterations in milliseconds
    #[arg(long)]
    pause_ms: Option<u64>,

    /// Gases per tick (both, random-one)
    #[arg(long)]
    gases: Option<TickGases>,

    /// Redraw granularity (every-tick, end-of-run)
    #[arg(long)]
    redraw: Option<Redraw>,

    /// Rows in the latest observations table
    #[arg(long)]
    tail: Option<usize>,

    /// Simulator seed
    #[arg(long)]
    seed: Option<u64>,

    /// Port to listen on
    #[arg(short, long, default_value = "8501")]
    port: u16,

    /// Print to the terminal instead of serving HTTP
    #[arg(long)]
    headless: bool,

    /// Write the emission log to this CSV file when the run ends
    #[arg(long)]
    export_csv: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Load the run configuration and apply command-line overrides.
    fn run_config(&self) -> ghgcast::Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path)?,
            None => RunConfig::default(),
        };

        if let Some(model) = &self.model {
            config.model_path = model.clone();
        }
        if let Some(iterations) = self.iterations {
            config.driver.iterations = iterations;
        }
        if let Some(pause_ms) = self.pause_ms {
            config.driver.pause_ms = pause_ms;
        }
        if let Some(gases) = self.gases {
            config.driver.gases = gases;
        }
        if let Some(redraw) = self.redraw {
            config.driver.redraw = redraw;
        }
        if let Some(tail) = self.tail {
            config.driver.tail_len = tail;
        }
        if let Some(seed) = self.seed {
            config.simulator.seed = Some(seed);
        }

        config.driver.validate()?;
        Ok(config)
    }
}

/// Application state shared across handlers.
struct AppState {
    dashboard: Arc<DashboardState>,
    start_time: std::time::Instant,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("GHGcast Dashboard v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.run_config() {
        Ok(config) => config,
        Err(e) => fatal(format!("Invalid configuration: {}", e)),
    };

    let model = match load_model(&config.model_path) {
        Ok(model) => model,
        Err(e) => fatal(format!(
            "Failed to load model {}: {}",
            config.model_path, e
        )),
    };

    let simulator = match TelemetrySimulator::new(config.simulator.clone()) {
        Ok(simulator) => simulator,
        Err(e) => fatal(format!("Invalid simulator configuration: {}", e)),
    };

    let dashboard = DashboardState::new(model.name(), config.driver.iterations);
    let driver = match Driver::new(config.driver.clone(), model, simulator) {
        Ok(driver) => driver,
        Err(e) => fatal(format!("Invalid driver configuration: {}", e)),
    };

    if args.headless {
        let export_path = args.export_csv.clone();
        let outcome = tokio::task::spawn_blocking(move || {
            run_to_completion(driver, ConsoleSink::stdout(), export_path.as_deref())
        })
        .await;
        match outcome {
            Ok(Ok(())) => return,
            Ok(Err(e)) => fatal(e),
            Err(e) => fatal(format!("Driver task panicked: {}", e)),
        }
    }

    // Drive the run in the background while serving its state
    let export_path = args.export_csv.clone();
    let run_state = Arc::clone(&dashboard);
    tokio::task::spawn_blocking(move || {
        let sink = SharedSink::new(Arc::clone(&run_state));
        if let Err(e) = run_to_completion(driver, sink, export_path.as_deref()) {
            error!("{}", e);
            run_state.mark_failed(e);
        }
    });

    let state = Arc::new(AppState {
        dashboard,
        start_time: std::time::Instant::now(),
    });

    // Build router
    let app = Router::new()
        .route("/", get(root_handler))
        .route("/snapshot", get(snapshot_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/status", get(status_handler))
        .with_state(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], args.port));
    info!("Starting dashboard on http://{}", addr);
    info!("Metrics endpoint: http://{}/metrics", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => fatal(format!("Failed to bind {}: {}", addr, e)),
    };
    if let Err(e) = axum::serve(listener, app).await {
        fatal(format!("Server error: {}", e));
    }
}

/// Run the driver to completion, then export the log if requested.
fn run_to_completion<M, S>(
    mut driver: Driver<M>,
    mut sink: S,
    export_path: Option<&str>,
) -> Result<(), String>
where
    M: EmissionModel,
    S: DisplaySink,
{
    let outcome = driver.run(&mut sink);
    let log = driver.into_log();

    if let Some(path) = export_path {
        export_log(&log, path)?;
    }
    outcome.map_err(|e| format!("Forecast run aborted after {} records: {}", log.len(), e))?;

    info!("Forecast run finished with {} records", log.len());
    Ok(())
}

fn export_log(log: &EmissionLog, path: &str) -> Result<(), String> {
    export::export_csv(log, path)
        .map(|_| ())
        .map_err(|e| format!("Failed to export {}: {}", path, e))
}

fn fatal(message: String) -> ! {
    error!("{}", message);
    process::exit(1);
}

/// Root handler - renders the live dashboard.
async fn root_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    let snapshot = state.dashboard.snapshot.read().await;
    Html(page::render_page(&snapshot))
}

/// Snapshot handler - returns the current tables as JSON.
async fn snapshot_handler(State(state): State<Arc<AppState>>) -> Json<Snapshot> {
    Json(state.dashboard.snapshot.read().await.clone())
}

/// Metrics handler - returns Prometheus text format.
async fn metrics_handler() -> impl IntoResponse {
    let metrics = encode_metrics();
    (
        StatusCode::OK,
        [("Content-Type", "text/plain; charset=utf-8")],
        metrics,
    )
}

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// Readiness check handler. Ready once the run has finished.
async fn ready_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let progress = &state.dashboard.progress;
    if progress.failed.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "Failed");
    }
    if progress.finished.load(Ordering::SeqCst) {
        (StatusCode::OK, "Ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "Running")
    }
}

/// Status information response.
#[derive(Serialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    run: RunStatus,
}

/// Run status information.
#[derive(Serialize)]
struct RunStatus {
    iteration: usize,
    total_iterations: usize,
    records: usize,
    progress_percent: f64,
    finished: bool,
    failed: bool,
}

/// Status handler - returns JSON status information.
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let progress = &state.dashboard.progress;
    Json(StatusResponse {
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        run: RunStatus {
            iteration: progress.iteration.load(Ordering::SeqCst),
            total_iterations: progress.total.load(Ordering::SeqCst),
            records: progress.records.load(Ordering::SeqCst),
            progress_percent: progress.percent(),
            finished: progress.finished.load(Ordering::SeqCst),
            failed: progress.failed.load(Ordering::SeqCst),
        },
    })
}
