//! EPICAST - Epidemic Dashboard Service
//!
//! Serves day-zero aligned case series and growth-decay forecasts as JSON.
//!
//! # Usage
//!
//! ```bash
//! # Download from the CSSE repository, serve on 0.0.0.0:8050
//! cargo run --release
//!
//! # Serve local copies of the CSVs on another port
//! ./epicast --data-dir ./data --addr 127.0.0.1:9000
//! ```
//!
//! # Environment Variables
//!
//! - `EPICAST_CONFIG`: Path to the TOML config (default: `./epicast.toml`)
//! - `EPICAST_CORS_ORIGINS`: Comma-separated origins allowed by CORS
//! - `RUST_LOG`: Logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use axum::Router;
use epicast::acquisition::{self, load_population, DataSource};
use epicast::alignment::AlignmentOptions;
use epicast::api::{create_app, DashboardState};
use epicast::config::{self, DashboardConfig};
use epicast::snapshot::{run_refresher, SnapshotStore};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "epicast")]
#[command(about = "Epidemic dashboard backend with growth-decay forecasts")]
#[command(version)]
struct CliArgs {
    /// Path to a TOML config file (overrides EPICAST_CONFIG / ./epicast.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Override the server address (default: "0.0.0.0:8050")
    #[arg(short, long, env = "EPICAST_ADDR")]
    addr: Option<String>,

    /// Read the CSSE CSVs from this directory instead of downloading them
    #[arg(long, value_name = "DIR", env = "EPICAST_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to the population CSV
    #[arg(long, value_name = "PATH", env = "EPICAST_POPULATION")]
    population: Option<PathBuf>,

    /// Snapshot refresh interval in seconds
    #[arg(long, value_name = "N", env = "EPICAST_REFRESH_SECS")]
    refresh_secs: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    log_json: bool,
}

impl CliArgs {
    /// Apply command-line overrides on top of the file config.
    fn apply(&self, cfg: &mut DashboardConfig) {
        if let Some(addr) = &self.addr {
            cfg.server.addr = addr.clone();
        }
        if let Some(dir) = &self.data_dir {
            cfg.data.data_dir = Some(dir.clone());
        }
        if let Some(path) = &self.population {
            cfg.data.population_path = path.clone();
        }
        if let Some(secs) = self.refresh_secs {
            cfg.data.refresh_interval_secs = secs;
        }
    }
}

// ============================================================================
// Task Supervision
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TaskName {
    HttpServer,
    Refresher,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::HttpServer => write!(f, "HttpServer"),
            TaskName::Refresher => write!(f, "Refresher"),
        }
    }
}

/// Spawn the HTTP server task into the JoinSet.
fn spawn_http_server(
    task_set: &mut JoinSet<Result<TaskName>>,
    listener: tokio::net::TcpListener,
    app: Router,
    cancel_token: CancellationToken,
) {
    task_set.spawn(async move {
        info!("[HttpServer] Task starting");

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                cancel_token.cancelled().await;
                info!("[HttpServer] Received shutdown signal");
            })
            .await;

        match result {
            Ok(()) => {
                info!("[HttpServer] Graceful shutdown complete");
                Ok(TaskName::HttpServer)
            }
            Err(e) => {
                error!("[HttpServer] Server error: {}", e);
                Err(anyhow::anyhow!("HTTP server error: {}", e))
            }
        }
    });
}

/// Spawn the snapshot refresher task into the JoinSet.
fn spawn_refresher(
    task_set: &mut JoinSet<Result<TaskName>>,
    store: Arc<SnapshotStore>,
    source: Arc<dyn DataSource>,
    population: Arc<epicast::PopulationTable>,
    cfg: &DashboardConfig,
    cancel_token: CancellationToken,
) {
    let options = AlignmentOptions {
        day_zero_threshold: cfg.data.day_zero_threshold,
        min_observations: cfg.data.min_observations,
    };
    let interval = Duration::from_secs(cfg.data.refresh_interval_secs);

    task_set.spawn(async move {
        run_refresher(store, source, population, options, interval, cancel_token)
            .await
            .context("Refresher failed")?;
        Ok(TaskName::Refresher)
    });
}

/// Run the supervisor loop: monitor tasks, cancel on failure.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    info!("Supervisor: all tasks spawned, monitoring");

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("Supervisor: shutdown signal received");
                break;
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(task_name))) => {
                        info!("Supervisor: task {} completed normally", task_name);
                    }
                    Some(Ok(Err(e))) => {
                        error!("Supervisor: task failed with error: {:#}", e);
                        cancel_token.cancel();
                        return Err(e);
                    }
                    Some(Err(e)) => {
                        error!("Supervisor: task panicked: {}", e);
                        cancel_token.cancel();
                        return Err(anyhow::anyhow!("Task panicked: {}", e));
                    }
                    None => {
                        info!("Supervisor: all tasks completed");
                        break;
                    }
                }
            }
        }
    }

    // Let the remaining tasks observe cancellation and drain.
    while let Some(result) = task_set.join_next().await {
        match result {
            Ok(Ok(task_name)) => info!("Supervisor: task {} stopped", task_name),
            Ok(Err(e)) => error!("Supervisor: task failed during shutdown: {:#}", e),
            Err(e) => error!("Supervisor: task panicked during shutdown: {}", e),
        }
    }

    Ok(())
}

// ============================================================================
// Startup
// ============================================================================

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

fn load_config(args: &CliArgs) -> Result<DashboardConfig> {
    let mut cfg = match &args.config {
        Some(path) => DashboardConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => DashboardConfig::load(),
    };
    args.apply(&mut cfg);
    cfg.validate().context("Invalid configuration")?;
    Ok(cfg)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.log_json);

    config::init(load_config(&args)?);
    let cfg = config::get();

    info!("Starting EPICAST v{}", env!("CARGO_PKG_VERSION"));
    info!(
        threshold = cfg.data.day_zero_threshold,
        min_observations = cfg.data.min_observations,
        refresh_secs = cfg.data.refresh_interval_secs,
        "Alignment and refresh settings"
    );

    let population = Arc::new(
        load_population(&cfg.data.population_path).with_context(|| {
            format!(
                "Failed to load population table from {}",
                cfg.data.population_path.display()
            )
        })?,
    );

    let source: Arc<dyn DataSource> = Arc::from(
        acquisition::from_config(&cfg.data).context("Failed to build data source")?,
    );
    info!(source = source.source_name(), "Data source ready");

    let store = Arc::new(SnapshotStore::new());
    let app = create_app(DashboardState::new(Arc::clone(&store), cfg));

    let server_addr: SocketAddr = cfg
        .server
        .addr
        .parse()
        .with_context(|| format!("Invalid server address {}", cfg.server.addr))?;
    let listener = tokio::net::TcpListener::bind(server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;
    info!("HTTP API listening on http://{}/api/v2", server_addr);

    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown");
        shutdown_token.cancel();
    });

    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();
    spawn_http_server(&mut task_set, listener, app, cancel_token.clone());
    spawn_refresher(
        &mut task_set,
        store,
        source,
        population,
        cfg,
        cancel_token.clone(),
    );

    run_supervisor(&mut task_set, cancel_token).await?;
    info!("EPICAST stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_replace_file_values() {
        let args = CliArgs::parse_from([
            "epicast",
            "--addr",
            "127.0.0.1:9999",
            "--data-dir",
            "/srv/data",
            "--refresh-secs",
            "120",
        ]);
        let mut cfg = DashboardConfig::default();
        args.apply(&mut cfg);
        assert_eq!(cfg.server.addr, "127.0.0.1:9999");
        assert_eq!(cfg.data.data_dir, Some(PathBuf::from("/srv/data")));
        assert_eq!(cfg.data.refresh_interval_secs, 120);
        assert_eq!(cfg.data.population_path, DashboardConfig::default().data.population_path);
    }

    #[test]
    fn cli_parses_log_json_flag() {
        let args = CliArgs::parse_from(["epicast", "--log-json"]);
        assert!(args.log_json);
        assert!(args.config.is_none());
    }
}
