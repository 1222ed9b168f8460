//! nowcast - weather nowcasting host
//!
//! Polls a weather station CSV feed on two independent timers and logs each
//! published analysis.
//!
//! # Usage
//!
//! ```bash
//! # Poll the default local endpoint
//! cargo run --release
//!
//! # Poll a specific station
//! ./nowcast --url http://station.local/weather_data_outdoor.csv
//!
//! # Replay an exported CSV file
//! ./nowcast --csv weather_data_outdoor.csv
//!
//! # Synthetic data, one cycle each, JSON to stdout
//! ./nowcast --simulate --once
//! ```
//!
//! # Environment Variables
//!
//! - `NOWCAST_CONFIG`: Path to a TOML config file (default: ./nowcast.toml)
//! - `NOWCAST_PRIMARY_INTERVAL_SECS` / `NOWCAST_TRENDS_INTERVAL_SECS`: Interval overrides
//! - `RUST_LOG`: Logging level (default: info)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use weather_nowcast::acquisition::{FileCsvSource, HttpCsvSource, ReadingSource, SyntheticSource};
use weather_nowcast::config::{self, NowcastConfig};
use weather_nowcast::pipeline::{
    AnalysisCycle, CycleOutcome, PrimaryCycle, RefreshScheduler, SnapshotStore, TrendsCycle,
};
use weather_nowcast::types::{AnalysisSnapshot, CorrelationStat, StatisticalTrends};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "nowcast")]
#[command(about = "Short-horizon weather nowcasting over a local station feed")]
#[command(version)]
struct CliArgs {
    /// CSV endpoint to poll (overrides source.url from the config file)
    #[arg(long, env = "NOWCAST_SOURCE_URL")]
    url: Option<String>,

    /// Replay readings from a local CSV export instead of polling over HTTP
    #[arg(long, value_name = "FILE", conflicts_with = "simulate")]
    csv: Option<PathBuf>,

    /// Path to a TOML config file (default: $NOWCAST_CONFIG, then ./nowcast.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Generate synthetic readings instead of polling a station
    #[arg(long)]
    simulate: bool,

    /// Seed for --simulate (random when omitted)
    #[arg(long, requires = "simulate")]
    seed: Option<u64>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,

    /// Run one primary and one trends cycle, print the results as JSON and exit
    #[arg(long)]
    once: bool,
}

// ============================================================================
// Task Names for Supervisor Logging
// ============================================================================

#[derive(Debug, Clone, Copy)]
enum TaskName {
    PrimaryRefresh,
    TrendsRefresh,
    SnapshotLogger,
    TrendsLogger,
}

impl std::fmt::Display for TaskName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskName::PrimaryRefresh => write!(f, "PrimaryRefresh"),
            TaskName::TrendsRefresh => write!(f, "TrendsRefresh"),
            TaskName::SnapshotLogger => write!(f, "SnapshotLogger"),
            TaskName::TrendsLogger => write!(f, "TrendsLogger"),
        }
    }
}

type Slot<T> = watch::Sender<Option<Arc<T>>>;

// ============================================================================
// Setup
// ============================================================================

fn init_logging(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

/// Explicit `--config` path first, then the standard search order. A broken
/// file never stops the host: it falls back to defaults.
fn load_config(args: &CliArgs) -> NowcastConfig {
    let config = match &args.config {
        Some(path) => match NowcastConfig::load_from_file(path) {
            Ok(cfg) => {
                info!("Loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("Failed to load {}: {}. Using built-in defaults", path.display(), e);
                NowcastConfig::default()
            }
        },
        None => NowcastConfig::load(),
    };

    let mut config = config.with_env_overrides();
    if let Some(url) = &args.url {
        config.source.url.clone_from(url);
    }
    config
}

fn build_source(args: &CliArgs, config: &NowcastConfig) -> Result<Arc<dyn ReadingSource>> {
    if args.simulate {
        info!("🧪 Input: synthetic readings (seed: {:?})", args.seed);
        return Ok(Arc::new(SyntheticSource::new(args.seed)));
    }
    if let Some(path) = &args.csv {
        info!("📂 Input: CSV replay from {}", path.display());
        return Ok(Arc::new(FileCsvSource::new(path.clone())));
    }

    info!("📥 Input: {} (timeout {}s)", config.source.url, config.source.timeout_secs);
    let source = HttpCsvSource::new(&config.source.url, config.source.timeout())
        .context("Failed to build HTTP client")?;
    Ok(Arc::new(source))
}

// ============================================================================
// Publish Loggers
// ============================================================================

fn log_snapshot(snapshot: &AnalysisSnapshot) {
    let trends = &snapshot.pressure_trends;
    let stability = &snapshot.temperature_humidity;
    info!(
        "[PrimaryRefresh] Pressure short {} ({:+.3} hPa/h) | medium {} ({:+.3}) | long {} ({:+.3}) | spread {:.1}°C, stability {}, index {} | {} readings",
        trends.short_term.pattern,
        trends.short_term.rate,
        trends.medium_term.pattern,
        trends.medium_term.rate,
        trends.long_term.pattern,
        trends.long_term.rate,
        stability.dewpoint_spread,
        stability.trend,
        stability.stability_index,
        snapshot.reading_count,
    );
    for alert in &snapshot.alerts {
        warn!(
            "[PrimaryRefresh] ⚠️  {} alert: {} ({})",
            alert.severity, alert.message, alert.description
        );
    }
}

fn format_correlation(stat: Option<&CorrelationStat>) -> String {
    match stat {
        Some(s) => format!("{} (n={})", s.coefficient, s.sample_count),
        None => "unavailable".to_string(),
    }
}

fn log_trends(trends: &StatisticalTrends) {
    info!(
        "[TrendsRefresh] Pressure avg {:?} σ {:?} | Temperature avg {:?} σ {:?} | r(P,T) {} | r(P,RH) {} | {} rows",
        trends.latest_pressure_average(),
        trends.pressure.std_dev,
        trends.latest_temperature_average(),
        trends.temperature.std_dev,
        format_correlation(trends.pressure.correlation.temperature.as_ref()),
        format_correlation(trends.pressure.correlation.humidity.as_ref()),
        trends.row_count,
    );
}

/// Log every value published into `rx` until the sender is dropped or the
/// token is cancelled.
fn spawn_logger<T, F>(
    task_set: &mut JoinSet<Result<TaskName>>,
    name: TaskName,
    mut rx: watch::Receiver<Option<Arc<T>>>,
    log: F,
    cancel_token: CancellationToken,
) where
    T: Send + Sync + 'static,
    F: Fn(&T) + Send + 'static,
{
    task_set.spawn(async move {
        loop {
            tokio::select! {
                _ = cancel_token.cancelled() => return Ok(name),
                changed = rx.changed() => {
                    if changed.is_err() {
                        return Ok(name);
                    }
                    let latest = rx.borrow_and_update().clone();
                    if let Some(value) = latest {
                        log(&value);
                    }
                }
            }
        }
    });
}

// ============================================================================
// Schedulers
// ============================================================================

fn spawn_scheduler<C>(
    task_set: &mut JoinSet<Result<TaskName>>,
    name: TaskName,
    scheduler: RefreshScheduler<C, Slot<C::Output>>,
) where
    C: AnalysisCycle,
{
    task_set.spawn(async move {
        let stats = scheduler.run().await;
        info!(
            "[{}] Stopped: {} cycles, {} published, {} stale, {} failed",
            name, stats.cycles, stats.published, stats.stale, stats.failed
        );
        Ok(name)
    });
}

/// Run the supervisor loop: monitor tasks, cancel on failure.
async fn run_supervisor(
    task_set: &mut JoinSet<Result<TaskName>>,
    cancel_token: CancellationToken,
) -> Result<()> {
    info!("🔒 Supervisor: All tasks spawned, monitoring...");

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                info!("🛑 Supervisor: Shutdown signal received");
                break;
            }
            result = task_set.join_next() => {
                match result {
                    Some(Ok(Ok(task_name))) => {
                        info!("🔒 Supervisor: Task {} completed normally", task_name);
                    }
                    Some(Ok(Err(e))) => {
                        error!("🔒 Supervisor: Task failed with error: {}", e);
                        cancel_token.cancel();
                        return Err(e);
                    }
                    Some(Err(e)) => {
                        error!("🔒 Supervisor: Task panicked: {}", e);
                        cancel_token.cancel();
                        return Err(anyhow::anyhow!("Task panicked: {}", e));
                    }
                    None => {
                        info!("🔒 Supervisor: All tasks completed");
                        break;
                    }
                }
            }
        }
    }

    // Let schedulers finish their in-flight cycle bookkeeping
    while let Some(result) = task_set.join_next().await {
        if let Ok(Ok(task_name)) = result {
            info!("🔒 Supervisor: Task {} stopped", task_name);
        }
    }

    Ok(())
}

async fn run_forever(
    config: &NowcastConfig,
    source: Arc<dyn ReadingSource>,
    cancel_token: CancellationToken,
) -> Result<()> {
    let mut task_set: JoinSet<Result<TaskName>> = JoinSet::new();

    let (snapshot_tx, snapshot_rx) = watch::channel(None);
    let (trends_tx, trends_rx) = watch::channel(None);

    let primary = RefreshScheduler::new(
        PrimaryCycle::from_config(config),
        Arc::clone(&source),
        snapshot_tx,
        config.scheduler.primary_interval(),
        cancel_token.child_token(),
    )
    .with_fetch_timeout(config.source.timeout());

    let trends = RefreshScheduler::new(
        TrendsCycle::from_config(config),
        source,
        trends_tx,
        config.scheduler.trends_interval(),
        cancel_token.child_token(),
    )
    .with_fetch_timeout(config.source.timeout());

    spawn_scheduler(&mut task_set, TaskName::PrimaryRefresh, primary);
    spawn_scheduler(&mut task_set, TaskName::TrendsRefresh, trends);
    spawn_logger(
        &mut task_set,
        TaskName::SnapshotLogger,
        snapshot_rx,
        log_snapshot,
        cancel_token.clone(),
    );
    spawn_logger(
        &mut task_set,
        TaskName::TrendsLogger,
        trends_rx,
        log_trends,
        cancel_token.clone(),
    );

    run_supervisor(&mut task_set, cancel_token).await
}

/// One cycle of each kind, printed as a single JSON document.
async fn run_once(config: &NowcastConfig, source: Arc<dyn ReadingSource>) -> Result<()> {
    let snapshot_store: Arc<SnapshotStore<AnalysisSnapshot>> = Arc::new(SnapshotStore::new());
    let trends_store: Arc<SnapshotStore<StatisticalTrends>> = Arc::new(SnapshotStore::new());
    let token = CancellationToken::new();

    let mut primary = RefreshScheduler::new(
        PrimaryCycle::from_config(config),
        Arc::clone(&source),
        Arc::clone(&snapshot_store),
        config.scheduler.primary_interval(),
        token.clone(),
    )
    .with_fetch_timeout(config.source.timeout());
    let mut trends = RefreshScheduler::new(
        TrendsCycle::from_config(config),
        source,
        Arc::clone(&trends_store),
        config.scheduler.trends_interval(),
        token,
    )
    .with_fetch_timeout(config.source.timeout());

    let (primary_outcome, trends_outcome) = tokio::join!(primary.run_cycle(), trends.run_cycle());
    for (name, outcome) in [("primary", primary_outcome), ("trends", trends_outcome)] {
        if let CycleOutcome::Failed(e) = outcome {
            return Err(anyhow::Error::new(e).context(format!("{name} cycle failed")));
        }
    }

    let output = serde_json::json!({
        "analysis": snapshot_store.load().as_deref(),
        "trends": trends_store.load().as_deref(),
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(args.json_logs);

    config::init(load_config(&args));
    let config = config::get();

    let source = build_source(&args, config)?;

    if args.once {
        return run_once(config, source).await;
    }

    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    info!("  nowcast - short-horizon weather nowcasting");
    info!(
        "  Primary every {}s ({}h look-back), trends every {}s ({}h look-back)",
        config.scheduler.primary_interval_secs,
        config.source.primary_lookback_hours,
        config.scheduler.trends_interval_secs,
        config.source.trends_lookback_hours
    );
    info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("🛑 Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    run_forever(config, source, cancel_token).await?;

    info!("✓ nowcast shutdown complete");
    Ok(())
}
