//! Tradescope - headless trading dashboard
//!
//! Runs the dashboard session without a UI. Every applied refresh and
//! analysis prints a snapshot to stdout; logs go to stderr.
//!
//! # Usage
//! ```sh
//! cargo run -- --symbol TSLA --timeframe 15m --analyze
//! SIMULATION_SEED=7 cargo run -- --format summary --follow
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::str::FromStr;
use tokio::sync::broadcast::error::RecvError;
use tracing::{Level, info, warn};
use tracing_subscriber::prelude::*;
use tradescope::application::agent::{DashboardAgent, DashboardEvent, DashboardHandle};
use tradescope::config::Config;
use tradescope::domain::market::symbol::SymbolCatalog;
use tradescope::domain::market::timeframe::Timeframe;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// Full snapshot as one JSON document per line
    Json,
    /// One status line per snapshot
    Summary,
}

#[derive(Parser)]
#[command(author, version, about = "Synthetic market dashboard with a weighted signal ensemble", long_about = None)]
struct Cli {
    /// Symbol to display (overrides DEFAULT_SYMBOL)
    #[arg(short, long)]
    symbol: Option<String>,

    /// Timeframe code: 1m, 5m, 15m, 1h, 4h, 1d (overrides DEFAULT_TIMEFRAME)
    #[arg(short, long)]
    timeframe: Option<String>,

    /// Seed for reproducible output (overrides SIMULATION_SEED)
    #[arg(long)]
    seed: Option<u64>,

    /// Run an analysis once the first dataset is loaded
    #[arg(short, long)]
    analyze: bool,

    /// Number of refreshes to print before exiting
    #[arg(short, long, default_value = "1")]
    refreshes: usize,

    /// Keep running until Ctrl+C
    #[arg(long)]
    follow: bool,

    /// Skip the artificial fetch and analysis delays
    #[arg(long)]
    no_latency: bool,

    #[arg(long, value_enum, default_value = "json")]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logs on stderr, snapshots on stdout
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with(stderr_layer)
        .init();

    let cli = Cli::parse();
    let config = apply_overrides(Config::from_env()?, &cli)?;

    info!(
        "Tradescope {} starting: symbol={}, timeframe={}, seed={:?}",
        env!("CARGO_PKG_VERSION"),
        config.session.default_symbol.code,
        config.session.default_timeframe,
        config.simulation.seed
    );

    let (agent, handle) =
        DashboardAgent::from_config(&config).context("Failed to build dashboard agent")?;
    let mut events = handle.subscribe();
    let task = tokio::spawn(agent.run());

    let mut refreshes = 0usize;
    let mut analysis_pending = cli.analyze;

    loop {
        let event = tokio::select! {
            event = events.recv() => event,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting...");
                break;
            }
        };

        match event {
            Ok(DashboardEvent::DatasetRefreshed { .. }) => {
                refreshes += 1;
                print_snapshot(&handle, cli.format).await?;
                if analysis_pending && refreshes == 1 {
                    handle.run_analysis().await?;
                }
            }
            Ok(DashboardEvent::AnalysisCompleted { .. }) => {
                analysis_pending = false;
                print_snapshot(&handle, cli.format).await?;
            }
            Ok(DashboardEvent::CommandRejected { error }) => {
                warn!(%error, "Command rejected");
                if error.is_recoverable() {
                    analysis_pending = false;
                } else {
                    break;
                }
            }
            Ok(other) => info!(event = ?other, "Dashboard event"),
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event stream lagged"),
            Err(RecvError::Closed) => break,
        }

        if !cli.follow && refreshes >= cli.refreshes && !analysis_pending {
            break;
        }
    }

    // Agent may already be gone after a fatal error
    handle.shutdown().await.ok();
    task.await.context("Dashboard agent task failed")?;
    Ok(())
}

fn apply_overrides(mut config: Config, cli: &Cli) -> Result<Config> {
    if let Some(code) = &cli.symbol {
        config.session.default_symbol =
            SymbolCatalog::lookup(code).context("Invalid --symbol")?;
    }
    if let Some(code) = &cli.timeframe {
        config.session.default_timeframe =
            Timeframe::from_str(code).context("Invalid --timeframe")?;
    }
    if cli.seed.is_some() {
        config.simulation.seed = cli.seed;
    }
    if cli.no_latency {
        config.session.refresh_latency_ms = 0;
        config.session.analysis_latency_ms = 0;
        config.session.latency_jitter_ms = 0;
    }
    Ok(config)
}

async fn print_snapshot(handle: &DashboardHandle, format: OutputFormat) -> Result<()> {
    let snapshot = handle.snapshot().await;
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string(&snapshot).context("Failed to serialize snapshot")?;
            println!("{json}");
        }
        OutputFormat::Summary => println!("{}", snapshot.summary_line()),
    }
    Ok(())
}
