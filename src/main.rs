//! Well Closure Optimizer CLI
//!
//! # Usage
//!
//! ```bash
//! # Cheapest wells to close for 150 m³/d over 5 days, Pilar field only
//! well-closure optimize --wells wells.csv --target 150 --field Pilar
//!
//! # Everything except Pilar, protecting two wells, JSON output
//! well-closure optimize --wells wells.csv --target 80 --except-field Pilar \
//!     --protect PLR-3 --protect FUR-1 --json
//!
//! # List producing wells
//! well-closure wells --wells wells.csv
//!
//! # Serve the HTTP API
//! well-closure serve --wells wells.csv --addr 0.0.0.0:8080
//! ```
//!
//! # Environment Variables
//!
//! - `WELL_CLOSURE_CONFIG`: Path to the TOML config file
//! - `WELL_CLOSURE_SERVER_ADDR`: Override `server.addr`
//! - `WELL_CLOSURE_CORS_ORIGINS`: Comma-separated allowed CORS origins
//! - `RUST_LOG`: Logging level (default: info)

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use well_closure::api::{create_app, ApiState};
use well_closure::config::ClosureConfig;
use well_closure::loader::{ColumnAliases, WellTable};
use well_closure::optimization::monitor::{
    CompositeMonitor, InterruptMonitor, LogMonitor, ProgressMonitor, TimeLimitMonitor,
};
use well_closure::optimization::ClosureOptimizer;
use well_closure::report::{self, ReportHeader};
use well_closure::types::{ClosureRequest, FieldFilter, SearchProgress};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "well-closure")]
#[command(about = "Minimum-loss well closure planning for water reduction targets")]
#[command(version)]
struct CliArgs {
    /// Config file (default: $WELL_CLOSURE_CONFIG, then ./closure_config.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

/// Field selection shared by the subcommands.
#[derive(clap::Args, Debug, Clone, Default)]
struct FieldArgs {
    /// Only wells in this field
    #[arg(long, conflicts_with = "except_field")]
    field: Option<String>,

    /// Every well outside this field
    #[arg(long)]
    except_field: Option<String>,
}

impl FieldArgs {
    fn filter(&self) -> FieldFilter {
        FieldFilter::from_options(self.field.as_deref(), self.except_field.as_deref())
    }
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Find the cheapest set of wells whose closure reaches the target flow
    Optimize {
        /// Well table (CSV); defaults to `data.path` from the config
        #[arg(long, value_name = "FILE")]
        wells: Option<PathBuf>,

        /// Water flow to shut in (m³/d)
        #[arg(long)]
        target: f64,

        /// Shutdown duration in days (default: search.default_horizon_days)
        #[arg(long)]
        days: Option<u32>,

        /// Largest number of wells closed together (default: search.default_max_subset_size)
        #[arg(long)]
        max_wells: Option<usize>,

        #[command(flatten)]
        field: FieldArgs,

        /// Protected well that must not be closed (repeatable or comma-separated)
        #[arg(long, value_delimiter = ',')]
        protect: Vec<String>,

        /// Search only the highest-flow wells with a tighter cap (not guaranteed minimal)
        #[arg(long)]
        approximate: bool,

        /// Stop after this many seconds and report the best plan so far
        #[arg(long, value_name = "SECS")]
        time_limit: Option<u64>,

        /// Print the full search outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List producing wells
    Wells {
        /// Well table (CSV); defaults to `data.path` from the config
        #[arg(long, value_name = "FILE")]
        wells: Option<PathBuf>,

        #[command(flatten)]
        field: FieldArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the HTTP API
    Serve {
        /// Override the server address (default: server.addr)
        #[arg(short, long)]
        addr: Option<String>,

        /// Well table (CSV) served by `/api/v1/wells` and table-backed optimize requests
        #[arg(long, value_name = "FILE")]
        wells: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config,
}

// ============================================================================
// Helpers
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<ClosureConfig> {
    match path {
        Some(p) => ClosureConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(ClosureConfig::load()),
    }
}

fn load_table(flag: Option<&Path>, config: &ClosureConfig) -> Result<WellTable> {
    let path = flag
        .or_else(|| config.data.path())
        .context("No well table given: pass --wells or set data.path in the config")?;
    WellTable::load_with(path, &ColumnAliases::from_config(&config.data))
        .with_context(|| format!("Failed to load well table {}", path.display()))
}

fn print_progress(progress: SearchProgress) {
    eprint!(
        "\rSearching... {:>5.1}% ({}/{} combinations)",
        progress.fraction() * 100.0,
        progress.evaluated,
        progress.total
    );
}

/// Monitors for a CLI search. The progress line and `LogMonitor` both write
/// to stderr, so the log lines are only installed when the progress line is
/// off.
fn cli_monitor(
    interrupted: &AtomicBool,
    time_limit: Option<Duration>,
    progress_step: Option<f64>,
) -> CompositeMonitor<'_> {
    let mut monitor = CompositeMonitor::new().with(InterruptMonitor::new(interrupted));
    if let Some(limit) = time_limit {
        monitor.add_monitor(TimeLimitMonitor::new(limit));
    }
    match progress_step {
        Some(step) => monitor.add_monitor(ProgressMonitor::new(step, print_progress)),
        None => monitor.add_monitor(LogMonitor::default()),
    }
    monitor
}

// ============================================================================
// Subcommands
// ============================================================================

#[allow(clippy::too_many_arguments)]
async fn run_optimize(
    config: &ClosureConfig,
    wells: Option<&Path>,
    target: f64,
    days: Option<u32>,
    max_wells: Option<usize>,
    filter: FieldFilter,
    protect: Vec<String>,
    approximate: bool,
    time_limit: Option<u64>,
    json: bool,
) -> Result<()> {
    let table = load_table(wells, config)?;
    let candidates = table.select(&filter);
    let dropped = candidates.len() - candidates.producing().len();
    if dropped > 0 {
        warn!(wells = dropped, "Skipping wells with zero or negative water flow");
    }
    let candidates = candidates.producing().into_wells();

    let protected: BTreeSet<String> = protect
        .into_iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .collect();
    for id in &protected {
        if !candidates.iter().any(|w| &w.id == id) {
            warn!(well = %id, field = %filter, "Protected well not among the candidates");
        }
    }

    let horizon_days = days.unwrap_or(config.search.default_horizon_days);
    let max_subset_size = max_wells.unwrap_or(config.search.default_max_subset_size);
    let mut request = ClosureRequest::new(candidates, target, horizon_days, max_subset_size)
        .exclude(protected);
    if approximate {
        request = request.with_approximation(config.approximation.policy());
    }

    let time_limit = match time_limit {
        Some(0) => None,
        Some(secs) => Some(Duration::from_secs(secs)),
        None => config.search.time_limit(),
    };
    let progress_step = config.search.progress_step;

    // Ctrl+C stops the search and reports the best plan found so far
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, stopping search...");
            flag.store(true, Ordering::Relaxed);
        }
    });

    let (request, outcome) = tokio::task::spawn_blocking(move || {
        let progress_step = (!json).then_some(progress_step);
        let mut monitor = cli_monitor(&interrupted, time_limit, progress_step);
        let outcome = ClosureOptimizer::search(&request, &mut monitor);
        if !json {
            eprintln!();
        }
        outcome.map(|outcome| (request, outcome))
    })
    .await
    .context("Closure search worker failed")??;
    ctrl_c.abort();

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        let header = ReportHeader {
            field: &filter,
            target_flow_m3_d: request.target_flow_m3_d,
            horizon_days: request.horizon_days,
        };
        println!("{}", report::render_outcome(&header, &outcome));
    }
    Ok(())
}

fn run_wells(config: &ClosureConfig, wells: Option<&Path>, filter: &FieldFilter, json: bool) -> Result<()> {
    let table = load_table(wells, config)?;
    let selected = table.select(filter).producing();

    if json {
        println!("{}", serde_json::to_string_pretty(selected.wells())?);
        return Ok(());
    }

    println!("{:<16} {:<12} {:>16} {:>16}", "WELL", "FIELD", "FLOW", "PROFIT/D");
    for well in selected.wells() {
        println!(
            "{:<16} {:<12} {:>16} {:>16}",
            well.id,
            well.field.as_deref().unwrap_or("-"),
            report::format_flow(well.flow_m3_d),
            report::format_usd(well.profit_usd_d)
        );
    }
    println!("\n{} producing wells ({})", selected.len(), filter);
    Ok(())
}

async fn run_serve(config: ClosureConfig, addr: Option<String>, wells: Option<&Path>) -> Result<()> {
    let server_addr = addr.unwrap_or_else(|| config.server_addr());

    let mut state = ApiState::new(config.clone());
    if wells.is_some() || config.data.path().is_some() {
        state = state.with_table(load_table(wells, &config)?);
    } else {
        info!("No well table configured; optimize requests must send wells inline");
    }
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&server_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", server_addr))?;
    info!("HTTP server listening on {}", server_addr);

    // Graceful shutdown via Ctrl+C
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            cancel_token.cancelled().await;
        })
        .await
        .context("HTTP server error")?;

    info!("Graceful shutdown complete");
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        SubCommand::Optimize {
            wells,
            target,
            days,
            max_wells,
            field,
            protect,
            approximate,
            time_limit,
            json,
        } => {
            run_optimize(
                &config,
                wells.as_deref(),
                target,
                days,
                max_wells,
                field.filter(),
                protect,
                approximate,
                time_limit,
                json,
            )
            .await
        }
        SubCommand::Wells { wells, field, json } => {
            run_wells(&config, wells.as_deref(), &field.filter(), json)
        }
        SubCommand::Serve { addr, wells } => run_serve(config, addr, wells.as_deref()).await,
        SubCommand::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}
