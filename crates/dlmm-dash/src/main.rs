use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use dlmm_core::position::RemoveType;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::prelude::*;

use dlmm_dash::{distribution, Dashboard, DashConfig, Shape};

#[derive(Parser, Debug)]
#[command(name = "dlmm-dash")]
#[command(about = "DLMM portfolio, removal planning and bin series from local pool data")]
struct Args {
    /// Path to dashboard configuration file
    #[arg(short, long, default_value = "dash.toml")]
    config: PathBuf,

    /// Pool metadata file, overriding the configured one
    #[arg(long)]
    pools: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Positions, pool groups and totals for a wallet
    Portfolio {
        /// JSON array of raw position records
        #[arg(long)]
        positions: PathBuf,

        /// Unix seconds to evaluate yields at (defaults to now)
        #[arg(long)]
        as_of: Option<i64>,
    },

    /// Plan a removal over an inclusive bin range
    PlanRemoval {
        #[arg(long)]
        positions: PathBuf,

        #[arg(long, allow_hyphen_values = true)]
        start: i32,

        #[arg(long, allow_hyphen_values = true)]
        end: i32,

        #[arg(long, value_enum, default_value = "both")]
        remove_type: RemoveKind,

        /// Only consider positions in this pool
        #[arg(long)]
        pool: Option<String>,

        #[arg(long)]
        as_of: Option<i64>,
    },

    /// Liquidity distribution for a new position
    Distribution {
        #[arg(long, value_enum, default_value = "curve")]
        shape: ShapeKind,

        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        bins_left: i32,

        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        bins_right: i32,

        /// Map onto absolute bin ids around this active bin
        #[arg(long)]
        active_bin_id: Option<i32>,
    },

    /// Bin series for a pool's chart
    Bins {
        #[arg(long)]
        pool: String,

        /// JSON array of per-bin reserves; a synthetic series is used without it
        #[arg(long)]
        reserves: Option<PathBuf>,

        /// Value spread across the synthetic series
        #[arg(long, default_value = "100000")]
        tvl: f64,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RemoveKind {
    Both,
    XOnly,
    YOnly,
}

impl From<RemoveKind> for RemoveType {
    fn from(kind: RemoveKind) -> Self {
        match kind {
            RemoveKind::Both => RemoveType::Both,
            RemoveKind::XOnly => RemoveType::XOnly,
            RemoveKind::YOnly => RemoveType::YOnly,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ShapeKind {
    Curve,
    Spot,
    Single,
}

impl From<ShapeKind> for Shape {
    fn from(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Curve => Shape::Curve,
            ShapeKind::Spot => Shape::Spot,
            ShapeKind::Single => Shape::Single,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = DashConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load configuration from {}", args.config.display()))?;
    if args.verbose {
        config.log_level = "debug".to_string();
    }
    if let Some(pools) = &args.pools {
        config.data.pools_path = pools.clone();
    }

    init_logging(&config)?;
    debug!("Configuration: {:?}", config);

    match args.command {
        Command::Portfolio { positions, as_of } => {
            let dashboard = open_dashboard(config)?;
            let portfolio = dashboard.portfolio(&positions, as_of.unwrap_or_else(now))?;
            print_json(&portfolio)
        }
        Command::PlanRemoval {
            positions,
            start,
            end,
            remove_type,
            pool,
            as_of,
        } => {
            let dashboard = open_dashboard(config)?;
            let plan = dashboard.plan_removal(
                &positions,
                as_of.unwrap_or_else(now),
                start,
                end,
                remove_type.into(),
                pool.as_deref(),
            )?;
            info!(
                "Removal touches {} positions: {} x, {} y",
                plan.per_position.len(),
                plan.estimated_x,
                plan.estimated_y
            );
            print_json(&plan)
        }
        Command::Distribution {
            shape,
            bins_left,
            bins_right,
            active_bin_id,
        } => {
            let weights = distribution(shape.into(), bins_left, bins_right, active_bin_id)?;
            print_json(&weights)
        }
        Command::Bins {
            pool,
            reserves,
            tvl,
        } => {
            let dashboard = open_dashboard(config)?;
            print_json(&dashboard.bins(&pool, reserves.as_deref(), tvl)?)
        }
    }
}

fn open_dashboard(config: DashConfig) -> Result<Dashboard> {
    let pools_path = config.data.pools_path.clone();
    Dashboard::open(config)
        .with_context(|| format!("Failed to load pool data from {}", pools_path.display()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn now() -> i64 {
    Utc::now().timestamp()
}

/// Logs go to stderr so stdout carries only JSON
fn init_logging(config: &DashConfig) -> Result<()> {
    let log_level: tracing::Level = config.log_level.parse().unwrap_or(tracing::Level::INFO);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("dlmm_dash={},dlmm_core={}", log_level, log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .context("Failed to install log subscriber")?;

    Ok(())
}
