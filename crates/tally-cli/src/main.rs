//! Tally CLI - Spending dashboard for a personal finance snapshot
//!
//! Usage:
//!   tally periods                      List selectable periods
//!   tally summary --period 2026-03     Overview of one month
//!   tally detail --category Food       Transactions behind a category
//!   tally insights                     Commentary for every panel
//!   tally serve --port 3000            Start web server

mod cli;
mod commands;


use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tally_core::{AIClient, Config};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(path) = &cli.state {
        config.state_path = Some(path.clone());
    }
    let state_path = config.state_path();
    let now = Utc::now();

    match cli.command {
        Commands::Periods => {
            let store = commands::open_store(&state_path)?;
            commands::cmd_periods(&store, now, cli.json)
        }
        Commands::Summary { period } => {
            let store = commands::open_store(&state_path)?;
            commands::cmd_summary(&store, period.as_deref(), now, cli.json)
        }
        Commands::Categories { period } => {
            let store = commands::open_store(&state_path)?;
            commands::cmd_categories(&store, period.as_deref(), now, cli.json)
        }
        Commands::Trend { period } => {
            let store = commands::open_store(&state_path)?;
            commands::cmd_trend(&store, period.as_deref(), now, cli.json)
        }
        Commands::Budgets { period } => {
            let store = commands::open_store(&state_path)?;
            commands::cmd_budgets(&store, period.as_deref(), now, cli.json)
        }
        Commands::Forecast { period } => {
            let store = commands::open_store(&state_path)?;
            commands::cmd_forecast(&store, period.as_deref(), now, cli.json)
        }
        Commands::Detail { category, period } => {
            let store = commands::open_store(&state_path)?;
            commands::cmd_detail(&store, &category, period.as_deref(), now, cli.json)
        }
        Commands::Insights { period, panel } => {
            let store = commands::open_store(&state_path)?;
            let ai = AIClient::from_config(&config.ai);
            commands::cmd_insights(
                &store,
                ai.as_ref(),
                period.as_deref(),
                panel.as_deref(),
                now,
                cli.json,
            )
            .await
        }
        Commands::Serve { port, host } => {
            commands::cmd_serve(&state_path, &config, &host, port).await
        }
    }
}
