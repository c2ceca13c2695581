//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Tally - Spending dashboard for a personal finance snapshot
#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Aggregate and forecast spending from a finance state snapshot", long_about = None)]
#[command(version)]
pub struct Cli {
    /// State snapshot path
    ///
    /// Falls back to TALLY_STATE, then `state` in config.toml, then the
    /// platform data directory.
    #[arg(long, global = true)]
    pub state: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print machine-readable JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List selectable periods (most recent first)
    Periods,

    /// Show an overview of one period
    Summary {
        /// Period: all or YYYY-MM (defaults to the current month)
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Show spending by category
    Categories {
        /// Period: all or YYYY-MM
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Show the day-by-day spending series for a month
    Trend {
        /// Month: YYYY-MM
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Compare budget allocations with actual spend
    Budgets {
        /// Period: all or YYYY-MM
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Project month-end spending for the current month
    Forecast {
        /// Period: all or YYYY-MM
        #[arg(short, long)]
        period: Option<String>,
    },

    /// List the transactions behind one category
    Detail {
        /// Category name (budget names are categories too)
        #[arg(short, long)]
        category: String,

        /// Period: all or YYYY-MM
        #[arg(short, long)]
        period: Option<String>,
    },

    /// Ask the text-generation backend to comment on the dashboard
    Insights {
        /// Period: all or YYYY-MM
        #[arg(short, long)]
        period: Option<String>,

        /// Only one panel: categories, trend, budgets, forecast
        #[arg(long)]
        panel: Option<String>,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },
}
