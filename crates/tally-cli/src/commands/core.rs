//! Shared command utilities
//!
//! This module contains:
//! - `open_store` - Load the state snapshot
//! - `resolve_period` - Turn `--period` into a [`Period`]
//! - `build_dashboard` - Every derived view for one period
//! - `print_json` - `--json` output

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use tally_core::period::{available_periods, default_period};
use tally_core::{Dashboard, Period, StateStore};

/// Load the state snapshot (read-only)
pub fn open_store(path: &Path) -> Result<StateStore> {
    StateStore::load(path)
        .with_context(|| format!("Failed to read state snapshot {}", path.display()))
}

/// Resolve `--period`, falling back to the default selection
pub fn resolve_period(
    store: &StateStore,
    period: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Period> {
    match period {
        Some(raw) => raw
            .parse::<Period>()
            .with_context(|| format!("Invalid period: {}. Use all or YYYY-MM", raw)),
        None => {
            let today = now.date_naive();
            let periods = available_periods(store.ledger(), today);
            Ok(default_period(&periods, today))
        }
    }
}

pub fn build_dashboard(
    store: &StateStore,
    period: Option<&str>,
    now: DateTime<Utc>,
) -> Result<Dashboard> {
    let period = resolve_period(store, period, now)?;
    Ok(Dashboard::build(store, period, now))
}

/// Pretty-print a value as JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
