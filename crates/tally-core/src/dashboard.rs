//! Dashboard assembly and memoization
//!
//! A [`Dashboard`] is every derived view for one snapshot and one selected
//! period. Building one is cheap but not free, so [`DashboardCache`] keeps the
//! results keyed by an explicit `(snapshot fingerprint, period, today)` value.
//! A new fingerprint or a new day drops every cached dashboard, and the cache
//! never holds more than [`MAX_CACHED_DASHBOARDS`] entries.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::forecast::{forecast, ForecastState};
use crate::models::{Amount, LedgerEntry};
use crate::period::{available_periods, default_period, filter, total_income, Period};
use crate::report::{
    budget_comparison, category_breakdown, category_detail, daily_trend, total_spent,
    BudgetComparison, CategoryTotal, DailyPoint,
};
use crate::store::StateStore;

/// All derived views for one period
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub period: Period,
    pub available_periods: Vec<Period>,
    pub total_spent: Amount,
    /// 0 for all-time
    pub total_income: Amount,
    pub categories: Vec<CategoryTotal>,
    pub trend: Vec<DailyPoint>,
    pub budgets: Vec<BudgetComparison>,
    pub forecast: ForecastState,
    pub forecast_message: Option<String>,
    /// Filtered records, kept for on-demand detail queries
    #[serde(skip)]
    entries: Vec<LedgerEntry>,
}

impl Dashboard {
    /// Build the dashboard for `period` as of `now`
    pub fn build(store: &StateStore, period: Period, now: DateTime<Utc>) -> Self {
        let ledger = store.ledger();
        let filtered = filter(ledger, period);

        let forecast = forecast(&filtered, store.income(), period, now);
        let forecast_message = forecast.message().map(str::to_string);

        Self {
            period,
            available_periods: available_periods(ledger, now.date_naive()),
            total_spent: total_spent(&filtered),
            total_income: total_income(store.income(), period),
            categories: category_breakdown(&filtered),
            trend: daily_trend(&filtered, period),
            budgets: budget_comparison(&filtered, store.budgets()),
            forecast,
            forecast_message,
            entries: filtered.into_iter().cloned().collect(),
        }
    }

    /// Build the dashboard for the default period
    pub fn build_default(store: &StateStore, now: DateTime<Utc>) -> Self {
        let periods = available_periods(store.ledger(), now.date_naive());
        Self::build(store, default_period(&periods, now.date_naive()), now)
    }

    /// Records of `category` in this period, largest first
    pub fn detail(&self, category: &str) -> Vec<LedgerEntry> {
        let refs: Vec<&LedgerEntry> = self.entries.iter().collect();
        category_detail(&refs, category)
    }

    /// Filtered records behind this dashboard
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Whether the period has any spend to chart
    pub fn has_data(&self) -> bool {
        !self.categories.is_empty()
    }
}

/// Upper bound on dashboards kept for one snapshot and day
pub const MAX_CACHED_DASHBOARDS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct CacheKey {
    period: Period,
    today: NaiveDate,
}

/// Memoized dashboards for the current snapshot
#[derive(Debug, Default)]
pub struct DashboardCache {
    fingerprint: Option<String>,
    today: Option<NaiveDate>,
    entries: HashMap<CacheKey, Arc<Dashboard>>,
    hits: u64,
    misses: u64,
}

impl DashboardCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached dashboard for `(store, period, now)`, building it on a miss
    pub fn get_or_build(
        &mut self,
        store: &StateStore,
        period: Period,
        now: DateTime<Utc>,
    ) -> Arc<Dashboard> {
        if self.fingerprint.as_deref() != Some(store.fingerprint()) {
            if self.fingerprint.is_some() {
                debug!(dropped = self.entries.len(), "Snapshot changed, clearing dashboard cache");
            }
            self.entries.clear();
            self.fingerprint = Some(store.fingerprint().to_string());
        }

        let today = now.date_naive();
        if self.today != Some(today) {
            if self.today.is_some() {
                debug!(
                    dropped = self.entries.len(),
                    %today,
                    "Day changed, clearing dashboard cache"
                );
            }
            self.entries.clear();
            self.today = Some(today);
        }

        let key = CacheKey { period, today };

        if let Some(cached) = self.entries.get(&key) {
            self.hits += 1;
            return Arc::clone(cached);
        }

        self.misses += 1;
        if self.entries.len() >= MAX_CACHED_DASHBOARDS {
            debug!(dropped = self.entries.len(), "Dashboard cache full, clearing");
            self.entries.clear();
        }
        debug!(period = %period, "Building dashboard");
        let dashboard = Arc::new(Dashboard::build(store, period, now));
        self.entries.insert(key, Arc::clone(&dashboard));
        dashboard
    }

    /// Drop every cached dashboard
    pub fn clear(&mut self) {
        self.entries.clear();
        self.fingerprint = None;
        self.today = None;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (hits, misses) since creation
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }
}
