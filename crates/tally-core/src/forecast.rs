//! Month-end spending forecast
//!
//! Extrapolates spend-so-far to the end of the current month at a flat daily
//! rate and compares the projection with the month's income. Only the current
//! month can be forecast; every other selection resolves to an informational
//! state rather than an error.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Amount, IncomeEntry, LedgerEntry};
use crate::period::{total_income, Period, YearMonth};
use crate::report::total_spent;

pub const NOT_CURRENT_MONTH_MESSAGE: &str = "forecast only available for the current month";
pub const NO_INCOME_MESSAGE: &str = "add income this month to see a forecast.";
pub const ZERO_SPEND_MESSAGE: &str = "no spending recorded yet this month, keep it up!";

/// Why no projection was computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotApplicable {
    /// "All time" is selected; there is no forecast at all
    AllTime,
    /// A past (or future) month is selected
    NotCurrentMonth,
    /// Current month, but no income recorded
    NoIncome,
}

/// Whether income covers the projected spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Surplus,
    Deficit,
}

/// Numbers behind a computed forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub income: Amount,
    pub spent_so_far: Amount,
    pub days_elapsed: u32,
    pub days_in_month: u32,
    pub daily_rate: f64,
    pub projected_total: f64,
    /// income - projected_total
    pub delta: f64,
    pub outcome: Outcome,
}

impl Projection {
    /// Size of the surplus or deficit
    pub fn magnitude(&self) -> f64 {
        self.delta.abs()
    }
}

/// Result of evaluating the forecast for a period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ForecastState {
    NotApplicable { reason: NotApplicable },
    ZeroSpend { income: Amount },
    Computed(Projection),
}

impl ForecastState {
    /// Fixed informational message for states without a projection
    ///
    /// `None` for all-time (nothing to show) and for computed forecasts, whose
    /// wording is left to the commentary layer.
    pub fn message(&self) -> Option<&'static str> {
        match self {
            Self::NotApplicable {
                reason: NotApplicable::AllTime,
            } => None,
            Self::NotApplicable {
                reason: NotApplicable::NotCurrentMonth,
            } => Some(NOT_CURRENT_MONTH_MESSAGE),
            Self::NotApplicable {
                reason: NotApplicable::NoIncome,
            } => Some(NO_INCOME_MESSAGE),
            Self::ZeroSpend { .. } => Some(ZERO_SPEND_MESSAGE),
            Self::Computed(_) => None,
        }
    }

    /// Whether any forecast output exists (false only for all-time)
    pub fn is_produced(&self) -> bool {
        !matches!(
            self,
            Self::NotApplicable {
                reason: NotApplicable::AllTime
            }
        )
    }

    pub fn projection(&self) -> Option<&Projection> {
        match self {
            Self::Computed(p) => Some(p),
            _ => None,
        }
    }
}

/// Project month-end spend from a partial month
///
/// `days_elapsed` is clamped to at least 1.
pub fn project(
    income: Amount,
    spent_so_far: Amount,
    days_elapsed: u32,
    days_in_month: u32,
) -> Projection {
    let days_elapsed = days_elapsed.max(1);
    let daily_rate = spent_so_far as f64 / days_elapsed as f64;
    let projected_total = daily_rate * days_in_month as f64;
    let delta = income as f64 - projected_total;

    Projection {
        income,
        spent_so_far,
        days_elapsed,
        days_in_month,
        daily_rate,
        projected_total,
        delta,
        outcome: if delta < 0.0 {
            Outcome::Deficit
        } else {
            Outcome::Surplus
        },
    }
}

/// Evaluate the forecast for `period` as of `now`
///
/// `entries` are the ledger records already filtered to `period`. Income and
/// spend are only summed once the period is known to be the current month.
pub fn forecast(
    entries: &[&LedgerEntry],
    income: &[IncomeEntry],
    period: Period,
    now: DateTime<Utc>,
) -> ForecastState {
    let month = match period {
        Period::All => {
            return ForecastState::NotApplicable {
                reason: NotApplicable::AllTime,
            }
        }
        Period::Month(month) if month != YearMonth::of(now) => {
            return ForecastState::NotApplicable {
                reason: NotApplicable::NotCurrentMonth,
            }
        }
        Period::Month(month) => month,
    };

    let income = total_income(income, period);
    if income == 0 {
        return ForecastState::NotApplicable {
            reason: NotApplicable::NoIncome,
        };
    }

    let spent = total_spent(entries);
    if spent == 0 {
        return ForecastState::ZeroSpend { income };
    }

    let projection = project(income, spent, now.day(), month.days_in_month());
    tracing::debug!(
        period = %period,
        projected_total = projection.projected_total,
        delta = projection.delta,
        "Forecast computed"
    );
    ForecastState::Computed(projection)
}
