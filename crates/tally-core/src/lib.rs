//! Tally Core Library
//!
//! Aggregation and forecasting engine for the Tally finance dashboard:
//! - Ledger normalization across archives, fund history, budgets and daily expenses
//! - Period selection (all-time or one calendar month, UTC)
//! - Category breakdown, gap-filled daily trend, budget vs actual
//! - Month-end forecast state machine
//! - Memoized dashboards keyed by snapshot fingerprint and period
//! - Pluggable text-generation backends for panel commentary

pub mod commentary;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod forecast;
pub mod ledger;
pub mod models;
pub mod period;
pub mod report;
pub mod store;

/// Test utilities including a mock text-generation server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use commentary::{
    AIClient, CommentaryBackend, CommentaryBoard, CommentaryRequest, MockBackend, OllamaBackend,
    OpenAICompatibleBackend, Panel, PanelCommentary, PanelSnapshot, Ticket,
};
pub use config::{AiConfig, Config};
pub use dashboard::{Dashboard, DashboardCache};
pub use error::{Error, Result};
pub use forecast::{ForecastState, NotApplicable, Outcome, Projection};
pub use ledger::{ExpenseSource, Ledger};
pub use models::{
    sum_amounts, Amount, AppState, IncomeEntry, LedgerEntry, SourceKind, TransactionType,
    MAX_AMOUNT,
};
pub use period::{Period, YearMonth};
pub use report::{BudgetComparison, CategoryTotal, DailyPoint};
pub use store::StateStore;
