//! Ledger normalizer
//!
//! Merges the four expense collections of a state snapshot into one ledger of
//! debit records. Each collection is wrapped in an [`ExpenseSource`] variant
//! which owns its category rule; every variant then goes through the same
//! [`ExpenseSource::normalize`] step so the fallback rules live in one place.
//!
//! Source collections are only borrowed. Normalizing the same snapshot twice
//! yields identical ledgers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::{debug, warn};

use crate::models::{
    sum_amounts, whole_units, Amount, AppState, ArchivedTransaction, Budget, BudgetEntry,
    DailyExpense, FundEntry, IncomeEntry, LedgerEntry, SourceKind, TransactionType, DAILY,
    GENERAL_EXPENSE, UNCATEGORIZED,
};

/// A raw record together with the collection it came from
#[derive(Debug, Clone, Copy)]
pub enum ExpenseSource<'a> {
    /// Archived transaction; keeps its own category
    Archive(&'a ArchivedTransaction),
    /// General fund debit; always "general expense"
    Fund(&'a FundEntry),
    /// Budget history entry; retagged with the budget's name
    Budget {
        budget: &'a Budget,
        entry: &'a BudgetEntry,
    },
    /// Daily expense; own category, else "daily"
    Daily(&'a DailyExpense),
}

impl<'a> ExpenseSource<'a> {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Archive(_) => SourceKind::Archive,
            Self::Fund(_) => SourceKind::Fund,
            Self::Budget { .. } => SourceKind::Budget,
            Self::Daily(_) => SourceKind::Daily,
        }
    }

    /// Whether this record represents spend
    ///
    /// Budget history counts as spend regardless of any stray type field.
    pub fn is_spend(&self) -> bool {
        match self {
            Self::Archive(tx) => tx.tx_type == Some(TransactionType::Debit),
            Self::Fund(entry) => entry.tx_type == Some(TransactionType::Debit),
            Self::Budget { .. } | Self::Daily(_) => true,
        }
    }

    /// Category label before the empty-label fallback
    fn category(&self) -> &'a str {
        match *self {
            Self::Archive(tx) => tx.category.as_deref().unwrap_or(UNCATEGORIZED),
            Self::Fund(_) => GENERAL_EXPENSE,
            Self::Budget { budget, .. } => &budget.name,
            Self::Daily(expense) => expense
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(DAILY),
        }
    }

    fn raw_date(&self) -> &'a str {
        match *self {
            Self::Archive(tx) => &tx.date,
            Self::Fund(entry) => &entry.date,
            Self::Budget { entry, .. } => &entry.date,
            Self::Daily(expense) => &expense.date,
        }
    }

    fn raw_amount(&self) -> Option<f64> {
        match *self {
            Self::Archive(tx) => tx.amount,
            Self::Fund(entry) => entry.amount,
            Self::Budget { entry, .. } => entry.amount,
            Self::Daily(expense) => expense.amount,
        }
    }

    fn description(&self) -> Option<&'a str> {
        match *self {
            Self::Archive(tx) => tx.description.as_deref(),
            Self::Fund(entry) => entry.description.as_deref(),
            Self::Budget { entry, .. } => entry.description.as_deref(),
            Self::Daily(expense) => expense.description.as_deref(),
        }
    }

    /// Turn this raw record into a ledger entry
    ///
    /// Returns `None` for records that are not spend, or whose timestamp
    /// cannot be parsed (they cannot be placed in any month).
    pub fn normalize(&self) -> Option<LedgerEntry> {
        if !self.is_spend() {
            return None;
        }

        let Some(timestamp) = parse_timestamp(self.raw_date()) else {
            warn!(
                source = self.kind().as_str(),
                date = self.raw_date(),
                "Skipping record with invalid timestamp"
            );
            return None;
        };

        let category = match self.category().trim() {
            "" => UNCATEGORIZED.to_string(),
            c => c.to_string(),
        };

        Some(LedgerEntry {
            timestamp,
            amount: whole_units(self.raw_amount()),
            category,
            tx_type: TransactionType::Debit,
            description: self.description().unwrap_or_default().to_string(),
            source: self.kind(),
        })
    }
}

/// Iterate every expense-bearing record of a snapshot, in collection order
pub fn sources(state: &AppState) -> impl Iterator<Item = ExpenseSource<'_>> {
    let archives = state
        .transaction_archives
        .iter()
        .flat_map(|batch| batch.transactions.iter().map(ExpenseSource::Archive));
    let fund = state.fund_history.iter().map(ExpenseSource::Fund);
    let budgets = state.budgets.iter().flat_map(|budget| {
        budget
            .history
            .iter()
            .map(move |entry| ExpenseSource::Budget { budget, entry })
    });
    let daily = state.daily_expenses.iter().map(ExpenseSource::Daily);

    archives.chain(fund).chain(budgets).chain(daily)
}

/// The unified expense ledger
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    entries: Vec<LedgerEntry>,
}

impl Ledger {
    /// Normalize a state snapshot into a ledger
    pub fn normalize(state: &AppState) -> Self {
        let entries: Vec<LedgerEntry> = sources(state).filter_map(|s| s.normalize()).collect();
        debug!(entries = entries.len(), "Ledger normalized");
        Self { entries }
    }

    /// Build a ledger from already-normalized entries
    pub fn from_entries(entries: Vec<LedgerEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every entry
    pub fn total(&self) -> Amount {
        sum_amounts(self.entries.iter().map(|e| e.amount))
    }
}

/// Credit-typed fund entries (the income signal)
pub fn fund_income(state: &AppState) -> Vec<IncomeEntry> {
    state
        .fund_history
        .iter()
        .filter(|entry| entry.tx_type == Some(TransactionType::Credit))
        .filter_map(|entry| {
            let timestamp = parse_timestamp(&entry.date).or_else(|| {
                warn!(date = %entry.date, "Skipping income entry with invalid timestamp");
                None
            })?;
            Some(IncomeEntry {
                timestamp,
                amount: whole_units(entry.amount),
                description: entry.description.clone().unwrap_or_default(),
            })
        })
        .collect()
}

/// Parse a raw timestamp as UTC
///
/// Accepts RFC 3339 (any offset, converted to UTC), a naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` (taken as UTC) or a bare `YYYY-MM-DD`
/// (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArchiveBatch, MAX_AMOUNT};
    use chrono::TimeZone;

    fn sample_state() -> AppState {
        AppState {
            transaction_archives: vec![ArchiveBatch {
                name: Some("February".to_string()),
                archived_at: Some("2026-03-01".to_string()),
                transactions: vec![
                    ArchivedTransaction {
                        date: "2026-02-10".to_string(),
                        amount: Some(45000.0),
                        category: Some("Food".to_string()),
                        tx_type: Some(TransactionType::Debit),
                        description: Some("Groceries".to_string()),
                    },
                    ArchivedTransaction {
                        date: "2026-02-11".to_string(),
                        amount: Some(900000.0),
                        category: Some("Salary".to_string()),
                        tx_type: Some(TransactionType::Credit),
                        description: None,
                    },
                    ArchivedTransaction {
                        date: "2026-02-12".to_string(),
                        amount: Some(3000.0),
                        category: None,
                        tx_type: Some(TransactionType::Debit),
                        description: None,
                    },
                ],
            }],
            fund_history: vec![
                FundEntry {
                    date: "2026-03-01".to_string(),
                    amount: Some(1_000_000.0),
                    tx_type: Some(TransactionType::Credit),
                    description: Some("Salary".to_string()),
                },
                FundEntry {
                    date: "2026-03-02".to_string(),
                    amount: Some(20000.0),
                    tx_type: Some(TransactionType::Debit),
                    description: Some("Parking".to_string()),
                },
            ],
            budgets: vec![Budget {
                name: "Transport".to_string(),
                total_budget: Some(200000.0),
                history: vec![BudgetEntry {
                    date: "2026-03-03".to_string(),
                    amount: Some(15000.0),
                    tx_type: Some(TransactionType::Credit),
                    description: Some("Bus card".to_string()),
                }],
            }],
            daily_expenses: vec![
                DailyExpense {
                    date: "2026-03-04T09:30:00Z".to_string(),
                    amount: Some(8000.0),
                    category: Some("Coffee".to_string()),
                    description: None,
                },
                DailyExpense {
                    date: "2026-03-05".to_string(),
                    amount: Some(5000.0),
                    category: Some("".to_string()),
                    description: None,
                },
            ],
        }
    }

    #[test]
    fn test_normalize_merges_all_sources() {
        let ledger = Ledger::normalize(&sample_state());

        // archive: 2 debits, fund: 1 debit, budget: 1, daily: 2
        assert_eq!(ledger.len(), 6);
        assert!(ledger.entries().iter().all(|e| e.is_debit()));
        assert_eq!(ledger.total(), 45000 + 3000 + 20000 + 15000 + 8000 + 5000);
    }

    #[test]
    fn test_category_resolution_per_source() {
        let ledger = Ledger::normalize(&sample_state());
        let categories: Vec<(&str, SourceKind)> = ledger
            .entries()
            .iter()
            .map(|e| (e.category.as_str(), e.source))
            .collect();

        assert_eq!(
            categories,
            vec![
                ("Food", SourceKind::Archive),
                (UNCATEGORIZED, SourceKind::Archive),
                (GENERAL_EXPENSE, SourceKind::Fund),
                ("Transport", SourceKind::Budget),
                ("Coffee", SourceKind::Daily),
                (DAILY, SourceKind::Daily),
            ]
        );
    }

    #[test]
    fn test_budget_history_always_spend() {
        let state = sample_state();
        let budget = &state.budgets[0];
        let source = ExpenseSource::Budget {
            budget,
            entry: &budget.history[0],
        };
        // The entry says "credit" but budget history is spend
        assert!(source.is_spend());
        assert_eq!(source.normalize().unwrap().tx_type, TransactionType::Debit);
    }

    #[test]
    fn test_invalid_timestamp_skipped() {
        let mut state = AppState::default();
        state.daily_expenses.push(DailyExpense {
            date: "not a date".to_string(),
            amount: Some(100.0),
            category: None,
            description: None,
        });
        state.daily_expenses.push(DailyExpense {
            date: "2026-03-05".to_string(),
            amount: Some(100.0),
            category: None,
            description: None,
        });

        let ledger = Ledger::normalize(&state);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_anomalous_amounts_recovered() {
        let mut state = AppState::default();
        for amount in [Some(f64::NAN), Some(-1200.0), None] {
            state.daily_expenses.push(DailyExpense {
                date: "2026-03-05".to_string(),
                amount,
                category: Some("Misc".to_string()),
                description: None,
            });
        }

        let amounts: Vec<i64> = Ledger::normalize(&state)
            .entries()
            .iter()
            .map(|e| e.amount)
            .collect();
        assert_eq!(amounts, vec![0, 1200, 0]);
    }

    #[test]
    fn test_huge_amounts_clamped_and_total_saturates() {
        let mut state = AppState::default();
        for _ in 0..2 {
            state.daily_expenses.push(DailyExpense {
                date: "2026-03-05".to_string(),
                amount: Some(9e18),
                category: Some("Misc".to_string()),
                description: None,
            });
        }

        let ledger = Ledger::normalize(&state);
        assert!(ledger.entries().iter().all(|e| e.amount == MAX_AMOUNT));
        assert_eq!(ledger.total(), 2 * MAX_AMOUNT);
    }

    #[test]
    fn test_whitespace_category_falls_back() {
        let tx = ArchivedTransaction {
            date: "2026-03-05".to_string(),
            amount: Some(10.0),
            category: Some("   ".to_string()),
            tx_type: Some(TransactionType::Debit),
            description: None,
        };
        let entry = ExpenseSource::Archive(&tx).normalize().unwrap();
        assert_eq!(entry.category, UNCATEGORIZED);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let state = sample_state();
        let first = Ledger::normalize(&state);
        let second = Ledger::normalize(&state);
        assert_eq!(first, second);
        // Source collections untouched
        assert_eq!(state, sample_state());
    }

    #[test]
    fn test_fund_income() {
        let income = fund_income(&sample_state());
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].amount, 1_000_000);
        assert_eq!(income[0].description, "Salary");
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(parse_timestamp("2026-03-01"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-01T00:00:00Z"), Some(expected));
        assert_eq!(parse_timestamp("2026-03-01T00:00:00.000"), Some(expected));
        // Offsets are converted to UTC, which can move the date
        assert_eq!(
            parse_timestamp("2026-03-01T01:00:00+02:00"),
            Some(Utc.with_ymd_and_hms(2026, 2, 28, 23, 0, 0).unwrap())
        );
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2026-13-01"), None);
    }
}
