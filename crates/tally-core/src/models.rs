//! Data models for Tally
//!
//! Two families of types live here:
//! - the raw state snapshot, exactly as the external store hands it over
//!   (lenient: optional fields, loosely typed amounts and timestamps)
//! - the normalized ledger records the engine works on

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whole currency units. Ledger amounts are always non-negative.
pub type Amount = i64;

/// Largest amount a single record can carry (10^15 units)
///
/// Larger raw values are clamped here so that period totals stay far from
/// the `i64` range.
pub const MAX_AMOUNT: Amount = 1_000_000_000_000_000;

/// Category used when a record carries none
pub const UNCATEGORIZED: &str = "uncategorized";

/// Category attached to every general fund expense
pub const GENERAL_EXPENSE: &str = "general expense";

/// Category used for daily expenses without a category of their own
pub const DAILY: &str = "daily";

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money in (income)
    Credit,
    /// Money out (spend)
    Debit,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Credit => "credit",
            Self::Debit => "debit",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "credit" => Ok(Self::Credit),
            "debit" => Ok(Self::Debit),
            _ => Err(format!("Unknown transaction type: {} (valid: credit, debit)", s)),
        }
    }
}

// ========== State Snapshot ==========

/// Read-only snapshot of the application state
///
/// Field names follow the store's camelCase export. Any missing collection
/// deserializes as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppState {
    pub transaction_archives: Vec<ArchiveBatch>,
    pub fund_history: Vec<FundEntry>,
    pub budgets: Vec<Budget>,
    pub daily_expenses: Vec<DailyExpense>,
}

/// A batch of transactions archived together
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArchiveBatch {
    pub name: Option<String>,
    pub archived_at: Option<String>,
    pub transactions: Vec<ArchivedTransaction>,
}

/// A transaction inside an archive batch (already categorized)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArchivedTransaction {
    pub date: String,
    pub amount: Option<f64>,
    pub category: Option<String>,
    #[serde(rename = "type")]
    pub tx_type: Option<TransactionType>,
    pub description: Option<String>,
}

/// An entry in the general fund history
///
/// Debits are general expenses; credits are the income signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FundEntry {
    pub date: String,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub tx_type: Option<TransactionType>,
    pub description: Option<String>,
}

/// A named budget; its name doubles as the category of its spend
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Budget {
    pub name: String,
    pub total_budget: Option<f64>,
    pub history: Vec<BudgetEntry>,
}

impl Budget {
    /// Allocated amount in whole units
    pub fn allocated(&self) -> Amount {
        whole_units(self.total_budget)
    }
}

/// A spend entry recorded against a budget
///
/// The `type` field is accepted but ignored: budget history is always spend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BudgetEntry {
    pub date: String,
    pub amount: Option<f64>,
    #[serde(rename = "type")]
    pub tx_type: Option<TransactionType>,
    pub description: Option<String>,
}

/// An ad-hoc daily expense
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DailyExpense {
    pub date: String,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Convert a raw amount to non-negative whole units
///
/// Missing or non-finite amounts become 0, negative amounts are taken by
/// magnitude, fractions are rounded and anything above [`MAX_AMOUNT`] is
/// clamped to it.
pub fn whole_units(raw: Option<f64>) -> Amount {
    match raw {
        Some(v) if v.is_finite() => v.abs().round().min(MAX_AMOUNT as f64) as Amount,
        _ => 0,
    }
}

/// Saturating sum of amounts
pub fn sum_amounts<I>(amounts: I) -> Amount
where
    I: IntoIterator<Item = Amount>,
{
    amounts.into_iter().fold(0, Amount::saturating_add)
}

// ========== Ledger Models ==========

/// Which collection a ledger record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Archive,
    Fund,
    Budget,
    Daily,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::Fund => "fund",
            Self::Budget => "budget",
            Self::Daily => "daily",
        }
    }
}

/// A normalized expense record
///
/// Invariants: `category` is non-empty, `amount` is non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp: DateTime<Utc>,
    pub amount: Amount,
    pub category: String,
    #[serde(rename = "type")]
    pub tx_type: TransactionType,
    pub description: String,
    pub source: SourceKind,
}

impl LedgerEntry {
    pub fn is_debit(&self) -> bool {
        self.tx_type == TransactionType::Debit
    }
}

/// A credit from the general fund, kept apart from the expense ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeEntry {
    pub timestamp: DateTime<Utc>,
    pub amount: Amount,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_units() {
        assert_eq!(whole_units(Some(1500.0)), 1500);
        assert_eq!(whole_units(Some(-250.0)), 250);
        assert_eq!(whole_units(Some(99.6)), 100);
        assert_eq!(whole_units(Some(f64::NAN)), 0);
        assert_eq!(whole_units(Some(f64::INFINITY)), 0);
        assert_eq!(whole_units(None), 0);
    }

    #[test]
    fn test_whole_units_clamped_to_max_amount() {
        assert_eq!(whole_units(Some(9e18)), MAX_AMOUNT);
        assert_eq!(whole_units(Some(-9e18)), MAX_AMOUNT);
        assert_eq!(whole_units(Some(MAX_AMOUNT as f64)), MAX_AMOUNT);
    }

    #[test]
    fn test_sum_amounts_saturates() {
        assert_eq!(sum_amounts([]), 0);
        assert_eq!(sum_amounts([1, 2, 3]), 6);
        assert_eq!(sum_amounts([i64::MAX, 1]), i64::MAX);
    }

    #[test]
    fn test_transaction_type_parse() {
        assert_eq!("debit".parse::<TransactionType>(), Ok(TransactionType::Debit));
        assert_eq!("CREDIT".parse::<TransactionType>(), Ok(TransactionType::Credit));
        assert!("refund".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_app_state_missing_collections() {
        let state: AppState = serde_json::from_str(r#"{"budgets": []}"#).unwrap();
        assert!(state.transaction_archives.is_empty());
        assert!(state.fund_history.is_empty());
        assert!(state.daily_expenses.is_empty());
    }

    #[test]
    fn test_app_state_camel_case_fields() {
        let json = r#"{
            "budgets": [{"name": "Food", "totalBudget": 500000, "history": [
                {"date": "2026-03-02", "amount": 12000, "type": "credit"}
            ]}],
            "fundHistory": [{"date": "2026-03-01", "amount": 1000000, "type": "credit"}]
        }"#;
        let state: AppState = serde_json::from_str(json).unwrap();
        assert_eq!(state.budgets[0].allocated(), 500_000);
        assert_eq!(state.budgets[0].history.len(), 1);
        assert_eq!(state.fund_history[0].tx_type, Some(TransactionType::Credit));
    }
}
