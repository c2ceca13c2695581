//! Derived views over a filtered ledger
//!
//! - Category breakdown (pie chart)
//! - Gap-filled daily trend (line chart)
//! - Budget vs actual (bar chart)
//! - Category detail (click-through list)
//!
//! All functions take the records already filtered to a period and only look
//! at debit entries.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::{sum_amounts, Amount, Budget, LedgerEntry};
use crate::period::Period;

/// Total spend for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Amount,
    /// Share of the period's total spend (0 when nothing was spent)
    pub percentage: f64,
    pub transaction_count: usize,
}

/// Spend on one day of the selected month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyPoint {
    pub day: u32,
    pub date: NaiveDate,
    pub total: Amount,
}

/// A budget joined with what was actually spent against it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub name: String,
    pub allocated: Amount,
    pub actual: Amount,
    /// allocated - actual (negative when over budget)
    pub remaining: Amount,
    /// actual as a percentage of allocated, `None` for a zero allocation
    pub percent_used: Option<f64>,
}

impl BudgetComparison {
    pub fn is_over_budget(&self) -> bool {
        self.actual > self.allocated
    }
}

fn debits<'a>(entries: &'a [&'a LedgerEntry]) -> impl Iterator<Item = &'a LedgerEntry> + 'a {
    entries.iter().copied().filter(|e| e.is_debit())
}

/// Sum of debit amounts
pub fn total_spent(entries: &[&LedgerEntry]) -> Amount {
    sum_amounts(debits(entries).map(|e| e.amount))
}

/// Spend per category, largest first
///
/// Categories with equal totals keep the order in which they first appear.
pub fn category_breakdown(entries: &[&LedgerEntry]) -> Vec<CategoryTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for entry in debits(entries) {
        let slot = *index.entry(entry.category.as_str()).or_insert_with(|| {
            totals.push(CategoryTotal {
                category: entry.category.clone(),
                total: 0,
                percentage: 0.0,
                transaction_count: 0,
            });
            totals.len() - 1
        });
        totals[slot].total = totals[slot].total.saturating_add(entry.amount);
        totals[slot].transaction_count += 1;
    }

    let grand_total = sum_amounts(totals.iter().map(|c| c.total));
    for cat in &mut totals {
        cat.percentage = if grand_total > 0 {
            (cat.total as f64 / grand_total as f64) * 100.0
        } else {
            0.0
        };
    }

    // sort_by is stable, so ties stay in first-seen order
    totals.sort_by(|a, b| b.total.cmp(&a.total));
    totals
}

/// One point per day of the selected month, zero-filled
///
/// Empty for [`Period::All`]. Days after today still appear with 0 so the
/// series always spans the whole month.
pub fn daily_trend(entries: &[&LedgerEntry], period: Period) -> Vec<DailyPoint> {
    let Some(month) = period.month() else {
        return Vec::new();
    };

    let days = month.days_in_month();
    let mut totals = vec![0 as Amount; days as usize];

    for entry in debits(entries).filter(|e| month.contains(e.timestamp)) {
        let day = entry.timestamp.day();
        let slot = &mut totals[(day - 1) as usize];
        *slot = slot.saturating_add(entry.amount);
    }

    (1..=days)
        .zip(totals)
        .filter_map(|(day, total)| {
            month.day(day).map(|date| DailyPoint { day, date, total })
        })
        .collect()
}

/// Every budget with its actual spend, in budget order
///
/// Budget names and transaction categories share one key space; a budget with
/// no matching spend reports an actual of 0.
pub fn budget_comparison(entries: &[&LedgerEntry], budgets: &[Budget]) -> Vec<BudgetComparison> {
    let mut spent: HashMap<&str, Amount> = HashMap::new();
    for entry in debits(entries) {
        let total = spent.entry(entry.category.as_str()).or_insert(0);
        *total = total.saturating_add(entry.amount);
    }

    budgets
        .iter()
        .map(|budget| {
            let allocated = budget.allocated();
            let actual = spent.get(budget.name.as_str()).copied().unwrap_or(0);
            BudgetComparison {
                name: budget.name.clone(),
                allocated,
                actual,
                remaining: allocated.saturating_sub(actual),
                percent_used: (allocated > 0)
                    .then(|| (actual as f64 / allocated as f64) * 100.0),
            }
        })
        .collect()
}

/// Records of one category, largest amount first
///
/// An unknown category yields an empty list.
pub fn category_detail(entries: &[&LedgerEntry], category: &str) -> Vec<LedgerEntry> {
    let mut matches: Vec<LedgerEntry> = debits(entries)
        .filter(|e| e.category == category)
        .cloned()
        .collect();
    matches.sort_by(|a, b| b.amount.cmp(&a.amount));
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SourceKind, TransactionType, MAX_AMOUNT};
    use crate::period::YearMonth;
    use chrono::{TimeZone, Utc};

    fn entry(day: u32, amount: i64, category: &str) -> LedgerEntry {
        LedgerEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 2, day, 10, 0, 0).unwrap(),
            amount,
            category: category.to_string(),
            tx_type: TransactionType::Debit,
            description: format!("{} on {}", category, day),
            source: SourceKind::Daily,
        }
    }

    fn budget(name: &str, total: f64) -> Budget {
        Budget {
            name: name.to_string(),
            total_budget: Some(total),
            history: vec![],
        }
    }

    fn feb() -> Period {
        Period::Month(YearMonth::new(2026, 2).unwrap())
    }

    #[test]
    fn test_category_breakdown_ranked() {
        let entries = vec![
            entry(1, 100, "Food"),
            entry(2, 500, "Rent"),
            entry(3, 250, "Food"),
            entry(4, 50, "Coffee"),
        ];
        let refs: Vec<&LedgerEntry> = entries.iter().collect();

        let breakdown = category_breakdown(&refs);
        let names: Vec<&str> = breakdown.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Food", "Coffee"]);
        assert_eq!(breakdown[1].total, 350);
        assert_eq!(breakdown[1].transaction_count, 2);
        assert!((breakdown[0].percentage - 500.0 / 900.0 * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_category_breakdown_ties_keep_first_seen() {
        let entries = vec![
            entry(1, 100, "Zeta"),
            entry(2, 100, "Alpha"),
            entry(3, 100, "Mid"),
        ];
        let refs: Vec<&LedgerEntry> = entries.iter().collect();

        let names: Vec<String> = category_breakdown(&refs)
            .into_iter()
            .map(|c| c.category)
            .collect();
        assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
    }

    #[test]
    fn test_category_breakdown_conserves_total() {
        let entries: Vec<LedgerEntry> = (1..=28)
            .map(|d| entry(d, (d as i64 * 37) % 11 * 100, ["A", "B", "C"][d as usize % 3]))
            .collect();
        let refs: Vec<&LedgerEntry> = entries.iter().collect();

        let sum: i64 = category_breakdown(&refs).iter().map(|c| c.total).sum();
        assert_eq!(sum, total_spent(&refs));
    }

    #[test]
    fn test_category_breakdown_empty() {
        assert!(category_breakdown(&[]).is_empty());
    }

    #[test]
    fn test_category_breakdown_all_zero_amounts() {
        let entries = vec![entry(1, 0, "Food")];
        let refs: Vec<&LedgerEntry> = entries.iter().collect();
        let breakdown = category_breakdown(&refs);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].percentage, 0.0);
    }

    #[test]
    fn test_credit_entries_ignored() {
        let mut credit = entry(5, 1000, "Salary");
        credit.tx_type = TransactionType::Credit;
        let entries = vec![entry(5, 10, "Food"), credit];
        let refs: Vec<&LedgerEntry> = entries.iter().collect();

        assert_eq!(total_spent(&refs), 10);
        assert_eq!(category_breakdown(&refs).len(), 1);
        assert!(category_detail(&refs, "Salary").is_empty());
    }

    #[test]
    fn test_daily_trend_gap_filled() {
        let entries = vec![entry(3, 100, "Food"), entry(3, 50, "Coffee"), entry(28, 10, "Food")];
        let refs: Vec<&LedgerEntry> = entries.iter().collect();

        let trend = daily_trend(&refs, feb());
        assert_eq!(trend.len(), 28);
        assert_eq!(trend[0].day, 1);
        assert_eq!(trend[0].total, 0);
        assert_eq!(trend[2].total, 150);
        assert_eq!(trend[27].total, 10);
        assert_eq!(trend[27].date, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert!(trend.windows(2).all(|w| w[0].day + 1 == w[1].day));
    }

    #[test]
    fn test_daily_trend_length_every_month() {
        for (year, leap_feb) in [(2024, 29), (2026, 28)] {
            for month in 1..=12 {
                let ym = YearMonth::new(year, month).unwrap();
                let trend = daily_trend(&[], Period::Month(ym));
                assert_eq!(trend.len() as u32, ym.days_in_month());
                if month == 2 {
                    assert_eq!(trend.len(), leap_feb);
                }
            }
        }
    }

    #[test]
    fn test_daily_trend_all_time_empty() {
        let entries = vec![entry(3, 100, "Food")];
        let refs: Vec<&LedgerEntry> = entries.iter().collect();
        assert!(daily_trend(&refs, Period::All).is_empty());
    }

    #[test]
    fn test_budget_comparison_left_join() {
        let entries = vec![entry(1, 300, "Food"), entry(2, 200, "Food"), entry(3, 80, "Fun")];
        let refs: Vec<&LedgerEntry> = entries.iter().collect();
        let budgets = vec![budget("Travel", 1000.0), budget("Food", 400.0)];

        let rows = budget_comparison(&refs, &budgets);
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].name, "Travel");
        assert_eq!(rows[0].actual, 0);
        assert_eq!(rows[0].remaining, 1000);

        assert_eq!(rows[1].name, "Food");
        assert_eq!(rows[1].actual, 500);
        assert_eq!(rows[1].remaining, -100);
        assert!(rows[1].is_over_budget());
        assert_eq!(rows[1].percent_used, Some(125.0));
    }

    #[test]
    fn test_huge_amounts_do_not_overflow() {
        let entries = vec![
            entry(1, i64::MAX, "Food"),
            entry(2, i64::MAX, "Food"),
            entry(2, 10, "Fun"),
        ];
        let refs: Vec<&LedgerEntry> = entries.iter().collect();

        assert_eq!(total_spent(&refs), i64::MAX);

        let breakdown = category_breakdown(&refs);
        assert_eq!(breakdown[0].category, "Food");
        assert_eq!(breakdown[0].total, i64::MAX);
        assert!(breakdown[0].percentage <= 100.0);

        let trend = daily_trend(&refs, feb());
        assert_eq!(trend[1].total, i64::MAX);

        let rows = budget_comparison(&refs, &[budget("Food", 9e18)]);
        assert_eq!(rows[0].allocated, MAX_AMOUNT);
        assert_eq!(rows[0].actual, i64::MAX);
        assert_eq!(rows[0].remaining, MAX_AMOUNT - i64::MAX);
        assert!(rows[0].is_over_budget());
    }

    #[test]
    fn test_budget_comparison_zero_allocation() {
        let rows = budget_comparison(&[], &[budget("Empty", 0.0)]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].percent_used, None);
    }

    #[test]
    fn test_category_detail_sorted_desc() {
        let entries = vec![
            entry(1, 20, "Food"),
            entry(2, 90, "Food"),
            entry(3, 500, "Rent"),
            entry(4, 45, "Food"),
        ];
        let refs: Vec<&LedgerEntry> = entries.iter().collect();

        let detail = category_detail(&refs, "Food");
        let amounts: Vec<i64> = detail.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![90, 45, 20]);
        assert!(category_detail(&refs, "Nothing").is_empty());
    }
}
