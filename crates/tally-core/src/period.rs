//! Period selection
//!
//! A period is either a concrete calendar month or "all time". Month
//! membership is always decided on the UTC date of a timestamp, so a record
//! lands in the same month no matter which offset the caller runs in.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;
use crate::ledger::Ledger;
use crate::models::{sum_amounts, Amount, IncomeEntry, LedgerEntry};

/// A calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Create a year-month; `None` if the month is not 1..=12
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month a timestamp falls in (UTC)
    pub fn of(timestamp: DateTime<Utc>) -> Self {
        Self::from_date(timestamp.date_naive())
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Number of calendar days in this month
    pub fn days_in_month(&self) -> u32 {
        match self.month {
            2 => {
                if is_leap_year(self.year) {
                    29
                } else {
                    28
                }
            }
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    /// Date of the given day of this month, if it exists
    pub fn day(&self, day: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, day)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.day(1)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.day(self.days_in_month())
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        Self::of(timestamp) == *self
    }
}

/// Gregorian leap year rule
pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for YearMonth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidPeriod(format!("{} (use YYYY-MM or 'all')", s));
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        Self::new(year, month).ok_or_else(invalid)
    }
}

/// The analysis window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// Every record, regardless of date
    All,
    /// One calendar month
    Month(YearMonth),
}

impl Period {
    /// The month containing `timestamp`
    pub fn current(now: DateTime<Utc>) -> Self {
        Self::Month(YearMonth::of(now))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    pub fn month(&self) -> Option<YearMonth> {
        match self {
            Self::All => None,
            Self::Month(ym) => Some(*ym),
        }
    }

    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Month(ym) => ym.contains(timestamp),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all"),
            Self::Month(ym) => write!(f, "{}", ym),
        }
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Month)
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Periods a user can select, most recent month first
///
/// The list starts with [`Period::All`] followed by every distinct month in
/// the ledger. An empty ledger yields exactly the month of `today`.
pub fn available_periods(ledger: &Ledger, today: NaiveDate) -> Vec<Period> {
    let months: BTreeSet<YearMonth> = ledger
        .entries()
        .iter()
        .map(|e| YearMonth::of(e.timestamp))
        .collect();

    if months.is_empty() {
        return vec![Period::Month(YearMonth::from_date(today))];
    }

    std::iter::once(Period::All)
        .chain(months.into_iter().rev().map(Period::Month))
        .collect()
}

/// Period selected when the user has not chosen one
///
/// The current month if it has data (or nothing has data), otherwise the most
/// recent month that does.
pub fn default_period(periods: &[Period], today: NaiveDate) -> Period {
    let current = Period::Month(YearMonth::from_date(today));
    if periods.contains(&current) {
        return current;
    }
    periods
        .iter()
        .copied()
        .find(|p| !p.is_all())
        .unwrap_or(current)
}

/// Records in the ledger that fall inside `period`
pub fn filter(ledger: &Ledger, period: Period) -> Vec<&LedgerEntry> {
    ledger
        .entries()
        .iter()
        .filter(|e| period.contains(e.timestamp))
        .collect()
}

/// Income received inside `period`
///
/// Always 0 for [`Period::All`]: income totals only mean something for a
/// concrete month.
pub fn total_income(income: &[IncomeEntry], period: Period) -> Amount {
    match period {
        Period::All => 0,
        Period::Month(ym) => sum_amounts(
            income
                .iter()
                .filter(|i| ym.contains(i.timestamp))
                .map(|i| i.amount),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SourceKind, TransactionType};
    use chrono::TimeZone;

    fn entry(y: i32, m: u32, d: u32, amount: i64) -> LedgerEntry {
        LedgerEntry {
            timestamp: Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap(),
            amount,
            category: "Food".to_string(),
            tx_type: TransactionType::Debit,
            description: String::new(),
            source: SourceKind::Daily,
        }
    }

    fn ym(y: i32, m: u32) -> YearMonth {
        YearMonth::new(y, m).unwrap()
    }

    #[test]
    fn test_days_in_month_every_month() {
        let expected = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
        for (i, days) in expected.iter().enumerate() {
            assert_eq!(ym(2025, i as u32 + 1).days_in_month(), *days, "month {}", i + 1);
        }
    }

    #[test]
    fn test_days_in_month_february() {
        assert_eq!(ym(2024, 2).days_in_month(), 29);
        assert_eq!(ym(2025, 2).days_in_month(), 28);
        assert_eq!(ym(2000, 2).days_in_month(), 29);
        assert_eq!(ym(1900, 2).days_in_month(), 28);
    }

    #[test]
    fn test_days_in_month_matches_calendar() {
        for year in [1999, 2000, 2023, 2024, 2100] {
            for month in 1..=12 {
                let m = ym(year, month);
                let next = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
                };
                let days = (next - m.first_day().unwrap()).num_days() as u32;
                assert_eq!(m.days_in_month(), days, "{}", m);
                assert_eq!(m.last_day().unwrap().succ_opt().unwrap(), next);
            }
        }
    }

    #[test]
    fn test_year_month_parse_and_display() {
        let m: YearMonth = "2026-03".parse().unwrap();
        assert_eq!(m, ym(2026, 3));
        assert_eq!(m.to_string(), "2026-03");
        assert!("2026-13".parse::<YearMonth>().is_err());
        assert!("2026-3".parse::<YearMonth>().is_err());
        assert!("march".parse::<YearMonth>().is_err());
    }

    #[test]
    fn test_period_parse() {
        assert_eq!("all".parse::<Period>().unwrap(), Period::All);
        assert_eq!("ALL".parse::<Period>().unwrap(), Period::All);
        assert_eq!(
            "2026-02".parse::<Period>().unwrap(),
            Period::Month(ym(2026, 2))
        );
        assert!(matches!(
            "yesterday".parse::<Period>(),
            Err(Error::InvalidPeriod(_))
        ));
    }

    #[test]
    fn test_period_serde_as_string() {
        let json = serde_json::to_string(&vec![Period::All, Period::Month(ym(2026, 1))]).unwrap();
        assert_eq!(json, r#"["all","2026-01"]"#);
        let back: Vec<Period> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Period::All, Period::Month(ym(2026, 1))]);
    }

    #[test]
    fn test_available_periods_sorted_descending() {
        let ledger = Ledger::from_entries(vec![
            entry(2026, 1, 5, 10),
            entry(2025, 12, 31, 10),
            entry(2026, 3, 1, 10),
            entry(2026, 1, 20, 10),
        ]);
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();

        let periods = available_periods(&ledger, today);
        assert_eq!(
            periods,
            vec![
                Period::All,
                Period::Month(ym(2026, 3)),
                Period::Month(ym(2026, 1)),
                Period::Month(ym(2025, 12)),
            ]
        );
    }

    #[test]
    fn test_available_periods_empty_ledger() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let periods = available_periods(&Ledger::default(), today);
        assert_eq!(periods, vec![Period::Month(ym(2026, 10))]);
    }

    #[test]
    fn test_default_period() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        let periods = vec![
            Period::All,
            Period::Month(ym(2026, 2)),
            Period::Month(ym(2026, 1)),
        ];
        assert_eq!(default_period(&periods, today), Period::Month(ym(2026, 2)));

        let with_current = vec![Period::All, Period::Month(ym(2026, 3))];
        assert_eq!(
            default_period(&with_current, today),
            Period::Month(ym(2026, 3))
        );
    }

    #[test]
    fn test_filter_by_month() {
        let ledger = Ledger::from_entries(vec![
            entry(2026, 2, 28, 1),
            entry(2026, 3, 1, 2),
            entry(2026, 3, 31, 3),
            entry(2026, 4, 1, 4),
        ]);

        let march = filter(&ledger, Period::Month(ym(2026, 3)));
        assert_eq!(march.iter().map(|e| e.amount).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(filter(&ledger, Period::All).len(), 4);
    }

    #[test]
    fn test_filter_boundary_uses_utc() {
        // 23:30 UTC on the last day of February stays in February
        let late = LedgerEntry {
            timestamp: Utc.with_ymd_and_hms(2026, 2, 28, 23, 30, 0).unwrap(),
            ..entry(2026, 2, 1, 7)
        };
        let ledger = Ledger::from_entries(vec![late]);
        assert_eq!(filter(&ledger, Period::Month(ym(2026, 2))).len(), 1);
        assert!(filter(&ledger, Period::Month(ym(2026, 3))).is_empty());
    }

    #[test]
    fn test_total_income() {
        let income = vec![
            IncomeEntry {
                timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                amount: 1_000_000,
                description: "Salary".to_string(),
            },
            IncomeEntry {
                timestamp: Utc.with_ymd_and_hms(2026, 3, 20, 0, 0, 0).unwrap(),
                amount: 50_000,
                description: "Refund".to_string(),
            },
            IncomeEntry {
                timestamp: Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap(),
                amount: 999,
                description: String::new(),
            },
        ];

        assert_eq!(total_income(&income, Period::Month(ym(2026, 3))), 1_050_000);
        assert_eq!(total_income(&income, Period::Month(ym(2026, 4))), 0);
        assert_eq!(total_income(&income, Period::All), 0);
    }
}
