//! Structured commentary payloads
//!
//! Each dashboard panel is summarized as numbers and labels only. Backends
//! turn a [`CommentaryRequest`] into a prompt; the engine never writes prose.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dashboard::Dashboard;
use crate::error::{Error, Result};
use crate::forecast::ForecastState;
use crate::period::Period;

/// Maximum categories sent for the category panel
const MAX_CATEGORIES: usize = 10;

/// A dashboard panel that can carry commentary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Panel {
    Categories,
    Trend,
    Budgets,
    Forecast,
}

impl Panel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Categories => "categories",
            Self::Trend => "trend",
            Self::Budgets => "budgets",
            Self::Forecast => "forecast",
        }
    }

    pub fn all() -> &'static [Panel] {
        &[Self::Categories, Self::Trend, Self::Budgets, Self::Forecast]
    }

    /// Instruction given to the text-generation backend for this panel
    fn instruction(&self) -> &'static str {
        match self {
            Self::Categories => {
                "You are a personal finance assistant. In two or three sentences, comment on \
                 where the money went in this period based on the category totals below. \
                 Mention the largest category and anything unusual."
            }
            Self::Trend => {
                "You are a personal finance assistant. In two or three sentences, describe the \
                 daily spending pattern below: peaks, quiet stretches, and the overall rhythm \
                 of the month."
            }
            Self::Budgets => {
                "You are a personal finance assistant. In two or three sentences, compare each \
                 budget's allocation with actual spend below. Call out budgets that are over \
                 or close to their limit."
            }
            Self::Forecast => {
                "You are a personal finance assistant. In two or three sentences, explain the \
                 month-end projection below. If the outcome is a deficit, suggest how to \
                 close the gap; if it is a surplus, say how large it is."
            }
        }
    }
}

impl fmt::Display for Panel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Panel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "categories" => Ok(Self::Categories),
            "trend" => Ok(Self::Trend),
            "budgets" => Ok(Self::Budgets),
            "forecast" => Ok(Self::Forecast),
            _ => Err(Error::InvalidData(format!(
                "Unknown panel: {} (valid: categories, trend, budgets, forecast)",
                s
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct CategoryRow<'a> {
    category: &'a str,
    total: i64,
    percentage: f64,
}

#[derive(Debug, Serialize)]
struct CategoriesData<'a> {
    total_spent: i64,
    categories: Vec<CategoryRow<'a>>,
    other_categories: usize,
}

#[derive(Debug, Serialize)]
struct TrendData {
    total_spent: i64,
    days_in_month: usize,
    days_with_spend: usize,
    peak_day: Option<u32>,
    peak_total: i64,
    daily_totals: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct BudgetRow<'a> {
    name: &'a str,
    allocated: i64,
    actual: i64,
    remaining: i64,
    percent_used: Option<f64>,
}

/// A request for commentary on one panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentaryRequest {
    pub panel: Panel,
    pub period: Period,
    pub data: serde_json::Value,
}

impl CommentaryRequest {
    /// Summarize one panel of a dashboard
    ///
    /// Returns `Ok(None)` when the panel has nothing to comment on: no spend
    /// in the period, no budgets, no trend for all-time, or a forecast that
    /// was not computed.
    pub fn for_panel(dashboard: &Dashboard, panel: Panel) -> Result<Option<Self>> {
        let data = match panel {
            Panel::Categories => {
                if !dashboard.has_data() {
                    return Ok(None);
                }
                serde_json::to_value(CategoriesData {
                    total_spent: dashboard.total_spent,
                    categories: dashboard
                        .categories
                        .iter()
                        .take(MAX_CATEGORIES)
                        .map(|c| CategoryRow {
                            category: &c.category,
                            total: c.total,
                            percentage: (c.percentage * 10.0).round() / 10.0,
                        })
                        .collect(),
                    other_categories: dashboard.categories.len().saturating_sub(MAX_CATEGORIES),
                })?
            }
            Panel::Trend => {
                if dashboard.trend.is_empty() || !dashboard.has_data() {
                    return Ok(None);
                }
                let peak = dashboard
                    .trend
                    .iter()
                    .filter(|p| p.total > 0)
                    .max_by(|a, b| a.total.cmp(&b.total).then(b.day.cmp(&a.day)));
                serde_json::to_value(TrendData {
                    total_spent: dashboard.total_spent,
                    days_in_month: dashboard.trend.len(),
                    days_with_spend: dashboard.trend.iter().filter(|p| p.total > 0).count(),
                    peak_day: peak.map(|p| p.day),
                    peak_total: peak.map(|p| p.total).unwrap_or(0),
                    daily_totals: dashboard.trend.iter().map(|p| p.total).collect(),
                })?
            }
            Panel::Budgets => {
                if dashboard.budgets.is_empty() {
                    return Ok(None);
                }
                let rows: Vec<BudgetRow> = dashboard
                    .budgets
                    .iter()
                    .map(|b| BudgetRow {
                        name: &b.name,
                        allocated: b.allocated,
                        actual: b.actual,
                        remaining: b.remaining,
                        percent_used: b.percent_used.map(|p| (p * 10.0).round() / 10.0),
                    })
                    .collect();
                serde_json::json!({ "budgets": rows })
            }
            Panel::Forecast => match &dashboard.forecast {
                ForecastState::Computed(projection) => serde_json::to_value(projection)?,
                _ => return Ok(None),
            },
        };

        Ok(Some(Self {
            panel,
            period: dashboard.period,
            data,
        }))
    }

    /// Every panel of a dashboard that has something to comment on
    pub fn for_dashboard(dashboard: &Dashboard) -> Result<Vec<Self>> {
        let mut requests = Vec::new();
        for panel in Panel::all() {
            if let Some(request) = Self::for_panel(dashboard, *panel)? {
                requests.push(request);
            }
        }
        Ok(requests)
    }

    /// Prompt text sent to a backend
    pub fn prompt(&self) -> String {
        let data = serde_json::to_string_pretty(&self.data).unwrap_or_else(|_| self.data.to_string());
        format!(
            "{}\nAmounts are in whole currency units.\n\nPeriod: {}\nPanel: {}\nData:\n{}\n",
            self.panel.instruction(),
            self.period,
            self.panel,
            data
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppState, Budget, DailyExpense, FundEntry, TransactionType};
    use crate::period::YearMonth;
    use crate::store::StateStore;
    use chrono::{TimeZone, Utc};

    fn dashboard(period: Period) -> Dashboard {
        let state = AppState {
            fund_history: vec![FundEntry {
                date: "2026-05-01".to_string(),
                amount: Some(500_000.0),
                tx_type: Some(TransactionType::Credit),
                description: None,
            }],
            budgets: vec![Budget {
                name: "Food".to_string(),
                total_budget: Some(100_000.0),
                history: vec![],
            }],
            daily_expenses: vec![
                DailyExpense {
                    date: "2026-05-02".to_string(),
                    amount: Some(30_000.0),
                    category: Some("Food".to_string()),
                    description: None,
                },
                DailyExpense {
                    date: "2026-05-04".to_string(),
                    amount: Some(90_000.0),
                    category: Some("Rent".to_string()),
                    description: None,
                },
            ],
            ..Default::default()
        };
        let store = StateStore::from_state(state).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 5, 10, 0, 0, 0).unwrap();
        Dashboard::build(&store, period, now)
    }

    fn may() -> Period {
        Period::Month(YearMonth::new(2026, 5).unwrap())
    }

    #[test]
    fn test_panel_parse() {
        assert_eq!("Budgets".parse::<Panel>().unwrap(), Panel::Budgets);
        assert!("pie".parse::<Panel>().is_err());
    }

    #[test]
    fn test_categories_payload() {
        let req = CommentaryRequest::for_panel(&dashboard(may()), Panel::Categories)
            .unwrap()
            .unwrap();
        assert_eq!(req.data["total_spent"], 120_000);
        assert_eq!(req.data["categories"][0]["category"], "Rent");
        assert_eq!(req.data["categories"][0]["percentage"], 75.0);
    }

    #[test]
    fn test_trend_payload() {
        let req = CommentaryRequest::for_panel(&dashboard(may()), Panel::Trend)
            .unwrap()
            .unwrap();
        assert_eq!(req.data["days_in_month"], 31);
        assert_eq!(req.data["days_with_spend"], 2);
        assert_eq!(req.data["peak_day"], 4);
        assert_eq!(req.data["daily_totals"].as_array().unwrap().len(), 31);
    }

    #[test]
    fn test_forecast_payload_is_raw_numbers() {
        let req = CommentaryRequest::for_panel(&dashboard(may()), Panel::Forecast)
            .unwrap()
            .unwrap();
        // 120k over 10 days, 31-day month
        assert_eq!(req.data["projected_total"], 372_000.0);
        assert_eq!(req.data["delta"], 128_000.0);
        assert_eq!(req.data["outcome"], "surplus");
    }

    #[test]
    fn test_all_time_skips_trend_and_forecast() {
        let dash = dashboard(Period::All);
        let panels: Vec<Panel> = CommentaryRequest::for_dashboard(&dash)
            .unwrap()
            .into_iter()
            .map(|r| r.panel)
            .collect();
        assert_eq!(panels, vec![Panel::Categories, Panel::Budgets]);
    }

    #[test]
    fn test_prompt_contains_data() {
        let req = CommentaryRequest::for_panel(&dashboard(may()), Panel::Budgets)
            .unwrap()
            .unwrap();
        let prompt = req.prompt();
        assert!(prompt.contains("Period: 2026-05"));
        assert!(prompt.contains("\"allocated\": 100000"));
    }
}
