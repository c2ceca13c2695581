//! Report command implementations

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde_json::json;

use tally_core::period::{available_periods, default_period};
use tally_core::{sum_amounts, ForecastState, NotApplicable, Outcome, Period, StateStore};

use super::{bar, build_dashboard, format_amount, print_json, truncate};

const RULE: &str = "   ─────────────────────────────────────────────────────────────";

/// One line describing a forecast, if there is anything to say
pub fn describe_forecast(state: &ForecastState) -> Option<String> {
    match state {
        ForecastState::Computed(p) => {
            let outcome = match p.outcome {
                Outcome::Surplus => "surplus",
                Outcome::Deficit => "deficit",
            };
            Some(format!(
                "Projected month-end spend {} ({} {})",
                format_amount(p.projected_total.round() as i64),
                format_amount(p.magnitude().round() as i64),
                outcome
            ))
        }
        other => other.message().map(str::to_string),
    }
}

pub fn cmd_periods(store: &StateStore, now: DateTime<Utc>, json: bool) -> Result<()> {
    let today = now.date_naive();
    let periods = available_periods(store.ledger(), today);
    let default = default_period(&periods, today);

    if json {
        return print_json(&json!({ "periods": periods, "default": default }));
    }

    println!();
    println!("📅 Available Periods");
    println!("{}", RULE);
    for period in &periods {
        let marker = if *period == default { "*" } else { " " };
        match period {
            Period::All => println!("   {} all (all time)", marker),
            Period::Month(month) => println!("   {} {}", marker, month),
        }
    }
    println!();
    println!("   * default selection");

    Ok(())
}

pub fn cmd_summary(
    store: &StateStore,
    period: Option<&str>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let dash = build_dashboard(store, period, now)?;

    if json {
        return print_json(&dash);
    }

    println!();
    println!("📊 Spending Summary");
    println!("   Period: {}", dash.period);
    println!("{}", RULE);

    if !dash.has_data() {
        println!("   No spending found in this period.");
    } else {
        println!("   Total spent:   {:>14}", format_amount(dash.total_spent));
        if !dash.period.is_all() {
            println!("   Income:        {:>14}", format_amount(dash.total_income));
        }
        println!("   Transactions:  {:>14}", dash.entries().len());
        println!();
        println!("   Top categories:");
        for cat in dash.categories.iter().take(5) {
            println!(
                "     {:25} {:>14} {:>5.1}%",
                truncate(&cat.category, 25),
                format_amount(cat.total),
                cat.percentage
            );
        }
    }

    let over: Vec<&str> = dash
        .budgets
        .iter()
        .filter(|b| b.is_over_budget())
        .map(|b| b.name.as_str())
        .collect();
    if !over.is_empty() {
        println!();
        println!("   ⚠️  Over budget: {}", over.join(", "));
    }

    if let Some(line) = describe_forecast(&dash.forecast) {
        println!();
        println!("   🔮 {}", line);
    }

    Ok(())
}

pub fn cmd_categories(
    store: &StateStore,
    period: Option<&str>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let dash = build_dashboard(store, period, now)?;

    if json {
        return print_json(&dash.categories);
    }

    println!();
    println!("🗂️  Spending by Category");
    println!("   Period: {}", dash.period);
    println!("{}", RULE);

    if dash.categories.is_empty() {
        println!("   No spending found in this period.");
        return Ok(());
    }

    println!("   Total: {}", format_amount(dash.total_spent));
    println!();
    println!(
        "   {:25} │ {:>14} │ {:>6} │ {:>5}",
        "Category", "Amount", "%", "Count"
    );
    println!("   ──────────────────────────┼────────────────┼────────┼───────");
    for cat in &dash.categories {
        println!(
            "   {:25} │ {:>14} │ {:>5.1}% │ {:>5}",
            truncate(&cat.category, 25),
            format_amount(cat.total),
            cat.percentage,
            cat.transaction_count
        );
    }

    Ok(())
}

pub fn cmd_trend(
    store: &StateStore,
    period: Option<&str>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let dash = build_dashboard(store, period, now)?;

    if json {
        return print_json(&dash.trend);
    }

    println!();
    println!("📈 Daily Spending");
    println!("   Period: {}", dash.period);
    println!("{}", RULE);

    if dash.period.is_all() {
        println!("   The daily trend is only available for a single month.");
        return Ok(());
    }

    let max = dash.trend.iter().map(|p| p.total).max().unwrap_or(0);
    println!("   {:>3} {:10} │ {:>14} │", "Day", "Date", "Amount");
    println!("   ───────────────┼────────────────┼──────────────────────────────");
    for point in &dash.trend {
        println!(
            "   {:>3} {:10} │ {:>14} │ {}",
            point.day,
            point.date.format("%a %d").to_string(),
            format_amount(point.total),
            bar(point.total, max, 30)
        );
    }

    Ok(())
}

pub fn cmd_budgets(
    store: &StateStore,
    period: Option<&str>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let dash = build_dashboard(store, period, now)?;

    if json {
        return print_json(&dash.budgets);
    }

    println!();
    println!("💰 Budgets vs Actual");
    println!("   Period: {}", dash.period);
    println!("{}", RULE);

    if dash.budgets.is_empty() {
        println!("   No budgets defined.");
        return Ok(());
    }

    println!(
        "   {:20} │ {:>12} │ {:>12} │ {:>12} │ {:>6}",
        "Budget", "Allocated", "Actual", "Remaining", "Used"
    );
    println!("   ─────────────────────┼──────────────┼──────────────┼──────────────┼───────");
    for budget in &dash.budgets {
        let used = budget
            .percent_used
            .map(|p| format!("{:.0}%", p))
            .unwrap_or_else(|| "-".to_string());
        let flag = if budget.is_over_budget() { " ⚠️" } else { "" };
        println!(
            "   {:20} │ {:>12} │ {:>12} │ {:>12} │ {:>6}{}",
            truncate(&budget.name, 20),
            format_amount(budget.allocated),
            format_amount(budget.actual),
            format_amount(budget.remaining),
            used,
            flag
        );
    }

    Ok(())
}

pub fn cmd_forecast(
    store: &StateStore,
    period: Option<&str>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let dash = build_dashboard(store, period, now)?;

    if json {
        return print_json(&json!({
            "period": dash.period,
            "forecast": dash.forecast,
            "message": dash.forecast_message,
        }));
    }

    println!();
    println!("🔮 Month-End Forecast");
    println!("   Period: {}", dash.period);
    println!("{}", RULE);

    match &dash.forecast {
        ForecastState::Computed(p) => {
            println!("   Income:           {:>14}", format_amount(p.income));
            println!("   Spent so far:     {:>14}", format_amount(p.spent_so_far));
            println!(
                "   Days elapsed:     {:>14}",
                format!("{}/{}", p.days_elapsed, p.days_in_month)
            );
            println!(
                "   Daily rate:       {:>14}",
                format_amount(p.daily_rate.round() as i64)
            );
            println!(
                "   Projected total:  {:>14}",
                format_amount(p.projected_total.round() as i64)
            );
            println!();
            match p.outcome {
                Outcome::Surplus => println!(
                    "   ✅ Projected surplus: {}",
                    format_amount(p.magnitude().round() as i64)
                ),
                Outcome::Deficit => println!(
                    "   ⚠️  Projected deficit: {}",
                    format_amount(p.magnitude().round() as i64)
                ),
            }
        }
        ForecastState::NotApplicable {
            reason: NotApplicable::AllTime,
        } => {
            println!("   Select a month to see a forecast.");
        }
        other => {
            if let Some(message) = other.message() {
                println!("   {}", message);
            }
        }
    }

    Ok(())
}

pub fn cmd_detail(
    store: &StateStore,
    category: &str,
    period: Option<&str>,
    now: DateTime<Utc>,
    json: bool,
) -> Result<()> {
    let dash = build_dashboard(store, period, now)?;
    let transactions = dash.detail(category);
    let total = sum_amounts(transactions.iter().map(|e| e.amount));

    if json {
        return print_json(&json!({
            "category": category,
            "period": dash.period,
            "total": total,
            "transactions": transactions,
        }));
    }

    println!();
    println!("🔎 {}", category);
    println!("   Period: {}", dash.period);
    println!("{}", RULE);

    if transactions.is_empty() {
        println!("   No transactions in this category for this period.");
        return Ok(());
    }

    println!(
        "   Total: {} ({} transactions)",
        format_amount(total),
        transactions.len()
    );
    println!();
    println!(
        "   {:10} │ {:>12} │ {:7} │ Description",
        "Date", "Amount", "Source"
    );
    println!("   ───────────┼──────────────┼─────────┼──────────────────────────────");
    for entry in &transactions {
        println!(
            "   {:10} │ {:>12} │ {:7} │ {}",
            entry.timestamp.format("%Y-%m-%d").to_string(),
            format_amount(entry.amount),
            entry.source.as_str(),
            truncate(&entry.description, 40)
        );
    }

    Ok(())
}
