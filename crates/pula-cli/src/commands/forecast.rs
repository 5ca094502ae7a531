//! Forecast command implementations

use anyhow::Result;
use chrono::Local;
use pula_core::forecast::InsightKind;
use pula_core::{explain_forecast, PulaService};

use super::{print_json, resolve_user};

pub fn cmd_forecast(
    svc: &PulaService,
    user: &str,
    days: Option<u32>,
    legacy: bool,
    json: bool,
) -> Result<()> {
    let user = resolve_user(svc, user)?;
    let now = Local::now().naive_local();
    let currency = &svc.config().currency;

    if legacy {
        let forecast = svc.legacy_forecast_at(user.id, days, now)?;
        if json {
            return print_json(&forecast);
        }

        println!();
        println!(
            "📈 {}-day projection for {} (moving average)",
            forecast.days_ahead, user.name
        );
        println!("   ─────────────────────────────────────");
        println!("   Current balance:   {}", currency.format(forecast.current_balance));
        println!("   Average daily net: {}", currency.format(forecast.daily_net_change));
        println!("   Projected balance: {}", currency.format(forecast.projected_balance));
        match forecast.shortfall_day {
            Some(day) => println!("   ⚠️  Balance reaches zero on day {}", day),
            None => println!("   ✅ No shortfall projected"),
        }
        return Ok(());
    }

    let forecast = svc.forecast_at(user.id, days, now);
    if json {
        return print_json(&forecast);
    }

    println!();
    println!(
        "📈 {}-day forecast for {}",
        forecast.forecast_period, user.name
    );
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Current balance: {}", currency.format(forecast.current_balance));

    if !forecast.is_empty() {
        println!(
            "   Income pattern: {} ({} days between payments)",
            forecast.income_analysis.pattern_type,
            forecast.income_analysis.frequency_days.round()
        );
        println!(
            "   Spending: {} per day ({})",
            currency.format(forecast.expense_analysis.average_daily),
            forecast.expense_analysis.pattern_type
        );
        println!();
        println!("   Date         Income      Expenses     Balance   Confidence");

        for day in &forecast.daily_forecasts {
            let balance = currency.format(day.predicted_balance);
            let balance = if day.predicted_balance < 0.0 {
                format!("\x1b[31m{:>11}\x1b[0m", balance) // Red for shortfall days
            } else {
                format!("{:>11}", balance)
            };
            println!(
                "   {}  {:>10}  {:>10}  {}   {:>4.0}%",
                day.date,
                currency.format(day.predicted_income),
                currency.format(day.predicted_expenses),
                balance,
                day.confidence * 100.0
            );
        }

        if let Some(low) = forecast.lowest_balance() {
            println!();
            println!(
                "   Lowest balance: {} on {}",
                currency.format(low.predicted_balance),
                low.date
            );
        }
    }

    if !forecast.insights.is_empty() {
        println!();
        println!("💡 Insights");
        for insight in &forecast.insights {
            let icon = match insight.kind {
                InsightKind::Warning => "⚠️ ",
                InsightKind::Info => "ℹ️ ",
            };
            println!("   {} {}: {}", icon, insight.title, insight.message);
        }
    }

    Ok(())
}

pub fn cmd_explain(json: bool) -> Result<()> {
    let explanation = explain_forecast();
    if json {
        return print_json(&explanation);
    }

    println!();
    println!("🔎 How forecasts work");
    println!("   ─────────────────────────────────────");
    println!("   Income:   {}", explanation.methodology.income_prediction);
    println!("   Expenses: {}", explanation.methodology.expense_prediction);
    println!("   Balance:  {}", explanation.methodology.balance_calculation);
    println!();
    println!("   Factors considered:");
    for factor in &explanation.factors_considered {
        println!("   • {}", factor);
    }
    println!();
    println!("   Limitations:");
    for limitation in &explanation.limitations {
        println!("   • {}", limitation);
    }
    println!();
    println!("   Confidence:");
    println!("   • High: {}", explanation.confidence_factors.high_confidence);
    println!("   • Medium: {}", explanation.confidence_factors.medium_confidence);
    println!("   • Low: {}", explanation.confidence_factors.low_confidence);

    Ok(())
}
