//! Summary report command

use anyhow::Result;
use pula_core::PulaService;

use super::{print_json, resolve_user, truncate};

/// Width of the balance trend bars
const BAR_WIDTH: f64 = 30.0;

pub fn cmd_summary(svc: &PulaService, user: &str, json: bool) -> Result<()> {
    let user = resolve_user(svc, user)?;
    let dash = svc.dashboard(user.id)?;
    if json {
        return print_json(&dash);
    }

    let currency = &svc.config().currency;

    println!();
    println!("📊 Summary for {}", dash.user.name);
    println!("   ─────────────────────────────────────");
    println!("   Balance:   {}", currency.format(dash.current_balance));
    println!("   This month");
    println!("     Income:   {}", currency.format(dash.month.income));
    println!("     Expenses: {}", currency.format(dash.month.expenses));
    println!("     Net:      {}", currency.format(dash.month.net));

    if !dash.categories.is_empty() {
        println!();
        println!("   Spending by category");
        for cat in &dash.categories {
            let share = if dash.month.expenses > 0.0 {
                cat.amount / dash.month.expenses * 100.0
            } else {
                0.0
            };
            println!(
                "     {:<16} {:>12}  {:>5.1}%",
                truncate(&cat.category, 16),
                currency.format(cat.amount),
                share
            );
        }
    }

    let peak = dash
        .balance_trend
        .iter()
        .map(|p| p.balance.abs())
        .fold(0.0_f64, f64::max);
    if peak > 0.0 {
        println!();
        println!("   Balance trend (last {} days)", dash.balance_trend.len());
        for point in dash.balance_trend.iter().step_by(3) {
            let len = (point.balance.abs() / peak * BAR_WIDTH).round() as usize;
            let bar = if point.balance < 0.0 { "░" } else { "█" };
            println!(
                "     {} {:>12} {}",
                point.date.format("%m-%d"),
                currency.format_whole(point.balance),
                bar.repeat(len)
            );
        }
    }

    if !dash.recent.is_empty() {
        println!();
        println!("   Recent transactions");
        for tx in &dash.recent {
            println!(
                "     {} {:>12}  {}",
                tx.date.format("%Y-%m-%d"),
                currency.format(tx.amount),
                truncate(&tx.description, 32)
            );
        }
    }

    Ok(())
}
