//! User command implementations

use anyhow::Result;
use pula_core::PulaService;

use super::resolve_user;

pub fn cmd_users_add(svc: &PulaService, name: &str, threshold: Option<f64>) -> Result<()> {
    let user = svc.add_user(name, threshold)?;
    println!(
        "✅ User {} (id {}) will be alerted below {}",
        user.name,
        user.id,
        svc.config().currency.format(user.alert_threshold)
    );
    Ok(())
}

pub fn cmd_users_list(svc: &PulaService) -> Result<()> {
    let users = svc.db().list_users()?;

    if users.is_empty() {
        println!("No users yet. Add one with:");
        println!("  pula users add <name>");
        return Ok(());
    }

    println!();
    println!("👥 Users");
    println!("   ─────────────────────────────────────");
    for user in users {
        let count = svc.db().count_transactions(Some(user.id))?;
        println!(
            "   [{}] {:<20} threshold {:>10}  {} transactions",
            user.id,
            user.name,
            svc.config().currency.format(user.alert_threshold),
            count
        );
    }

    Ok(())
}

pub fn cmd_users_threshold(svc: &PulaService, user: &str, amount: f64) -> Result<()> {
    if !amount.is_finite() || amount < 0.0 {
        anyhow::bail!("Threshold must be a non-negative number");
    }
    let user = resolve_user(svc, user)?;
    svc.db().set_alert_threshold(user.id, amount)?;
    println!(
        "✅ {} will now be alerted below {}",
        user.name,
        svc.config().currency.format(amount)
    );
    Ok(())
}
