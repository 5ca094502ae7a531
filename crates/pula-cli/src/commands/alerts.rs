//! Alert command implementations

use anyhow::Result;
use pula_core::alerts::{AlertReport, AlertStrategy, LegacyAlertKind};
use pula_core::models::{Alert, AlertSeverity};
use pula_core::PulaService;
use tracing::{debug, info};

use super::{print_json, resolve_user};

fn severity_icon(severity: AlertSeverity) -> &'static str {
    match severity {
        AlertSeverity::Critical => "🚨",
        AlertSeverity::High => "⚠️ ",
        AlertSeverity::Medium => "🔶",
        AlertSeverity::Low => "ℹ️ ",
    }
}

fn print_alert(alert: &Alert) {
    let status = if alert.is_active { "" } else { " (dismissed)" };
    println!(
        "   {} [{}] {} {}{}",
        severity_icon(alert.severity),
        alert.id,
        alert.alert_type,
        alert.created_at.format("%Y-%m-%d %H:%M"),
        status
    );
    println!("      {}", alert.message);
}

pub fn cmd_alerts_check(
    svc: &PulaService,
    user: &str,
    strategy: Option<&str>,
    json: bool,
) -> Result<()> {
    let user = resolve_user(svc, user)?;
    let strategy = strategy
        .map(|s| s.parse::<AlertStrategy>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let report = svc.check_alerts(user.id, strategy)?;
    debug!(user_id = user.id, alerts = report.len(), "Alert check finished");
    if json {
        return print_json(&report);
    }

    if report.is_empty() {
        println!("✅ No alerts for {}", user.name);
        return Ok(());
    }

    println!();
    println!("🔔 Alerts for {} ({})", user.name, report.len());
    println!("   ─────────────────────────────────────");
    match report {
        AlertReport::Forecast(alerts) => {
            for alert in &alerts {
                print_alert(alert);
            }
            println!();
            println!("   Get advice with: pula advice --user {} --topic {}", user.name, alerts[0].alert_type);
        }
        AlertReport::Legacy(alerts) => {
            for alert in &alerts {
                let icon = match alert.kind {
                    LegacyAlertKind::Critical => "🚨",
                    LegacyAlertKind::Warning => "⚠️ ",
                    LegacyAlertKind::Caution => "🔶",
                    LegacyAlertKind::Info => "ℹ️ ",
                };
                println!("   {} {}", icon, alert.message);
            }
        }
    }

    Ok(())
}

pub fn cmd_alerts_check_all(svc: &PulaService) -> Result<()> {
    let results = svc.check_all();
    let total: usize = results.iter().map(|(_, alerts)| alerts.len()).sum();
    info!(users = results.len(), alerts = total, "Alert run complete");

    if results.is_empty() {
        println!("No users to check.");
        return Ok(());
    }

    println!();
    println!("🔔 Alert run");
    println!("   ─────────────────────────────────────");
    for (user, alerts) in &results {
        match alerts.iter().map(|a| a.severity).max() {
            Some(worst) => println!(
                "   {} {:<20} {} alert(s)",
                severity_icon(worst),
                user.name,
                alerts.len()
            ),
            None => println!("   ✅ {:<20} no alerts", user.name),
        }
    }

    Ok(())
}

pub fn cmd_alerts_list(svc: &PulaService, user: Option<&str>, include_dismissed: bool) -> Result<()> {
    let user_id = user.map(|u| resolve_user(svc, u)).transpose()?.map(|u| u.id);
    let alerts = svc.list_alerts(user_id, include_dismissed)?;

    if alerts.is_empty() {
        println!("No alerts. Run 'pula alerts check --user <name>' to evaluate.");
        return Ok(());
    }

    println!();
    println!("🔔 Alerts");
    println!("   ─────────────────────────────────────");
    for alert in &alerts {
        print_alert(alert);
    }

    Ok(())
}

pub fn cmd_alerts_dismiss(svc: &PulaService, id: i64) -> Result<()> {
    svc.dismiss_alert(id)
        .map_err(|e| anyhow::anyhow!("Failed to dismiss alert {}: {}", id, e))?;
    println!("✅ Dismissed alert {}", id);
    Ok(())
}
