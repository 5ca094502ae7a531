//! Advice command implementation

use anyhow::Result;
use pula_core::{AdviceResult, PulaService};

use super::{print_json, resolve_user};

pub fn cmd_advice(svc: &PulaService, user: &str, topic: &str, json: bool) -> Result<()> {
    let user = resolve_user(svc, user)?;
    let result = svc.advice(user.id, topic);
    if json {
        return print_json(&result);
    }

    let advice = match result {
        AdviceResult::Advice(advice) => advice,
        AdviceResult::Error { error } => anyhow::bail!(error),
    };

    println!();
    println!("📘 {} ({} read)", advice.title, advice.estimated_reading_time);
    println!("   ─────────────────────────────────────");
    for section in &advice.sections {
        println!();
        println!("   {}", section.heading());
        for item in &section.items {
            println!("   • {}", item);
        }
    }

    if let Some(analysis) = &advice.spending_analysis {
        println!();
        println!(
            "   Your largest expense category is {} ({}).",
            analysis.highest_category,
            svc.config().currency.format(analysis.amount)
        );
        println!("   {}", analysis.suggestion);
    }

    Ok(())
}
