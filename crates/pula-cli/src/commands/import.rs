//! Import and sample data commands

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use pula_core::seed::seed_sample_data;
use pula_core::{import_csv, PulaService};
use tracing::{debug, warn};

use super::resolve_user;

pub fn cmd_import(svc: &PulaService, user: &str, file: &Path) -> Result<()> {
    let user = resolve_user(svc, user)?;
    println!("📥 Importing {} for {}...", file.display(), user.name);

    let reader =
        File::open(file).with_context(|| format!("Failed to open {}", file.display()))?;
    let summary = match import_csv(svc.db(), reader, user.id) {
        Ok(summary) => summary,
        Err(e) => {
            warn!(user_id = user.id, file = %file.display(), error = %e, "Import failed");
            return Err(anyhow::Error::new(e).context("Import failed"));
        }
    };
    debug!(
        file = %file.display(),
        auto_categorized = summary.auto_categorized,
        "Import finished"
    );

    println!("   Imported: {}", summary.imported);
    if summary.auto_categorized > 0 {
        println!("   Auto-categorized: {}", summary.auto_categorized);
    }
    if summary.skipped_duplicates > 0 {
        println!("   Skipped (already imported): {}", summary.skipped_duplicates);
    }
    println!("✅ Import complete");

    Ok(())
}

pub fn cmd_seed(svc: &PulaService, user: &str) -> Result<()> {
    let user = resolve_user(svc, user)?;
    let now = Local::now().naive_local();

    let inserted = seed_sample_data(svc.db(), user.id, now).context("Failed to seed sample data")?;
    let forecast = svc.forecast_at(user.id, None, now);

    println!("🌱 Created {} sample transactions for {}", inserted, user.name);
    println!(
        "   Current balance: {}",
        svc.config().currency.format(forecast.current_balance)
    );
    println!("   Sample data includes recent large expenses to demonstrate shortfall detection");
    println!("   Try: pula forecast --user {}", user.name);

    Ok(())
}
