//! Transaction command implementations

use anyhow::{Context, Result};
use pula_core::categorize::explain_category;
use pula_core::db::TransactionFilter;
use pula_core::models::{TransactionKind, TransactionUpdate};
use pula_core::{categorize, PulaService};

use super::{parse_date_arg, resolve_user, truncate};

pub fn cmd_add(
    svc: &PulaService,
    user: &str,
    amount: f64,
    description: &str,
    category: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    let user = resolve_user(svc, user)?;
    let date = parse_date_arg(date)?;

    let tx = svc
        .record_transaction(user.id, date, description, amount, category)
        .context("Failed to record transaction")?;

    let kind = if tx.is_income() { "Income" } else { "Expense" };
    println!(
        "✅ {} of {} added for {} ({})",
        kind,
        svc.config().currency.format(tx.amount.abs()),
        user.name,
        tx.category
    );
    if category.is_none() {
        let suggestion = categorize(description, amount);
        println!(
            "   {}",
            explain_category(&suggestion.category, suggestion.confidence)
        );
    }

    Ok(())
}

pub fn cmd_transactions_list(
    svc: &PulaService,
    user: Option<&str>,
    limit: usize,
    kind: Option<&str>,
    category: Option<&str>,
) -> Result<()> {
    let user_id = user.map(|u| resolve_user(svc, u)).transpose()?.map(|u| u.id);
    let kind = kind
        .map(|k| k.parse::<TransactionKind>())
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let filter = TransactionFilter::new()
        .user_id(user_id)
        .kind(kind)
        .category(category)
        .newest_first(true)
        .limit(Some(limit));
    let transactions = svc.db().query_transactions(&filter)?;

    if transactions.is_empty() {
        println!("No transactions found. Add some with:");
        println!("  pula add --user <name> -- -50 \"Taxi to town\"");
        println!("  pula import --user <name> --file ledger.csv");
        return Ok(());
    }

    let currency = &svc.config().currency;
    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount_str = if tx.amount < 0.0 {
            format!("\x1b[31m{}\x1b[0m", currency.format(tx.amount)) // Red for expenses
        } else {
            format!("\x1b[32m+{}\x1b[0m", currency.format(tx.amount)) // Green for income
        };

        println!(
            "   [{}] {} │ {:>12} │ {:<14} │ {}",
            tx.id,
            tx.date.format("%Y-%m-%d %H:%M"),
            amount_str,
            truncate(&tx.category, 14),
            truncate(&tx.description, 36)
        );
    }

    Ok(())
}

pub fn cmd_transactions_edit(
    svc: &PulaService,
    id: i64,
    amount: Option<f64>,
    description: Option<String>,
    category: Option<String>,
    date: Option<&str>,
) -> Result<()> {
    let date = date.map(|d| parse_date_arg(Some(d))).transpose()?;
    let update = TransactionUpdate {
        date,
        amount,
        category,
        description,
    };
    if update.is_empty() {
        anyhow::bail!("Nothing to change. Pass --amount, --description, --category or --date");
    }

    svc.db()
        .update_transaction(id, &update)
        .with_context(|| format!("Failed to update transaction {}", id))?;

    let tx = svc
        .db()
        .get_transaction(id)?
        .ok_or_else(|| anyhow::anyhow!("Transaction {} not found", id))?;
    println!(
        "✅ Updated transaction {}: {} {} ({})",
        tx.id,
        tx.description,
        svc.config().currency.format(tx.amount),
        tx.category
    );

    Ok(())
}

pub fn cmd_transactions_delete(svc: &PulaService, id: i64) -> Result<()> {
    if !svc.db().delete_transaction(id)? {
        anyhow::bail!("Transaction {} not found", id);
    }
    println!("🗑️  Deleted transaction {}", id);
    Ok(())
}
