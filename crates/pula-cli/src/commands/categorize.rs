//! Categorize command implementation

use anyhow::Result;
use pula_core::categorize::{explain_category, Categorization};
use pula_core::{categorize, CategorizeResult, PulaService};

use super::{print_json, resolve_user};

/// Suggest a category; with a user, the lookup goes through the service
pub fn cmd_categorize(
    svc: Option<&PulaService>,
    description: &str,
    amount: f64,
    user: Option<&str>,
    json: bool,
) -> Result<()> {
    let result = match (svc, user) {
        (Some(svc), Some(user)) => {
            let user = resolve_user(svc, user)?;
            svc.categorize_for_user(user.id, description, amount)
        }
        _ => CategorizeResult::Categorized(categorize(description, amount)),
    };

    if json {
        return print_json(&result);
    }

    let categorization: Categorization = match result {
        CategorizeResult::Categorized(c) => c,
        CategorizeResult::Error { error } => anyhow::bail!(error),
    };

    println!();
    println!("🏷️  {}", description);
    println!("   Category:    {}", categorization.category);
    if let Some(sub) = &categorization.subcategory {
        println!("   Subcategory: {}", sub);
    }
    println!("   Confidence:  {:.0}%", categorization.confidence * 100.0);
    println!("   Why:         {}", categorization.explanation);
    println!(
        "   {}",
        explain_category(&categorization.category, categorization.confidence)
    );

    Ok(())
}
