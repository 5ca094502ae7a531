//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init and shared utilities (open_service, resolve_user, date parsing)
//! - `users` - User management commands (add, list, threshold)
//! - `transactions` - Transaction commands (add, list, edit, delete)
//! - `import` - CSV import and sample data seeding
//! - `forecast` - Forecast and methodology commands
//! - `alerts` - Alert commands (check, check-all, list, dismiss)
//! - `advice` - Financial advice command
//! - `categorize` - Category suggestion command
//! - `reports` - Summary dashboard

pub mod advice;
pub mod alerts;
pub mod categorize;
pub mod core;
pub mod forecast;
pub mod import;
pub mod reports;
pub mod transactions;
pub mod users;

// Re-export command functions for main.rs
pub use advice::*;
pub use alerts::*;
pub use categorize::*;
pub use core::*;
pub use forecast::*;
pub use import::*;
pub use reports::*;
pub use transactions::*;
pub use users::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
