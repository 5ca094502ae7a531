//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pula_core::forecast::MAX_FORECAST_DAYS;

/// Pula - Cash-flow forecasting for irregular earners
#[derive(Parser)]
#[command(name = "pula")]
#[command(about = "Forecast your balance and catch shortfalls before they happen", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path (defaults to the platform data directory)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (defaults to the override in the data directory, then built-in settings)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Manage users
    Users {
        #[command(subcommand)]
        action: Option<UsersAction>,
    },

    /// Record a transaction (categorized automatically unless --category is given)
    Add {
        /// User name or id
        #[arg(short, long)]
        user: String,

        /// Signed amount: positive for income, negative for expenses
        #[arg(allow_hyphen_values = true)]
        amount: f64,

        /// What the money was for or where it came from
        description: String,

        /// Category (skips auto-categorization)
        #[arg(short, long)]
        category: Option<String>,

        /// Date as YYYY-MM-DD or "YYYY-MM-DD HH:MM" (defaults to now)
        #[arg(short, long)]
        date: Option<String>,
    },

    /// List, edit and delete transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Import transactions from a date,description,amount[,category] CSV
    Import {
        /// User name or id
        #[arg(short, long)]
        user: String,

        /// CSV file to import
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Replace a user's ledger with 45 days of sample data
    Seed {
        /// User name or id
        #[arg(short, long)]
        user: String,
    },

    /// Forecast a user's balance
    Forecast {
        /// User name or id
        #[arg(short, long)]
        user: String,

        /// Days ahead (defaults to the configured horizon)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=i64::from(MAX_FORECAST_DAYS)))]
        days: Option<u32>,

        /// Use the moving-average calculator instead of the pattern forecast
        #[arg(long)]
        legacy: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Check and manage alerts
    Alerts {
        #[command(subcommand)]
        action: AlertsAction,
    },

    /// Show financial advice
    Advice {
        /// User name or id
        #[arg(short, long)]
        user: String,

        /// Topic: cash_shortfall, low_balance, high_spending, income_overdue,
        /// irregular_income, general
        #[arg(short, long, default_value = "general")]
        topic: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Suggest a category for a description and amount
    Categorize {
        /// Transaction description
        description: String,

        /// Signed amount
        #[arg(allow_hyphen_values = true)]
        amount: f64,

        /// Check on behalf of a user (name or id)
        #[arg(short, long)]
        user: Option<String>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Show balance, monthly totals, spending breakdown and trend
    Summary {
        /// User name or id
        #[arg(short, long)]
        user: String,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Explain how forecasts are calculated
    Explain {
        /// Print JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum UsersAction {
    /// Add a user (or update an existing user's threshold)
    Add {
        /// User name
        name: String,

        /// Balance below which low-balance alerts fire
        #[arg(short, long)]
        threshold: Option<f64>,
    },

    /// List users
    List,

    /// Change a user's alert threshold
    Threshold {
        /// User name or id
        user: String,

        /// New threshold
        amount: f64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions, newest first
    List {
        /// User name or id (all users if omitted)
        #[arg(short, long)]
        user: Option<String>,

        /// Maximum number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Only income or expense
        #[arg(short, long)]
        kind: Option<String>,

        /// Only this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Change fields of a transaction
    Edit {
        /// Transaction ID
        id: i64,

        /// New signed amount
        #[arg(short, long, allow_hyphen_values = true)]
        amount: Option<f64>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New date (YYYY-MM-DD or "YYYY-MM-DD HH:MM")
        #[arg(short, long)]
        date: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum AlertsAction {
    /// Evaluate alerts for one user
    Check {
        /// User name or id
        #[arg(short, long)]
        user: String,

        /// Alert strategy: forecast or legacy (defaults to config)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Print JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate forecast alerts for every user
    CheckAll,

    /// List stored alerts
    List {
        /// User name or id (all users if omitted)
        #[arg(short, long)]
        user: Option<String>,

        /// Include dismissed alerts
        #[arg(short, long)]
        all: bool,
    },

    /// Dismiss an alert
    Dismiss {
        /// Alert ID
        id: i64,
    },
}
