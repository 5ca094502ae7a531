//! Pula CLI - Cash-flow forecasting for irregular earners
//!
//! Usage:
//!   pula init                                Initialize database
//!   pula users add Neo --threshold 200       Add a user
//!   pula import --user Neo --file ledger.csv Import transactions
//!   pula forecast --user Neo --days 30       Forecast the balance
//!   pula alerts check --user Neo             Check for shortfalls

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db_path = commands::resolve_db_path(cli.db.as_deref())?;

    if let Commands::Init = cli.command {
        return commands::cmd_init(&db_path);
    }
    if let Commands::Categorize {
        description,
        amount,
        user: None,
        json,
    } = &cli.command
    {
        return commands::cmd_categorize(None, description, *amount, None, *json);
    }
    if let Commands::Explain { json } = cli.command {
        return commands::cmd_explain(json);
    }

    let svc = commands::open_service(&db_path, cli.config.as_deref())?;

    match cli.command {
        Commands::Init | Commands::Explain { .. } => Ok(()),
        Commands::Users { action } => match action {
            None | Some(UsersAction::List) => commands::cmd_users_list(&svc),
            Some(UsersAction::Add { name, threshold }) => {
                commands::cmd_users_add(&svc, &name, threshold)
            }
            Some(UsersAction::Threshold { user, amount }) => {
                commands::cmd_users_threshold(&svc, &user, amount)
            }
        },
        Commands::Add {
            user,
            amount,
            description,
            category,
            date,
        } => commands::cmd_add(
            &svc,
            &user,
            amount,
            &description,
            category.as_deref(),
            date.as_deref(),
        ),
        Commands::Transactions { action } => match action {
            None => commands::cmd_transactions_list(&svc, None, 20, None, None),
            Some(TransactionsAction::List {
                user,
                limit,
                kind,
                category,
            }) => commands::cmd_transactions_list(
                &svc,
                user.as_deref(),
                limit,
                kind.as_deref(),
                category.as_deref(),
            ),
            Some(TransactionsAction::Edit {
                id,
                amount,
                description,
                category,
                date,
            }) => commands::cmd_transactions_edit(
                &svc,
                id,
                amount,
                description,
                category,
                date.as_deref(),
            ),
            Some(TransactionsAction::Delete { id }) => commands::cmd_transactions_delete(&svc, id),
        },
        Commands::Import { user, file } => commands::cmd_import(&svc, &user, &file),
        Commands::Seed { user } => commands::cmd_seed(&svc, &user),
        Commands::Forecast {
            user,
            days,
            legacy,
            json,
        } => commands::cmd_forecast(&svc, &user, days, legacy, json),
        Commands::Alerts { action } => match action {
            AlertsAction::Check {
                user,
                strategy,
                json,
            } => commands::cmd_alerts_check(&svc, &user, strategy.as_deref(), json),
            AlertsAction::CheckAll => commands::cmd_alerts_check_all(&svc),
            AlertsAction::List { user, all } => {
                commands::cmd_alerts_list(&svc, user.as_deref(), all)
            }
            AlertsAction::Dismiss { id } => commands::cmd_alerts_dismiss(&svc, id),
        },
        Commands::Advice { user, topic, json } => commands::cmd_advice(&svc, &user, &topic, json),
        Commands::Categorize {
            description,
            amount,
            user,
            json,
        } => commands::cmd_categorize(Some(&svc), &description, amount, user.as_deref(), json),
        Commands::Summary { user, json } => commands::cmd_summary(&svc, &user, json),
    }
}
