//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `resolve_db_path` / `open_service` - Shared utilities to open the database
//! - `resolve_user` - Look a user up by id or name
//! - `parse_date_arg` - Parse `--date` values
//! - `cmd_init` - Initialize the database

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveDateTime};
use pula_core::config::{default_db_path, PulaConfig};
use pula_core::models::User;
use pula_core::{Database, PulaService};

/// Database path from `--db`, else the platform data directory, else ./pula.db
pub fn resolve_db_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match default_db_path() {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create data directory {}", parent.display())
                })?;
            }
            Ok(path)
        }
        None => Ok(PathBuf::from("pula.db")),
    }
}

pub fn open_db(db_path: &Path) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path is not valid UTF-8")?;
    Database::new(path_str).context("Failed to open database")
}

/// Open the database and load configuration
pub fn open_service(db_path: &Path, config_path: Option<&Path>) -> Result<PulaService> {
    let config = PulaConfig::load(config_path).context("Failed to load configuration")?;
    let db = open_db(db_path)?;
    Ok(PulaService::new(db, config))
}

/// Find a user by numeric id or by name
pub fn resolve_user(svc: &PulaService, user: &str) -> Result<User> {
    if let Ok(id) = user.parse::<i64>() {
        if let Some(found) = svc.db().get_user(id)? {
            return Ok(found);
        }
    }
    svc.db()
        .get_user_by_name(user)?
        .ok_or_else(|| anyhow::anyhow!("User '{}' not found. Add one with: pula users add <name>", user))
}

/// Parse a `--date` value, defaulting to now
///
/// Accepts `YYYY-MM-DD` (taken as noon) or `YYYY-MM-DD HH:MM[:SS]`.
pub fn parse_date_arg(date: Option<&str>) -> Result<NaiveDateTime> {
    let Some(s) = date else {
        return Ok(Local::now().naive_local());
    };
    let s = s.trim();

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(12, 0, 0))
        .with_context(|| format!("Invalid date '{}' (use YYYY-MM-DD or \"YYYY-MM-DD HH:MM\")", s))
}

pub fn cmd_init(db_path: &Path) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path)?;
    let users = db.list_users().context("Failed to read users")?;

    println!("✅ Database initialized successfully!");
    if users.is_empty() {
        println!();
        println!("Next steps:");
        println!("  1. Add a user: pula users add <name> --threshold 200");
        println!("  2. Import transactions: pula import --user <name> --file ledger.csv");
        println!("     or try sample data: pula seed --user <name>");
        println!("  3. Forecast: pula forecast --user <name>");
    } else {
        println!("   {} user(s) found", users.len());
    }

    Ok(())
}
