//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::io::Write;

use chrono::{Datelike, Timelike};
use clap::Parser;
use pula_core::config::PulaConfig;
use pula_core::db::Database;
use pula_core::PulaService;

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate};

fn setup_service() -> PulaService {
    PulaService::new(Database::in_memory().unwrap(), PulaConfig::default())
}

fn setup_with_user() -> PulaService {
    let svc = setup_service();
    svc.add_user("neo", Some(150.0)).unwrap();
    svc
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("Choppies Groceries Gaborone", 12), "Choppies ...");
    // Multi-byte characters are not split
    assert_eq!(truncate("Mošupi Pharmacy", 6), "Moš...");
}

#[test]
fn test_parse_date_arg() {
    let dt = commands::parse_date_arg(Some("2026-03-04")).unwrap();
    assert_eq!((dt.year(), dt.month(), dt.day(), dt.hour()), (2026, 3, 4, 12));

    let dt = commands::parse_date_arg(Some("2026-03-04 07:15")).unwrap();
    assert_eq!((dt.hour(), dt.minute()), (7, 15));

    assert!(commands::parse_date_arg(Some("04/03/2026")).is_err());
    assert!(commands::parse_date_arg(None).is_ok());
}

#[test]
fn test_resolve_user_by_name_or_id() {
    let svc = setup_with_user();
    let by_name = commands::resolve_user(&svc, "neo").unwrap();
    let by_id = commands::resolve_user(&svc, &by_name.id.to_string()).unwrap();
    assert_eq!(by_name.id, by_id.id);
    assert!(commands::resolve_user(&svc, "nobody").is_err());
}

#[test]
fn test_resolve_db_path_explicit() {
    let path = std::path::Path::new("/tmp/custom.db");
    assert_eq!(commands::resolve_db_path(Some(path)).unwrap(), path);
}

// ========== Init Tests ==========

#[test]
fn test_cmd_init_creates_database() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("pula.db");

    commands::cmd_init(&db_path).unwrap();
    assert!(db_path.exists());

    // Idempotent
    commands::cmd_init(&db_path).unwrap();
}

// ========== Users Command Tests ==========

#[test]
fn test_cmd_users_add_and_threshold() {
    let svc = setup_service();
    commands::cmd_users_add(&svc, "kabo", None).unwrap();

    let user = svc.db().get_user_by_name("kabo").unwrap().unwrap();
    assert_eq!(user.alert_threshold, 100.0);

    commands::cmd_users_threshold(&svc, "kabo", 400.0).unwrap();
    let user = svc.db().get_user(user.id).unwrap().unwrap();
    assert_eq!(user.alert_threshold, 400.0);

    assert!(commands::cmd_users_threshold(&svc, "kabo", -5.0).is_err());
    assert!(commands::cmd_users_list(&svc).is_ok());
}

// ========== Transaction Command Tests ==========

#[test]
fn test_cmd_add_auto_categorizes() {
    let svc = setup_with_user();
    commands::cmd_add(&svc, "neo", -150.0, "Choppies Groceries", None, Some("2026-03-01")).unwrap();
    commands::cmd_add(&svc, "neo", 900.0, "Piece job", Some("business"), Some("2026-03-02")).unwrap();

    let user = svc.db().get_user_by_name("neo").unwrap().unwrap();
    let txs = svc.db().recent_transactions(user.id, 10).unwrap();
    assert_eq!(txs.len(), 2);
    assert_eq!(txs[0].category, "food");
    assert_eq!(txs[1].category, "business");

    assert!(commands::cmd_add(&svc, "ghost", -10.0, "Taxi", None, None).is_err());
}

#[test]
fn test_cmd_transactions_list_filters() {
    let svc = setup_with_user();
    commands::cmd_add(&svc, "neo", -20.0, "Taxi", None, Some("2026-03-01")).unwrap();

    assert!(commands::cmd_transactions_list(&svc, Some("neo"), 20, Some("expense"), None).is_ok());
    assert!(commands::cmd_transactions_list(&svc, None, 5, None, Some("transport")).is_ok());
    assert!(commands::cmd_transactions_list(&svc, None, 5, Some("sideways"), None).is_err());
}

#[test]
fn test_cmd_transactions_edit_and_delete() {
    let svc = setup_with_user();
    commands::cmd_add(&svc, "neo", -20.0, "Taxi", None, Some("2026-03-01")).unwrap();
    let user = svc.db().get_user_by_name("neo").unwrap().unwrap();
    let id = svc.db().recent_transactions(user.id, 1).unwrap()[0].id;

    commands::cmd_transactions_edit(&svc, id, Some(-35.0), None, Some("transport".into()), None)
        .unwrap();
    let tx = svc.db().get_transaction(id).unwrap().unwrap();
    assert_eq!(tx.amount, -35.0);
    assert_eq!(tx.description, "Taxi");

    // Nothing to change
    assert!(commands::cmd_transactions_edit(&svc, id, None, None, None, None).is_err());
    assert!(commands::cmd_transactions_edit(&svc, 9999, Some(1.0), None, None, None).is_err());

    commands::cmd_transactions_delete(&svc, id).unwrap();
    assert!(svc.db().get_transaction(id).unwrap().is_none());
    assert!(commands::cmd_transactions_delete(&svc, id).is_err());
}

// ========== Import / Seed Tests ==========

#[test]
fn test_cmd_import() {
    let svc = setup_with_user();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "date,description,amount,category").unwrap();
    writeln!(file, "2026-03-01,Salary,8500,").unwrap();
    writeln!(file, "2026-03-02,Combi to work,-12,transport").unwrap();

    commands::cmd_import(&svc, "neo", file.path()).unwrap();
    // Re-import skips duplicates
    commands::cmd_import(&svc, "neo", file.path()).unwrap();

    let user = svc.db().get_user_by_name("neo").unwrap().unwrap();
    assert_eq!(svc.db().count_transactions(Some(user.id)).unwrap(), 2);

    let missing = std::path::Path::new("/nonexistent/ledger.csv");
    assert!(commands::cmd_import(&svc, "neo", missing).is_err());
}

#[test]
fn test_cmd_import_rejects_bad_rows() {
    let svc = setup_with_user();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "date,description,amount").unwrap();
    writeln!(file, "2026-03-01,Salary,lots").unwrap();

    let err = commands::cmd_import(&svc, "neo", file.path()).unwrap_err();
    assert!(err.to_string().contains("Import failed"));

    let user = svc.db().get_user_by_name("neo").unwrap().unwrap();
    assert_eq!(svc.db().count_transactions(Some(user.id)).unwrap(), 0);
}

#[test]
fn test_cmd_seed() {
    let svc = setup_with_user();
    commands::cmd_seed(&svc, "neo").unwrap();
    let user = svc.db().get_user_by_name("neo").unwrap().unwrap();
    assert!(svc.db().count_transactions(Some(user.id)).unwrap() > 40);
}

// ========== Forecast / Alerts / Advice Tests ==========

#[test]
fn test_cmd_forecast_variants() {
    let svc = setup_with_user();
    commands::cmd_seed(&svc, "neo").unwrap();

    assert!(commands::cmd_forecast(&svc, "neo", Some(14), false, false).is_ok());
    assert!(commands::cmd_forecast(&svc, "neo", None, false, true).is_ok());
    assert!(commands::cmd_forecast(&svc, "neo", Some(7), true, false).is_ok());
    assert!(commands::cmd_forecast(&svc, "ghost", None, false, false).is_err());
}

#[test]
fn test_forecast_days_range() {
    let cli = Cli::try_parse_from(["pula", "forecast", "--user", "neo", "--days", "90"]).unwrap();
    let Commands::Forecast { days, .. } = cli.command else {
        panic!("expected forecast command");
    };
    assert_eq!(days, Some(90));

    assert!(Cli::try_parse_from(["pula", "forecast", "--user", "neo", "--days", "200000000"]).is_err());
    assert!(Cli::try_parse_from(["pula", "forecast", "--user", "neo", "--days", "0"]).is_err());
}

#[test]
fn test_cmd_forecast_huge_horizon() {
    let svc = setup_with_user();
    commands::cmd_seed(&svc, "neo").unwrap();
    assert!(commands::cmd_forecast(&svc, "neo", Some(u32::MAX), false, true).is_ok());
}

#[test]
fn test_cmd_forecast_without_history() {
    let svc = setup_with_user();
    assert!(commands::cmd_forecast(&svc, "neo", None, false, false).is_ok());
}

#[test]
fn test_cmd_explain() {
    assert!(commands::cmd_explain(false).is_ok());
    assert!(commands::cmd_explain(true).is_ok());
}

#[test]
fn test_cmd_alerts_workflow() {
    let svc = setup_with_user();
    commands::cmd_seed(&svc, "neo").unwrap();

    commands::cmd_alerts_check(&svc, "neo", Some("forecast"), false).unwrap();
    commands::cmd_alerts_check(&svc, "neo", Some("legacy"), true).unwrap();
    assert!(commands::cmd_alerts_check(&svc, "neo", Some("psychic"), false).is_err());

    let user = svc.db().get_user_by_name("neo").unwrap().unwrap();
    let stored = svc.list_alerts(Some(user.id), false).unwrap();
    assert!(!stored.is_empty());

    commands::cmd_alerts_list(&svc, Some("neo"), false).unwrap();
    commands::cmd_alerts_dismiss(&svc, stored[0].id).unwrap();
    assert_eq!(
        svc.list_alerts(Some(user.id), false).unwrap().len(),
        stored.len() - 1
    );
    assert!(commands::cmd_alerts_dismiss(&svc, 424242).is_err());

    commands::cmd_alerts_check_all(&svc).unwrap();
}

#[test]
fn test_cmd_advice() {
    let svc = setup_with_user();
    commands::cmd_seed(&svc, "neo").unwrap();
    assert!(commands::cmd_advice(&svc, "neo", "high_spending", false).is_ok());
    assert!(commands::cmd_advice(&svc, "neo", "unknown_topic", true).is_ok());
    assert!(commands::cmd_advice(&svc, "ghost", "general", false).is_err());
}

#[test]
fn test_cmd_categorize() {
    assert!(commands::cmd_categorize(None, "Choppies Groceries", -150.0, None, false).is_ok());

    let svc = setup_with_user();
    assert!(commands::cmd_categorize(Some(&svc), "Taxi", -20.0, Some("neo"), true).is_ok());
    assert!(commands::cmd_categorize(Some(&svc), "Taxi", -20.0, Some("ghost"), false).is_err());
}

#[test]
fn test_cmd_summary() {
    let svc = setup_with_user();
    assert!(commands::cmd_summary(&svc, "neo", false).is_ok());

    commands::cmd_seed(&svc, "neo").unwrap();
    assert!(commands::cmd_summary(&svc, "neo", false).is_ok());
    assert!(commands::cmd_summary(&svc, "neo", true).is_ok());
}
