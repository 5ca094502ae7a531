//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn new_tx(user_id: i64, date: chrono::NaiveDateTime, amount: f64, category: &str) -> NewTransaction {
        NewTransaction {
            user_id,
            date,
            amount,
            category: category.to_string(),
            description: format!("{} entry", category),
            import_hash: None,
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        assert!(db.list_users().unwrap().is_empty());
        assert_eq!(db.count_transactions(None).unwrap(), 0);
    }

    #[test]
    fn test_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('alerts') WHERE name IN ('id', 'user_id', 'alert_type', 'message', 'severity', 'metadata', 'is_active', 'created_at')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 8, "alerts table should have 8 expected columns");
    }

    #[test]
    fn test_migrations_are_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pula.db");
        let path = path.to_string_lossy();

        let db = Database::new(&path).unwrap();
        db.upsert_user("Kagiso", 100.0).unwrap();
        drop(db);

        let reopened = Database::new(&path).unwrap();
        assert_eq!(reopened.list_users().unwrap().len(), 1);
    }

    #[test]
    fn test_user_crud() {
        let db = Database::in_memory().unwrap();

        let id = db.upsert_user("Kagiso", 150.0).unwrap();
        assert!(id > 0);

        // Upsert same name returns same ID
        assert_eq!(db.upsert_user("Kagiso", 999.0).unwrap(), id);

        let user = db.get_user(id).unwrap().unwrap();
        assert_eq!(user.name, "Kagiso");
        assert_eq!(user.alert_threshold, 150.0);

        db.set_alert_threshold(id, 250.0).unwrap();
        let user = db.get_user_by_name("Kagiso").unwrap().unwrap();
        assert_eq!(user.alert_threshold, 250.0);

        assert!(db.get_user(id + 100).unwrap().is_none());
        assert!(matches!(
            db.set_alert_threshold(id + 100, 1.0),
            Err(crate::error::Error::NotFound(_))
        ));
    }

    #[test]
    fn test_transaction_crud() {
        let db = Database::in_memory().unwrap();
        let uid = db.upsert_user("Neo", 100.0).unwrap();

        let id = db
            .insert_transaction(&new_tx(uid, at(2026, 3, 2, 8), -45.5, "food"))
            .unwrap()
            .unwrap();

        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.amount, -45.5);
        assert_eq!(tx.date, at(2026, 3, 2, 8));
        assert_eq!(tx.kind(), TransactionKind::Expense);

        db.update_transaction(
            id,
            &TransactionUpdate {
                amount: Some(-50.0),
                category: Some("transport".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let tx = db.get_transaction(id).unwrap().unwrap();
        assert_eq!(tx.amount, -50.0);
        assert_eq!(tx.category, "transport");
        assert_eq!(tx.description, "food entry");

        assert!(db.delete_transaction(id).unwrap());
        assert!(!db.delete_transaction(id).unwrap());
        assert!(db.get_transaction(id).unwrap().is_none());
        assert!(db.update_transaction(id, &TransactionUpdate::default()).is_err());
    }

    #[test]
    fn test_insert_rejects_non_finite_amount() {
        let db = Database::in_memory().unwrap();
        let uid = db.upsert_user("Neo", 100.0).unwrap();
        let result = db.insert_transaction(&new_tx(uid, at(2026, 3, 2, 8), f64::NAN, "food"));
        assert!(result.is_err());
    }

    #[test]
    fn test_import_hash_dedupe() {
        let db = Database::in_memory().unwrap();
        let uid = db.upsert_user("Neo", 100.0).unwrap();

        let mut tx = new_tx(uid, at(2026, 3, 2, 8), -20.0, "food");
        tx.import_hash = Some("abc123".into());

        assert!(db.insert_transaction(&tx).unwrap().is_some());
        assert!(db.insert_transaction(&tx).unwrap().is_none());

        // Manual entries without a hash are never duplicates
        tx.import_hash = None;
        assert!(db.insert_transaction(&tx).unwrap().is_some());
        assert!(db.insert_transaction(&tx).unwrap().is_some());
        assert_eq!(db.count_transactions(Some(uid)).unwrap(), 3);
    }

    #[test]
    fn test_clear_transactions_scoped_to_user() {
        let db = Database::in_memory().unwrap();
        let neo = db.upsert_user("Neo", 100.0).unwrap();
        let kabo = db.upsert_user("Kabo", 100.0).unwrap();
        db.insert_transaction(&new_tx(neo, at(2026, 3, 1, 8), -20.0, "food")).unwrap();
        db.insert_transaction(&new_tx(neo, at(2026, 3, 2, 8), -30.0, "food")).unwrap();
        db.insert_transaction(&new_tx(kabo, at(2026, 3, 2, 8), 50.0, "salary")).unwrap();

        assert_eq!(db.clear_transactions(neo).unwrap(), 2);
        assert_eq!(db.count_transactions(Some(neo)).unwrap(), 0);
        assert_eq!(db.count_transactions(Some(kabo)).unwrap(), 1);
    }

    #[test]
    fn test_query_and_recent() {
        let db = Database::in_memory().unwrap();
        let uid = db.upsert_user("Neo", 100.0).unwrap();
        let other = db.upsert_user("Mpho", 100.0).unwrap();

        for day in 1..=10 {
            db.insert_transaction(&new_tx(uid, at(2026, 3, day, 9), -(day as f64), "food"))
                .unwrap();
        }
        db.insert_transaction(&new_tx(uid, at(2026, 3, 5, 12), 500.0, "salary"))
            .unwrap();
        db.insert_transaction(&new_tx(other, at(2026, 3, 5, 12), 900.0, "salary"))
            .unwrap();

        // Most recent three, ascending
        let recent = db.recent_transactions(uid, 3).unwrap();
        let days: Vec<u32> = recent.iter().map(|t| chrono::Datelike::day(&t.date)).collect();
        assert_eq!(days, vec![8, 9, 10]);

        let income = db
            .query_transactions(
                &TransactionFilter::for_user(uid).kind(Some(TransactionKind::Income)),
            )
            .unwrap();
        assert_eq!(income.len(), 1);
        assert_eq!(income[0].amount, 500.0);

        let window = db
            .query_transactions(
                &TransactionFilter::for_user(uid)
                    .since(Some(at(2026, 3, 3, 0)))
                    .until(Some(at(2026, 3, 4, 23))),
            )
            .unwrap();
        assert_eq!(window.len(), 2);

        let total = db.sum_transactions(&TransactionFilter::for_user(uid)).unwrap();
        assert!((total - (500.0 - 55.0)).abs() < 1e-9);
    }

    #[test]
    fn test_sum_by_category() {
        let db = Database::in_memory().unwrap();
        let uid = db.upsert_user("Neo", 100.0).unwrap();

        db.insert_transaction(&new_tx(uid, at(2026, 3, 1, 9), -30.0, "food")).unwrap();
        db.insert_transaction(&new_tx(uid, at(2026, 3, 2, 9), -20.0, "food")).unwrap();
        db.insert_transaction(&new_tx(uid, at(2026, 3, 2, 9), -70.0, "transport")).unwrap();

        let totals = db
            .sum_by_category(&TransactionFilter::for_user(uid).kind(Some(TransactionKind::Expense)))
            .unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "transport");
        assert_eq!(totals[0].amount, 70.0);
        assert_eq!(totals[1].category, "food");
        assert_eq!(totals[1].amount, 50.0);
        assert_eq!(totals[1].count, 2);
    }

    #[test]
    fn test_alert_log() {
        let db = Database::in_memory().unwrap();
        let uid = db.upsert_user("Neo", 100.0).unwrap();

        let id = db
            .insert_alert(&NewAlert {
                user_id: uid,
                alert_type: AlertType::CashShortfall,
                message: "Balance goes negative in 3 days".into(),
                severity: AlertSeverity::Critical,
                metadata: serde_json::json!({ "days_until": 3 }),
            })
            .unwrap();

        let alert = db.get_alert(id).unwrap().unwrap();
        assert_eq!(alert.alert_type, AlertType::CashShortfall);
        assert_eq!(alert.severity, AlertSeverity::Critical);
        assert_eq!(alert.metadata["days_until"], 3);
        assert!(alert.is_active);
        assert_eq!(db.count_active_alerts(uid, AlertType::CashShortfall).unwrap(), 1);

        db.deactivate_alert(id).unwrap();
        assert!(db.list_alerts(Some(uid), false).unwrap().is_empty());
        assert_eq!(db.list_alerts(Some(uid), true).unwrap().len(), 1);
        assert!(db.deactivate_alert(id + 50).is_err());
    }

    #[test]
    fn test_monthly_summary() {
        let db = Database::in_memory().unwrap();
        let uid = db.upsert_user("Neo", 100.0).unwrap();

        db.insert_transaction(&new_tx(uid, at(2026, 3, 1, 0), 1000.0, "salary")).unwrap();
        db.insert_transaction(&new_tx(uid, at(2026, 3, 31, 23), -300.0, "food")).unwrap();
        // Outside the month
        db.insert_transaction(&new_tx(uid, at(2026, 4, 1, 0), -999.0, "food")).unwrap();

        let summary = db.monthly_summary(uid, 2026, 3).unwrap();
        assert_eq!(summary.income, 1000.0);
        assert_eq!(summary.expenses, 300.0);
        assert_eq!(summary.net, 700.0);

        assert!(db.monthly_summary(uid, 2026, 13).is_err());
    }

    #[test]
    fn test_month_bounds_december() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start, at(2025, 12, 1, 0));
        assert_eq!(end.format(TIMESTAMP_FORMAT).to_string(), "2025-12-31 23:59:59");
    }

    #[test]
    fn test_category_breakdown() {
        let db = Database::in_memory().unwrap();
        let uid = db.upsert_user("Neo", 100.0).unwrap();

        db.insert_transaction(&new_tx(uid, at(2026, 3, 10, 18), -60.0, "food")).unwrap();
        db.insert_transaction(&new_tx(uid, at(2026, 3, 11, 7), 400.0, "salary")).unwrap();

        let breakdown = db
            .category_breakdown(
                uid,
                NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
            )
            .unwrap();
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].category, "food");
    }

    #[test]
    fn test_balance_trend() {
        let db = Database::in_memory().unwrap();
        let uid = db.upsert_user("Neo", 100.0).unwrap();

        db.insert_transaction(&new_tx(uid, at(2026, 2, 20, 9), 1000.0, "salary")).unwrap();
        db.insert_transaction(&new_tx(uid, at(2026, 3, 2, 9), -100.0, "food")).unwrap();
        db.insert_transaction(&new_tx(uid, at(2026, 3, 2, 21), -50.0, "food")).unwrap();
        db.insert_transaction(&new_tx(uid, at(2026, 3, 4, 9), 200.0, "freelance")).unwrap();

        let end = NaiveDate::from_ymd_opt(2026, 3, 4).unwrap();
        let trend = db.balance_trend(uid, end, 4).unwrap();
        let balances: Vec<f64> = trend.iter().map(|p| p.balance).collect();
        assert_eq!(balances, vec![1000.0, 850.0, 850.0, 1050.0]);
        assert_eq!(trend[0].date, NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());

        assert!(db.balance_trend(uid, end, 0).unwrap().is_empty());
    }
}
