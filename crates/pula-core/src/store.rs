//! Repository abstraction consumed by the forecasting and alerting pipeline
//!
//! The analyzer, forecast engine and alert evaluator never touch SQLite
//! directly. They receive these traits, so the same code runs against
//! [`Database`] in production and an in-memory store in tests.
//!
//! - `TransactionStore`: bounded, filtered ledger reads and sum aggregation
//! - `AlertStore`: append-only alert log
//! - `UserStore`: per-user preferences (alert threshold)

use crate::db::{Database, TransactionFilter};
use crate::error::Result;
use crate::models::{NewAlert, Transaction, User};

/// Read access to the transaction ledger
pub trait TransactionStore {
    /// Transactions matching the filter, ordered and bounded by it
    fn query_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>>;

    /// The `limit` most recent transactions of a user, in ascending date order
    fn recent_transactions(&self, user_id: i64, limit: usize) -> Result<Vec<Transaction>> {
        let filter = TransactionFilter::for_user(user_id)
            .newest_first(true)
            .limit(Some(limit));
        let mut transactions = self.query_transactions(&filter)?;
        transactions.reverse();
        Ok(transactions)
    }

    /// Sum of signed amounts matching the filter
    fn sum_transactions(&self, filter: &TransactionFilter) -> Result<f64> {
        let unbounded = filter.clone().limit(None);
        Ok(self
            .query_transactions(&unbounded)?
            .iter()
            .map(|t| t.amount)
            .sum())
    }
}

/// Append-only sink for alerts
pub trait AlertStore {
    /// Persist an alert and return its id
    fn insert_alert(&self, alert: &NewAlert) -> Result<i64>;
}

/// User lookup
pub trait UserStore {
    fn get_user(&self, id: i64) -> Result<Option<User>>;

    fn list_users(&self) -> Result<Vec<User>>;
}

impl TransactionStore for Database {
    fn query_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        Database::query_transactions(self, filter)
    }

    fn recent_transactions(&self, user_id: i64, limit: usize) -> Result<Vec<Transaction>> {
        Database::recent_transactions(self, user_id, limit)
    }

    fn sum_transactions(&self, filter: &TransactionFilter) -> Result<f64> {
        Database::sum_transactions(self, filter)
    }
}

impl AlertStore for Database {
    fn insert_alert(&self, alert: &NewAlert) -> Result<i64> {
        Database::insert_alert(self, alert)
    }
}

impl UserStore for Database {
    fn get_user(&self, id: i64) -> Result<Option<User>> {
        Database::get_user(self, id)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Database::list_users(self)
    }
}
