//! Test utilities for pula-core
//!
//! Fixture builders and in-memory repositories so the forecasting and
//! alerting pipeline can be exercised without SQLite.

use chrono::{NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::cell::RefCell;

use crate::analysis::{ExpenseAnalysis, IncomeAnalysis};
use crate::db::TransactionFilter;
use crate::error::{Error, Result};
use crate::forecast::{DailyForecast, ForecastResult};
use crate::models::{NewAlert, Transaction, User};
use crate::store::{AlertStore, TransactionStore, UserStore};

/// Timestamp at the top of an hour
pub fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, 0, 0))
        .unwrap_or_else(|| panic!("invalid fixture date {}-{}-{} {}h", year, month, day, hour))
}

/// Transaction for user 1
pub fn tx(id: i64, date: NaiveDateTime, amount: f64, category: &str) -> Transaction {
    Transaction {
        id,
        user_id: 1,
        date,
        amount,
        category: category.to_string(),
        description: format!("{} {}", category, id),
        import_hash: None,
        created_at: Utc.from_utc_datetime(&date),
    }
}

pub fn user(id: i64, threshold: f64) -> User {
    User {
        id,
        name: format!("user{}", id),
        alert_threshold: threshold,
        created_at: Utc::now(),
    }
}

/// Forecast day with only a predicted balance filled in
pub fn day_forecast(date: NaiveDate, balance: f64) -> DailyForecast {
    DailyForecast {
        date,
        predicted_income: 0.0,
        predicted_expenses: 0.0,
        net_change: 0.0,
        predicted_balance: balance,
        confidence: 0.5,
    }
}

/// Forecast result around the given days with no-data analyses
pub fn forecast_with(days: Vec<DailyForecast>) -> ForecastResult {
    let shortfalls = days
        .iter()
        .filter(|d| d.predicted_balance < 0.0)
        .cloned()
        .collect();

    ForecastResult {
        current_balance: 0.0,
        forecast_period: days.len() as u32,
        daily_forecasts: days,
        shortfalls,
        insights: Vec::new(),
        income_analysis: IncomeAnalysis::no_data(),
        expense_analysis: ExpenseAnalysis::no_data(),
        generated_at: at(2026, 3, 1, 12),
    }
}

/// In-memory ledger, user list and alert log
#[derive(Default)]
pub struct MemoryStore {
    transactions: Vec<Transaction>,
    users: Vec<User>,
    alerts: RefCell<Vec<NewAlert>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_users(mut self, users: Vec<User>) -> Self {
        self.users = users;
        self
    }

    /// Alerts inserted so far, in insertion order
    pub fn alerts(&self) -> Vec<NewAlert> {
        self.alerts.borrow().clone()
    }
}

impl TransactionStore for MemoryStore {
    fn query_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        Ok(filter.apply(&self.transactions))
    }
}

impl AlertStore for MemoryStore {
    fn insert_alert(&self, alert: &NewAlert) -> Result<i64> {
        let mut alerts = self.alerts.borrow_mut();
        alerts.push(alert.clone());
        Ok(alerts.len() as i64)
    }
}

impl UserStore for MemoryStore {
    fn get_user(&self, id: i64) -> Result<Option<User>> {
        Ok(self.users.iter().find(|u| u.id == id).cloned())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.users.clone())
    }
}

/// Repository whose every call fails
pub struct FailingStore;

fn unavailable() -> Error {
    Error::InvalidData("store unavailable".to_string())
}

impl TransactionStore for FailingStore {
    fn query_transactions(&self, _filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        Err(unavailable())
    }
}

impl AlertStore for FailingStore {
    fn insert_alert(&self, _alert: &NewAlert) -> Result<i64> {
        Err(unavailable())
    }
}

impl UserStore for FailingStore {
    fn get_user(&self, _id: i64) -> Result<Option<User>> {
        Err(unavailable())
    }

    fn list_users(&self) -> Result<Vec<User>> {
        Err(unavailable())
    }
}
