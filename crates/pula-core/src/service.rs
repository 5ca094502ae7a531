//! Application facade over the database and configuration
//!
//! Wires the repository-driven components (forecast engine, alert evaluator,
//! advice generator, legacy calculator) to a [`Database`] using the settings
//! in [`PulaConfig`]. The CLI talks to this type only.

use chrono::{Datelike, Local, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, info};

use crate::advice::{AdviceGenerator, AdviceResult};
use crate::alerts::{AlertEvaluator, AlertReport, AlertStrategy, LegacyCalculator, LegacyForecast};
use crate::categorize::{categorize, Categorization};
use crate::config::PulaConfig;
use crate::db::{Database, TransactionFilter};
use crate::error::{Error, Result};
use crate::forecast::{ForecastEngine, ForecastResult};
use crate::models::{
    Alert, BalancePoint, CategoryTotal, MonthlySummary, NewTransaction, Transaction, User,
};

/// Days of closing balances shown on the dashboard
pub const TREND_DAYS: u32 = 30;

/// Transactions listed on the dashboard
pub const RECENT_COUNT: usize = 5;

/// Categorization for a known user, or an explicit error record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CategorizeResult {
    Categorized(Categorization),
    Error { error: String },
}

/// Everything the summary view shows for one user
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user: User,
    pub current_balance: f64,
    pub month: MonthlySummary,
    /// Expense categories for the current month, largest first
    pub categories: Vec<CategoryTotal>,
    pub balance_trend: Vec<BalancePoint>,
    /// Newest first
    pub recent: Vec<Transaction>,
}

pub struct PulaService {
    db: Database,
    config: PulaConfig,
}

impl PulaService {
    pub fn new(db: Database, config: PulaConfig) -> Self {
        Self { db, config }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn config(&self) -> &PulaConfig {
        &self.config
    }

    /// Look up a user by id, failing with `NotFound`
    pub fn require_user(&self, user_id: i64) -> Result<User> {
        self.db
            .get_user(user_id)?
            .ok_or_else(|| Error::NotFound(format!("user {}", user_id)))
    }

    /// Create a user (or update the threshold of an existing one)
    ///
    /// A missing threshold uses the configured default.
    pub fn add_user(&self, name: &str, threshold: Option<f64>) -> Result<User> {
        let threshold = threshold.unwrap_or(self.config.alerts.default_threshold);
        if !threshold.is_finite() || threshold < 0.0 {
            return Err(Error::InvalidData(format!(
                "alert threshold must be a non-negative number, got {}",
                threshold
            )));
        }
        let id = self.db.upsert_user(name, threshold)?;
        self.require_user(id)
    }

    /// Record a transaction, categorizing it when no category is given
    pub fn record_transaction(
        &self,
        user_id: i64,
        date: NaiveDateTime,
        description: &str,
        amount: f64,
        category: Option<&str>,
    ) -> Result<Transaction> {
        self.require_user(user_id)?;

        let category = match category {
            Some(c) if !c.trim().is_empty() => c.trim().to_string(),
            _ => {
                let result = categorize(description, amount);
                debug!(
                    category = %result.category,
                    confidence = result.confidence,
                    "Auto-categorized transaction"
                );
                result.category
            }
        };

        let new = NewTransaction {
            user_id,
            date,
            amount,
            category,
            description: description.to_string(),
            import_hash: None,
        };
        let id = self
            .db
            .insert_transaction(&new)?
            .ok_or_else(|| Error::InvalidData("transaction was not inserted".to_string()))?;
        self.db
            .get_transaction(id)?
            .ok_or_else(|| Error::NotFound(format!("transaction {}", id)))
    }

    /// Categorize a description on behalf of a user
    pub fn categorize_for_user(&self, user_id: i64, description: &str, amount: f64) -> CategorizeResult {
        match self.db.get_user(user_id) {
            Ok(Some(_)) => CategorizeResult::Categorized(categorize(description, amount)),
            Ok(None) => CategorizeResult::Error {
                error: "User not found".to_string(),
            },
            Err(e) => {
                tracing::error!(user_id, error = %e, "Error categorizing transaction");
                CategorizeResult::Error {
                    error: "Failed to categorize transaction".to_string(),
                }
            }
        }
    }

    fn engine(&self) -> ForecastEngine<'_> {
        ForecastEngine::new(&self.db)
            .with_history_limit(self.config.forecast.history_limit)
            .with_max_days(self.config.forecast.max_days)
    }

    /// Forecast with the configured default horizon unless `days` is given
    pub fn forecast_at(&self, user_id: i64, days: Option<u32>, now: NaiveDateTime) -> ForecastResult {
        let days = days.unwrap_or(self.config.forecast.default_days);
        self.engine().forecast_at(user_id, days, now)
    }

    pub fn forecast(&self, user_id: i64, days: Option<u32>) -> ForecastResult {
        self.forecast_at(user_id, days, Local::now().naive_local())
    }

    fn legacy(&self, user_id: i64) -> LegacyCalculator<'_> {
        LegacyCalculator::new(&self.db, user_id)
            .with_config(self.config.legacy.clone())
            .with_currency(self.config.currency.clone())
    }

    /// Day-by-day projection from the moving-average calculator
    pub fn legacy_forecast_at(&self, user_id: i64, days: Option<u32>, now: NaiveDateTime) -> Result<LegacyForecast> {
        self.require_user(user_id)?;
        let days = days
            .unwrap_or(self.config.forecast.default_days)
            .min(self.config.forecast.max_days);
        self.legacy(user_id).forecast_balance_at(days, now)
    }

    fn evaluator(&self) -> AlertEvaluator<'_> {
        AlertEvaluator::new(&self.db, &self.db, &self.db)
            .with_forecast_days(self.config.forecast.alert_days)
            .with_history_limit(self.config.forecast.history_limit)
            .with_currency(self.config.currency.clone())
    }

    /// Run alert checks for one user with the given (or configured) strategy
    ///
    /// The forecast strategy never fails: unknown users and errors give an
    /// empty report. The legacy strategy surfaces calculator errors.
    pub fn check_alerts_at(
        &self,
        user_id: i64,
        strategy: Option<AlertStrategy>,
        now: NaiveDateTime,
    ) -> Result<AlertReport> {
        let strategy = strategy.unwrap_or(self.config.alerts.strategy);
        debug!(user_id, strategy = %strategy, "Checking alerts");

        match strategy {
            AlertStrategy::Forecast => Ok(AlertReport::Forecast(
                self.evaluator().check_alerts_at(user_id, now),
            )),
            AlertStrategy::Legacy => {
                if self.db.get_user(user_id)?.is_none() {
                    return Ok(AlertReport::Legacy(Vec::new()));
                }
                Ok(AlertReport::Legacy(self.legacy(user_id).generate_alerts_at(now)?))
            }
        }
    }

    pub fn check_alerts(&self, user_id: i64, strategy: Option<AlertStrategy>) -> Result<AlertReport> {
        self.check_alerts_at(user_id, strategy, Local::now().naive_local())
    }

    /// Forecast-strategy alert run across every user
    pub fn check_all_at(&self, now: NaiveDateTime) -> Vec<(User, Vec<Alert>)> {
        let results = self.evaluator().check_all_at(now);
        let total: usize = results.iter().map(|(_, alerts)| alerts.len()).sum();
        info!(users = results.len(), alerts = total, "Batch alert run complete");
        results
    }

    pub fn check_all(&self) -> Vec<(User, Vec<Alert>)> {
        self.check_all_at(Local::now().naive_local())
    }

    /// Stored alerts, newest first
    pub fn list_alerts(&self, user_id: Option<i64>, include_inactive: bool) -> Result<Vec<Alert>> {
        self.db.list_alerts(user_id, include_inactive)
    }

    pub fn dismiss_alert(&self, alert_id: i64) -> Result<()> {
        self.db.deactivate_alert(alert_id)
    }

    pub fn advice_at(&self, user_id: i64, topic: &str, now: NaiveDateTime) -> AdviceResult {
        AdviceGenerator::new(&self.db, &self.db)
            .with_forecast_days(self.config.forecast.advice_days)
            .with_history_limit(self.config.forecast.history_limit)
            .with_currency(self.config.currency.clone())
            .advice_at(user_id, topic, now)
    }

    pub fn advice(&self, user_id: i64, topic: &str) -> AdviceResult {
        self.advice_at(user_id, topic, Local::now().naive_local())
    }

    /// Balance, month totals, category breakdown, trend and recent activity
    pub fn dashboard_at(&self, user_id: i64, now: NaiveDateTime) -> Result<Dashboard> {
        let user = self.require_user(user_id)?;
        let today = now.date();

        let current_balance = self
            .db
            .sum_transactions(&TransactionFilter::for_user(user_id))?;
        let month = self.db.current_month_summary(user_id, today)?;
        let month_start = today.with_day(1).unwrap_or(today);
        let categories = self.db.category_breakdown(user_id, month_start, today)?;
        let balance_trend = self.db.balance_trend(user_id, today, TREND_DAYS)?;
        let recent = self.db.query_transactions(
            &TransactionFilter::for_user(user_id)
                .newest_first(true)
                .limit(Some(RECENT_COUNT)),
        )?;

        Ok(Dashboard {
            user,
            current_balance,
            month,
            categories,
            balance_trend,
            recent,
        })
    }

    pub fn dashboard(&self, user_id: i64) -> Result<Dashboard> {
        self.dashboard_at(user_id, Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::at;

    fn service() -> PulaService {
        PulaService::new(Database::in_memory().unwrap(), PulaConfig::default())
    }

    #[test]
    fn test_add_user_uses_default_threshold() {
        let svc = service();
        let user = svc.add_user("neo", None).unwrap();
        assert_eq!(user.alert_threshold, 100.0);

        let user = svc.add_user("neo", Some(250.0)).unwrap();
        assert_eq!(user.alert_threshold, 250.0);
        assert_eq!(svc.db().list_users().unwrap().len(), 1);

        assert!(svc.add_user("kabo", Some(-1.0)).is_err());
    }

    #[test]
    fn test_record_transaction_auto_categorizes() {
        let svc = service();
        let user = svc.add_user("neo", None).unwrap();

        let tx = svc
            .record_transaction(user.id, at(2026, 3, 1, 9), "Choppies Groceries", -150.0, None)
            .unwrap();
        assert_eq!(tx.category, "food");

        let tx = svc
            .record_transaction(user.id, at(2026, 3, 1, 10), "Choppies Groceries", -150.0, Some("gifts"))
            .unwrap();
        assert_eq!(tx.category, "gifts");

        let err = svc
            .record_transaction(99, at(2026, 3, 1, 9), "Taxi", -20.0, None)
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_categorize_for_unknown_user() {
        let svc = service();
        let result = svc.categorize_for_user(5, "Taxi", -20.0);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "User not found" }));

        let user = svc.add_user("neo", None).unwrap();
        let result = svc.categorize_for_user(user.id, "Taxi", -20.0);
        let CategorizeResult::Categorized(c) = result else {
            panic!("expected categorization");
        };
        assert_eq!(c.category, "transport");
    }

    #[test]
    fn test_forecast_horizon_follows_config() {
        let mut config = PulaConfig::default();
        config.forecast.max_days = 90;
        let svc = PulaService::new(Database::in_memory().unwrap(), config);
        let user = svc.add_user("neo", None).unwrap();
        let now = at(2026, 3, 10, 12);
        svc.record_transaction(user.id, at(2026, 3, 1, 9), "Salary", 8500.0, None)
            .unwrap();

        let result = svc.forecast_at(user.id, Some(100_000), now);
        assert_eq!(result.forecast_period, 90);
        assert_eq!(result.daily_forecasts.len(), 90);

        let legacy = svc.legacy_forecast_at(user.id, Some(u32::MAX), now).unwrap();
        assert_eq!(legacy.days_ahead, 90);
    }

    #[test]
    fn test_strategy_selection() {
        let svc = service();
        let user = svc.add_user("neo", None).unwrap();
        let now = at(2026, 3, 10, 12);
        svc.record_transaction(user.id, at(2026, 3, 1, 9), "Salary", 50.0, Some("salary"))
            .unwrap();

        let report = svc.check_alerts_at(user.id, Some(AlertStrategy::Legacy), now).unwrap();
        let AlertReport::Legacy(alerts) = report else {
            panic!("expected legacy report");
        };
        assert!(alerts.iter().any(|a| a.message.contains("P50.00")));
        // Legacy alerts are display-only
        assert!(svc.list_alerts(Some(user.id), true).unwrap().is_empty());

        let report = svc.check_alerts_at(user.id, None, now).unwrap();
        assert!(matches!(report, AlertReport::Forecast(_)));

        let unknown = svc.check_alerts_at(77, Some(AlertStrategy::Legacy), now).unwrap();
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_dashboard() {
        let svc = service();
        let user = svc.add_user("neo", None).unwrap();
        svc.record_transaction(user.id, at(2026, 3, 1, 9), "Salary", 3000.0, Some("salary"))
            .unwrap();
        svc.record_transaction(user.id, at(2026, 3, 2, 9), "Rent", -1000.0, Some("housing"))
            .unwrap();
        svc.record_transaction(user.id, at(2026, 2, 20, 9), "Taxi", -20.0, Some("transport"))
            .unwrap();

        let dash = svc.dashboard_at(user.id, at(2026, 3, 5, 12)).unwrap();
        assert_eq!(dash.current_balance, 1980.0);
        assert_eq!(dash.month.income, 3000.0);
        assert_eq!(dash.month.expenses, 1000.0);
        assert_eq!(dash.categories.len(), 1);
        assert_eq!(dash.categories[0].category, "housing");
        assert_eq!(dash.balance_trend.len(), TREND_DAYS as usize);
        assert_eq!(dash.recent[0].description, "Rent");

        assert!(svc.dashboard_at(42, at(2026, 3, 5, 12)).is_err());
    }
}
