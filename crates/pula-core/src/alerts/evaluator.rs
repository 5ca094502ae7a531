//! Forecast-driven alert evaluation against per-user thresholds

use chrono::{Duration, Local, NaiveDateTime, NaiveTime, Utc};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::analysis::{whole_days_between, PatternType};
use crate::currency::Currency;
use crate::db::TransactionFilter;
use crate::error::Result;
use crate::forecast::{DailyForecast, ForecastEngine, ForecastResult};
use crate::models::{
    Alert, AlertSeverity, AlertType, NewAlert, Transaction, TransactionKind, User,
};
use crate::store::{AlertStore, TransactionStore, UserStore};

/// Forecast horizon used for alert checks
pub const DEFAULT_ALERT_DAYS: u32 = 14;

/// Recent spending above this multiple of the historical daily average is flagged
const HIGH_SPENDING_FACTOR: f64 = 1.5;
/// Income later than this multiple of the usual interval is overdue
const OVERDUE_FACTOR: f64 = 1.5;
/// Irregular income below this consistency gets a low-severity nudge
const IRREGULAR_CONSISTENCY_FLOOR: f64 = 0.3;
/// Window used for the recent spending rate
const RECENT_SPENDING_DAYS: i64 = 7;

/// Whole days from `now` until midnight at the start of `day`
fn days_until(day: &DailyForecast, now: NaiveDateTime) -> i64 {
    whole_days_between(now, day.date.and_time(NaiveTime::MIN))
}

/// Render a day count without a trailing `.0`
fn format_days(days: f64) -> String {
    if days.fract() == 0.0 {
        format!("{:.0}", days)
    } else {
        format!("{:.1}", days)
    }
}

/// Shortfall and low-balance checks
///
/// A shortfall suppresses the low-balance alert.
pub fn shortfall_alerts(
    user: &User,
    forecast: &ForecastResult,
    now: NaiveDateTime,
    currency: &Currency,
) -> Vec<NewAlert> {
    let mut alerts = Vec::new();

    if let Some(first) = forecast.first_shortfall() {
        let days = days_until(first, now);
        let severity = if days <= 3 {
            AlertSeverity::Critical
        } else if days <= 7 {
            AlertSeverity::High
        } else {
            AlertSeverity::Medium
        };
        let shortfall_amount = first.predicted_balance.abs();

        alerts.push(NewAlert {
            user_id: user.id,
            alert_type: AlertType::CashShortfall,
            message: format!(
                "Warning: Your balance may go negative in {} days. Expected shortfall: {}",
                days,
                currency.format_code(shortfall_amount)
            ),
            severity,
            metadata: json!({
                "days_until": days,
                "shortfall_amount": shortfall_amount,
                "shortfall_date": first.date.format("%Y-%m-%d").to_string(),
            }),
        });
        return alerts;
    }

    let threshold = user.alert_threshold;
    if let Some(first_low) = forecast
        .daily_forecasts
        .iter()
        .filter(|d| d.predicted_balance > 0.0 && d.predicted_balance < threshold)
        .min_by_key(|d| d.date)
    {
        let days = days_until(first_low, now);
        alerts.push(NewAlert {
            user_id: user.id,
            alert_type: AlertType::LowBalance,
            message: format!(
                "Your balance will be low ({}) in {} days. Consider reviewing your spending.",
                currency.format_code(first_low.predicted_balance),
                days
            ),
            severity: AlertSeverity::Medium,
            metadata: json!({
                "days_until": days,
                "predicted_balance": first_low.predicted_balance,
                "threshold": threshold,
            }),
        });
    }

    alerts
}

/// Compare the last week's spending rate with the historical daily average
///
/// `recent_expenses` are the user's expenses from the last seven days.
pub fn spending_alerts(
    user: &User,
    forecast: &ForecastResult,
    recent_expenses: &[Transaction],
    currency: &Currency,
) -> Vec<NewAlert> {
    if recent_expenses.is_empty() {
        return Vec::new();
    }

    let recent_daily = recent_expenses
        .iter()
        .map(|t| t.amount.abs())
        .sum::<f64>()
        / RECENT_SPENDING_DAYS as f64;
    let historical = forecast.expense_analysis.average_daily;

    if historical > 0.0 && recent_daily > historical * HIGH_SPENDING_FACTOR {
        let increase_percent = (recent_daily - historical) / historical * 100.0;
        return vec![NewAlert {
            user_id: user.id,
            alert_type: AlertType::HighSpending,
            message: format!(
                "Your spending has increased significantly. Daily average: {} vs usual {}",
                currency.format_code(recent_daily),
                currency.format_code(historical)
            ),
            severity: AlertSeverity::Medium,
            metadata: json!({
                "recent_daily": recent_daily,
                "historical_daily": historical,
                "increase_percent": increase_percent,
            }),
        }];
    }

    Vec::new()
}

/// Overdue and irregular income checks (independent of each other)
pub fn income_alerts(user: &User, forecast: &ForecastResult) -> Vec<NewAlert> {
    let mut alerts = Vec::new();
    let income = &forecast.income_analysis;
    let frequency = income.frequency_days;

    if let Some(days_since) = income.last_income_days_ago {
        if frequency > 0.0 && days_since as f64 > frequency * OVERDUE_FACTOR {
            alerts.push(NewAlert {
                user_id: user.id,
                alert_type: AlertType::IncomeOverdue,
                message: format!(
                    "It's been {} days since your last income. Your typical frequency is every {} days.",
                    days_since,
                    format_days(frequency)
                ),
                severity: AlertSeverity::Medium,
                metadata: json!({
                    "days_since_income": days_since,
                    "typical_frequency": frequency,
                    "overdue_days": days_since as f64 - frequency,
                }),
            });
        }
    }

    if income.pattern_type == PatternType::Irregular
        && income.income_consistency < IRREGULAR_CONSISTENCY_FLOOR
    {
        alerts.push(NewAlert {
            user_id: user.id,
            alert_type: AlertType::IrregularIncome,
            message: "Your income pattern is highly irregular. Consider building an emergency fund and tracking income sources to better predict cash flow.".to_string(),
            severity: AlertSeverity::Low,
            metadata: json!({
                "consistency_score": income.income_consistency,
                "pattern_type": income.pattern_type.as_str(),
            }),
        });
    }

    alerts
}

/// Runs the alert checks for users and appends what they trigger
pub struct AlertEvaluator<'a> {
    transactions: &'a dyn TransactionStore,
    alerts: &'a dyn AlertStore,
    users: &'a dyn UserStore,
    forecast_days: u32,
    history_limit: Option<usize>,
    currency: Currency,
}

impl<'a> AlertEvaluator<'a> {
    pub fn new(
        transactions: &'a dyn TransactionStore,
        alerts: &'a dyn AlertStore,
        users: &'a dyn UserStore,
    ) -> Self {
        Self {
            transactions,
            alerts,
            users,
            forecast_days: DEFAULT_ALERT_DAYS,
            history_limit: None,
            currency: Currency::default(),
        }
    }

    pub fn with_forecast_days(mut self, days: u32) -> Self {
        self.forecast_days = days;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = Some(limit);
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Check one user now. Unknown users and failures yield an empty list.
    pub fn check_alerts(&self, user_id: i64) -> Vec<Alert> {
        self.check_alerts_at(user_id, Local::now().naive_local())
    }

    /// Check one user with an explicit clock
    pub fn check_alerts_at(&self, user_id: i64, now: NaiveDateTime) -> Vec<Alert> {
        match self.try_check_alerts_at(user_id, now) {
            Ok(alerts) => alerts,
            Err(e) => {
                error!(user_id, error = %e, "Error checking alerts");
                Vec::new()
            }
        }
    }

    /// Check one user, surfacing repository errors
    pub fn try_check_alerts_at(&self, user_id: i64, now: NaiveDateTime) -> Result<Vec<Alert>> {
        let Some(user) = self.users.get_user(user_id)? else {
            debug!(user_id, "Unknown user, no alerts");
            return Ok(Vec::new());
        };

        let mut engine = ForecastEngine::new(self.transactions);
        if let Some(limit) = self.history_limit {
            engine = engine.with_history_limit(limit);
        }
        let forecast = engine.try_forecast_at(user_id, self.forecast_days, now)?;

        let recent_expenses = self.transactions.query_transactions(
            &TransactionFilter::for_user(user_id)
                .kind(Some(TransactionKind::Expense))
                .since(Some(now - Duration::days(RECENT_SPENDING_DAYS))),
        )?;

        let mut triggered = shortfall_alerts(&user, &forecast, now, &self.currency);
        triggered.extend(spending_alerts(
            &user,
            &forecast,
            &recent_expenses,
            &self.currency,
        ));
        triggered.extend(income_alerts(&user, &forecast));

        let mut persisted = Vec::with_capacity(triggered.len());
        for alert in triggered {
            let id = self.alerts.insert_alert(&alert)?;
            persisted.push(Alert {
                id,
                user_id: alert.user_id,
                alert_type: alert.alert_type,
                message: alert.message,
                severity: alert.severity,
                metadata: alert.metadata,
                created_at: Utc::now(),
                is_active: true,
            });
        }

        if !persisted.is_empty() {
            info!(user_id, count = persisted.len(), "Alerts triggered");
        }
        Ok(persisted)
    }

    /// Check every user; one user's failure never stops the rest
    pub fn check_all_at(&self, now: NaiveDateTime) -> Vec<(User, Vec<Alert>)> {
        let users = match self.users.list_users() {
            Ok(users) => users,
            Err(e) => {
                error!(error = %e, "Failed to list users for alert run");
                return Vec::new();
            }
        };

        users
            .into_iter()
            .map(|user| {
                let alerts = match self.try_check_alerts_at(user.id, now) {
                    Ok(alerts) => alerts,
                    Err(e) => {
                        warn!(user_id = user.id, error = %e, "Skipping user after alert failure");
                        Vec::new()
                    }
                };
                (user, alerts)
            })
            .collect()
    }

    /// Check every user now
    pub fn check_all(&self) -> Vec<(User, Vec<Alert>)> {
        self.check_all_at(Local::now().naive_local())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{ExpenseAnalysis, IncomeAnalysis, Variability};
    use crate::test_utils::{at, day_forecast, forecast_with, tx, user, FailingStore, MemoryStore};
    use chrono::NaiveDate;

    fn march(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_shortfall_severity_by_distance() {
        let now = at(2026, 3, 1, 12);
        let u = user(1, 100.0);
        let bwp = Currency::pula();

        // Midnight of 3 March is 1.5 days away: floors to 1
        let soon = forecast_with(vec![day_forecast(march(2), 50.0), day_forecast(march(3), -25.0)]);
        let alerts = shortfall_alerts(&u, &soon, now, &bwp);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::CashShortfall);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert_eq!(alerts[0].metadata["days_until"], 1);
        assert_eq!(alerts[0].metadata["shortfall_date"], "2026-03-03");
        assert!(alerts[0].message.contains("BWP 25.00"));

        let week = forecast_with(vec![day_forecast(march(8), -1.0)]);
        assert_eq!(shortfall_alerts(&u, &week, now, &bwp)[0].severity, AlertSeverity::High);

        let later = forecast_with(vec![day_forecast(march(12), -1.0)]);
        assert_eq!(shortfall_alerts(&u, &later, now, &bwp)[0].severity, AlertSeverity::Medium);
    }

    #[test]
    fn test_low_balance_only_without_shortfall() {
        let now = at(2026, 3, 1, 12);
        let u = user(1, 100.0);
        let bwp = Currency::pula();

        let low = forecast_with(vec![
            day_forecast(march(2), 500.0),
            day_forecast(march(3), 80.0),
            day_forecast(march(4), 40.0),
        ]);
        let alerts = shortfall_alerts(&u, &low, now, &bwp);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::LowBalance);
        assert_eq!(alerts[0].severity, AlertSeverity::Medium);
        assert_eq!(alerts[0].metadata["predicted_balance"], 80.0);
        assert_eq!(alerts[0].metadata["threshold"], 100.0);

        // Exactly zero is neither low nor a shortfall
        let zero = forecast_with(vec![day_forecast(march(2), 0.0)]);
        assert!(shortfall_alerts(&u, &zero, now, &bwp).is_empty());

        let both = forecast_with(vec![day_forecast(march(2), 50.0), day_forecast(march(3), -5.0)]);
        let alerts = shortfall_alerts(&u, &both, now, &bwp);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::CashShortfall);
    }

    #[test]
    fn test_spending_alert_threshold() {
        let u = user(1, 100.0);
        let bwp = Currency::pula();
        let mut forecast = forecast_with(vec![]);
        forecast.expense_analysis.average_daily = 100.0;

        // 1400 over 7 days = 200/day, twice the usual
        let recent = vec![tx(1, at(2026, 3, 1, 9), -1400.0, "food")];
        let alerts = spending_alerts(&u, &forecast, &recent, &bwp);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].alert_type, AlertType::HighSpending);
        assert_eq!(alerts[0].metadata["increase_percent"], 100.0);

        // 1050 over 7 days = exactly 1.5x, not above it
        let recent = vec![tx(1, at(2026, 3, 1, 9), -1050.0, "food")];
        assert!(spending_alerts(&u, &forecast, &recent, &bwp).is_empty());

        forecast.expense_analysis.average_daily = 0.0;
        let recent = vec![tx(1, at(2026, 3, 1, 9), -1400.0, "food")];
        assert!(spending_alerts(&u, &forecast, &recent, &bwp).is_empty());
        assert!(spending_alerts(&u, &forecast, &[], &bwp).is_empty());
    }

    #[test]
    fn test_income_alerts() {
        let u = user(1, 100.0);
        let mut forecast = forecast_with(vec![]);
        forecast.income_analysis = IncomeAnalysis {
            average_daily: 50.0,
            frequency_days: 10.0,
            variability: Variability::High,
            pattern_type: PatternType::Irregular,
            last_income_days_ago: Some(16),
            typical_amount: 500.0,
            income_consistency: 0.1,
        };

        let alerts = income_alerts(&u, &forecast);
        let types: Vec<AlertType> = alerts.iter().map(|a| a.alert_type).collect();
        assert_eq!(types, vec![AlertType::IncomeOverdue, AlertType::IrregularIncome]);
        assert!(alerts[0].message.contains("every 10 days"));
        assert_eq!(alerts[0].metadata["overdue_days"], 6.0);
        assert_eq!(alerts[1].severity, AlertSeverity::Low);

        forecast.income_analysis.last_income_days_ago = Some(15);
        forecast.income_analysis.income_consistency = 0.3;
        assert!(income_alerts(&u, &forecast).is_empty());

        forecast.income_analysis = IncomeAnalysis::no_data();
        assert!(income_alerts(&u, &forecast).is_empty());
    }

    #[test]
    fn test_unknown_user_returns_empty() {
        let store = MemoryStore::new();
        let evaluator = AlertEvaluator::new(&store, &store, &store);
        assert!(evaluator.check_alerts_at(42, at(2026, 3, 1, 12)).is_empty());
        assert!(store.alerts().is_empty());
    }

    #[test]
    fn test_failure_returns_empty() {
        let failing = FailingStore;
        let store = MemoryStore::new().with_users(vec![user(1, 100.0)]);
        let evaluator = AlertEvaluator::new(&failing, &store, &store);
        assert!(evaluator.check_alerts_at(1, at(2026, 3, 1, 12)).is_empty());
        assert!(evaluator.try_check_alerts_at(1, at(2026, 3, 1, 12)).is_err());
    }

    #[test]
    fn test_check_persists_triggered_alerts() {
        let now = at(2026, 3, 10, 12);
        let store = MemoryStore::new()
            .with_users(vec![user(1, 100.0)])
            .with_transactions(vec![
                tx(1, at(2026, 3, 1, 9), 300.0, "business"),
                tx(2, at(2026, 3, 3, 9), -200.0, "food"),
                tx(3, at(2026, 3, 5, 9), -200.0, "food"),
                tx(4, at(2026, 3, 9, 9), 100.0, "business"),
            ]);

        let evaluator = AlertEvaluator::new(&store, &store, &store);
        let alerts = evaluator.check_alerts_at(1, now);

        assert!(!alerts.is_empty());
        assert_eq!(alerts[0].alert_type, AlertType::CashShortfall);
        assert_eq!(alerts[0].severity, AlertSeverity::Critical);
        assert!(alerts.iter().all(|a| a.is_active && a.user_id == 1));
        assert_eq!(store.alerts().len(), alerts.len());

        // Repeated runs append again (no dedup)
        let again = evaluator.check_alerts_at(1, now);
        assert_eq!(store.alerts().len(), alerts.len() + again.len());
    }

    #[test]
    fn test_batch_run_survives_failures() {
        let store = MemoryStore::new().with_users(vec![user(1, 100.0), user(2, 100.0)]);
        let failing = FailingStore;
        let evaluator = AlertEvaluator::new(&failing, &store, &store);

        let results = evaluator.check_all_at(at(2026, 3, 1, 12));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, alerts)| alerts.is_empty()));
    }

    #[test]
    fn test_format_days() {
        assert_eq!(format_days(30.0), "30");
        assert_eq!(format_days(15.5), "15.5");
    }

    #[test]
    fn test_empty_expense_analysis_no_spending_alert() {
        let u = user(1, 100.0);
        let mut forecast = forecast_with(vec![]);
        forecast.expense_analysis = ExpenseAnalysis::no_data();
        let recent = vec![tx(1, at(2026, 3, 1, 9), -10.0, "food")];
        assert!(spending_alerts(&u, &forecast, &recent, &Currency::pula()).is_empty());
    }
}
