//! Forecast engine: drives the predictor across the horizon

use chrono::{Duration, Local, NaiveDateTime};
use tracing::{debug, error, warn};

use super::{generate_insights, predictor, DailyForecast, ForecastResult, MAX_FORECAST_DAYS};
use crate::analysis::{analyze_expenses, analyze_income};
use crate::error::Result;
use crate::store::TransactionStore;

/// Default number of recent transactions analysed per forecast
pub const DEFAULT_HISTORY_LIMIT: usize = 200;

/// Projects a user's balance forward from their recent ledger
pub struct ForecastEngine<'a> {
    store: &'a dyn TransactionStore,
    history_limit: usize,
    max_days: u32,
}

impl<'a> ForecastEngine<'a> {
    pub fn new(store: &'a dyn TransactionStore) -> Self {
        Self {
            store,
            history_limit: DEFAULT_HISTORY_LIMIT,
            max_days: MAX_FORECAST_DAYS,
        }
    }

    /// Override how many recent transactions are analysed
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    /// Cap the horizon; longer requests are shortened to this many days
    pub fn with_max_days(mut self, days: u32) -> Self {
        self.max_days = days.clamp(1, MAX_FORECAST_DAYS);
        self
    }

    fn horizon(&self, days: u32) -> u32 {
        days.min(self.max_days)
    }

    /// Forecast `days` days ahead from the current local time
    ///
    /// Never fails: repository errors are logged and the empty forecast is
    /// returned instead.
    pub fn forecast(&self, user_id: i64, days: u32) -> ForecastResult {
        self.forecast_at(user_id, days, Local::now().naive_local())
    }

    /// Like [`forecast`](Self::forecast) with an explicit clock
    pub fn forecast_at(&self, user_id: i64, days: u32, now: NaiveDateTime) -> ForecastResult {
        match self.try_forecast_at(user_id, days, now) {
            Ok(result) => result,
            Err(e) => {
                error!(user_id, error = %e, "Error generating forecast");
                ForecastResult::empty(self.horizon(days), now)
            }
        }
    }

    /// Forecast from the current local time, surfacing repository errors
    pub fn try_forecast(&self, user_id: i64, days: u32) -> Result<ForecastResult> {
        self.try_forecast_at(user_id, days, Local::now().naive_local())
    }

    /// Forecast with an explicit clock, surfacing repository errors
    pub fn try_forecast_at(
        &self,
        user_id: i64,
        days: u32,
        now: NaiveDateTime,
    ) -> Result<ForecastResult> {
        let requested = days;
        let days = self.horizon(requested);
        if days < requested {
            warn!(user_id, requested, days, "Forecast horizon shortened");
        }

        let transactions = self.store.recent_transactions(user_id, self.history_limit)?;
        if transactions.is_empty() {
            debug!(user_id, "No transactions, returning empty forecast");
            return Ok(ForecastResult::empty(days, now));
        }

        let current_balance: f64 = transactions.iter().map(|t| t.amount).sum();
        let income = analyze_income(&transactions, now);
        let expenses = analyze_expenses(&transactions);

        let today = now.date();
        let mut running_balance = current_balance;
        let mut daily_forecasts = Vec::with_capacity(days as usize);

        for offset in 1..=i64::from(days) {
            let date = today + Duration::days(offset);
            let predicted_income = predictor::predict_income(date, &income);
            let predicted_expenses = predictor::predict_expenses(date, &expenses);

            let net_change = predicted_income + predicted_expenses;
            running_balance += net_change;

            daily_forecasts.push(DailyForecast {
                date,
                predicted_income,
                predicted_expenses: predicted_expenses.abs(),
                net_change,
                predicted_balance: running_balance,
                confidence: predictor::prediction_confidence(date, today, &income, &expenses),
            });
        }

        let shortfalls: Vec<DailyForecast> = daily_forecasts
            .iter()
            .filter(|d| d.predicted_balance < 0.0)
            .cloned()
            .collect();

        let insights = generate_insights(&daily_forecasts, &income, &expenses);

        debug!(
            user_id,
            transactions = transactions.len(),
            current_balance,
            shortfall_days = shortfalls.len(),
            "Generated forecast"
        );

        Ok(ForecastResult {
            current_balance,
            forecast_period: days,
            daily_forecasts,
            shortfalls,
            insights,
            income_analysis: income,
            expense_analysis: expenses,
            generated_at: now,
        })
    }
}
