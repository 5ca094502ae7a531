//! Single-ledger calculator with flat balance thresholds
//!
//! Works from a moving window of daily totals rather than the pattern
//! analyzer: every day in the window gets an income and expense bucket
//! (empty days count as zero), and the projection adds half the daily expense
//! volatility to each day's spending.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, Local, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::{mean, median, sample_std_dev};
use crate::config::LegacyConfig;
use crate::currency::Currency;
use crate::db::{month_bounds, TransactionFilter};
use crate::error::Result;
use crate::forecast::MAX_FORECAST_DAYS;
use crate::models::{MonthlySummary, TransactionKind};
use crate::store::TransactionStore;

const WEEKEND_EXPENSE_FACTOR: f64 = 1.2;
const VOLATILITY_BUFFER: f64 = 0.5;
const WEEKLY_HORIZON: u32 = 7;
const MONTHLY_HORIZON: u32 = 30;

/// Daily statistics over the moving window (expenses as magnitudes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub avg_daily_income: f64,
    pub avg_daily_expenses: f64,
    pub median_daily_expenses: f64,
    /// Sample standard deviation of daily expenses
    pub expense_volatility: f64,
    pub avg_daily_net: f64,
    /// Net (income - expenses) per day in the window, oldest first
    pub daily_nets: Vec<(NaiveDate, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyForecastDay {
    pub day: u32,
    pub date: NaiveDate,
    pub projected_income: f64,
    pub projected_expenses: f64,
    pub daily_net: f64,
    pub running_balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyForecast {
    pub current_balance: f64,
    pub projected_balance: f64,
    pub daily_net_change: f64,
    pub days_ahead: u32,
    pub daily_forecast: Vec<LegacyForecastDay>,
    /// First day whose running balance is at or below zero
    pub shortfall_day: Option<u32>,
    pub expense_volatility: f64,
}

impl LegacyForecast {
    pub fn shortfall_detected(&self) -> bool {
        self.shortfall_day.is_some()
    }
}

/// Kind (and implied urgency) of a calculator alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LegacyAlertKind {
    Critical,
    Warning,
    Caution,
    Info,
}

impl LegacyAlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyAlertKind::Critical => "critical",
            LegacyAlertKind::Warning => "warning",
            LegacyAlertKind::Caution => "caution",
            LegacyAlertKind::Info => "info",
        }
    }
}

impl fmt::Display for LegacyAlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyAlert {
    #[serde(rename = "type")]
    pub kind: LegacyAlertKind,
    pub message: String,
    /// 1 is most urgent
    pub priority: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall_date: Option<String>,
}

impl LegacyAlert {
    fn new(kind: LegacyAlertKind, priority: u8, message: String) -> Self {
        Self {
            kind,
            message,
            priority,
            shortfall_day: None,
            shortfall_date: None,
        }
    }
}

/// Moving-average calculator over one user's ledger
pub struct LegacyCalculator<'a> {
    store: &'a dyn TransactionStore,
    user_id: i64,
    config: LegacyConfig,
    currency: Currency,
}

impl<'a> LegacyCalculator<'a> {
    pub fn new(store: &'a dyn TransactionStore, user_id: i64) -> Self {
        Self {
            store,
            user_id,
            config: LegacyConfig::default(),
            currency: Currency::default(),
        }
    }

    pub fn with_config(mut self, config: LegacyConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Sum of every signed amount in the ledger
    pub fn current_balance(&self) -> Result<f64> {
        self.store
            .sum_transactions(&TransactionFilter::for_user(self.user_id))
    }

    /// Income, expenses and net for the calendar month containing `now`
    pub fn monthly_summary_at(&self, now: NaiveDateTime) -> Result<MonthlySummary> {
        let (start, end) = month_bounds(now.year(), now.month())?;
        let base = TransactionFilter::for_user(self.user_id)
            .since(Some(start))
            .until(Some(end));

        let income = self
            .store
            .sum_transactions(&base.clone().kind(Some(TransactionKind::Income)))?;
        let expenses = self
            .store
            .sum_transactions(&base.kind(Some(TransactionKind::Expense)))?
            .abs();

        Ok(MonthlySummary {
            income,
            expenses,
            net: income - expenses,
        })
    }

    /// Daily averages over the configured window ending at `now`
    pub fn moving_average_at(&self, now: NaiveDateTime) -> Result<MovingAverages> {
        let start = now - Duration::days(i64::from(self.config.window_days));
        let transactions = self.store.query_transactions(
            &TransactionFilter::for_user(self.user_id)
                .since(Some(start))
                .until(Some(now)),
        )?;

        // One (income, expenses) bucket per calendar day, inclusive of both ends
        let mut daily: BTreeMap<NaiveDate, (f64, f64)> = start
            .date()
            .iter_days()
            .take_while(|d| *d <= now.date())
            .map(|d| (d, (0.0, 0.0)))
            .collect();

        for tx in &transactions {
            if let Some(bucket) = daily.get_mut(&tx.date.date()) {
                if tx.is_income() {
                    bucket.0 += tx.amount;
                } else {
                    bucket.1 += tx.amount.abs();
                }
            }
        }

        let incomes: Vec<f64> = daily.values().map(|(i, _)| *i).collect();
        let expenses: Vec<f64> = daily.values().map(|(_, e)| *e).collect();
        let avg_daily_income = mean(&incomes);
        let avg_daily_expenses = mean(&expenses);

        Ok(MovingAverages {
            avg_daily_income,
            avg_daily_expenses,
            median_daily_expenses: median(&expenses),
            expense_volatility: sample_std_dev(&expenses),
            avg_daily_net: avg_daily_income - avg_daily_expenses,
            daily_nets: daily.iter().map(|(d, (i, e))| (*d, i - e)).collect(),
        })
    }

    /// Project the balance `days_ahead` days forward from `now`
    pub fn forecast_balance_at(&self, days_ahead: u32, now: NaiveDateTime) -> Result<LegacyForecast> {
        let averages = self.moving_average_at(now)?;
        let current_balance = self.current_balance()?;
        Ok(project(&averages, current_balance, days_ahead, now.date()))
    }

    /// Flat-threshold alerts, most urgent first
    pub fn generate_alerts_at(&self, now: NaiveDateTime) -> Result<Vec<LegacyAlert>> {
        let current_balance = self.current_balance()?;
        let monthly = self.monthly_summary_at(now)?;
        let averages = self.moving_average_at(now)?;
        let today = now.date();
        let forecast = project(&averages, current_balance, MONTHLY_HORIZON, today);
        let weekly = project(&averages, current_balance, WEEKLY_HORIZON, today);

        let c = &self.currency;
        let mut alerts = Vec::new();

        if let Some(day) = forecast.shortfall_day {
            let date = (today + Duration::days(i64::from(day)))
                .format("%B %d, %Y")
                .to_string();
            let mut alert = LegacyAlert::new(
                LegacyAlertKind::Critical,
                1,
                format!(
                    "⚠️ CRITICAL SHORTFALL ALERT: Your balance will reach zero on {} (Day {}). Immediate action required!",
                    date, day
                ),
            );
            alert.shortfall_day = Some(day);
            alert.shortfall_date = Some(date);
            alerts.push(alert);
        }

        if current_balance < self.config.low_balance {
            alerts.push(LegacyAlert::new(
                LegacyAlertKind::Warning,
                2,
                format!(
                    "Low balance alert: Your current balance is {}",
                    c.format(current_balance)
                ),
            ));
        } else if current_balance < self.config.caution_balance {
            alerts.push(LegacyAlert::new(
                LegacyAlertKind::Caution,
                3,
                format!(
                    "Caution: Your current balance is {}. Consider monitoring expenses.",
                    c.format(current_balance)
                ),
            ));
        }

        if let Some(day) = weekly.shortfall_day {
            alerts.push(LegacyAlert::new(
                LegacyAlertKind::Warning,
                2,
                format!(
                    "Weekly shortfall warning: You may run out of money within 7 days (Day {})",
                    day
                ),
            ));
        }

        if monthly.expenses > monthly.income * 0.9 {
            alerts.push(LegacyAlert::new(
                LegacyAlertKind::Warning,
                3,
                "High spending alert: You've spent 90% or more of your monthly income."
                    .to_string(),
            ));
        }

        if averages.expense_volatility > averages.avg_daily_expenses * 0.5 {
            alerts.push(LegacyAlert::new(
                LegacyAlertKind::Caution,
                4,
                format!(
                    "Spending pattern alert: Your daily expenses vary significantly ({} volatility). Consider budgeting.",
                    c.format(averages.expense_volatility)
                ),
            ));
        }

        if averages.avg_daily_expenses > 0.0 {
            let runway = current_balance / averages.avg_daily_expenses;
            if runway < 10.0 {
                alerts.push(LegacyAlert::new(
                    LegacyAlertKind::Warning,
                    2,
                    format!(
                        "Burn rate alert: At current spending rate ({}/day), you have approximately {} days of funds remaining.",
                        c.format(averages.avg_daily_expenses),
                        runway.trunc() as i64
                    ),
                ));
            }
        }

        let urgent = alerts.iter().any(|a| {
            matches!(a.kind, LegacyAlertKind::Critical | LegacyAlertKind::Warning)
        });
        if monthly.net > 0.0 && !urgent {
            alerts.push(LegacyAlert::new(
                LegacyAlertKind::Info,
                5,
                format!("Excellent! You're saving {} this month.", c.format(monthly.net)),
            ));
        }

        // Stable: equal priorities keep their check order
        alerts.sort_by_key(|a| a.priority);
        Ok(alerts)
    }

    pub fn generate_alerts(&self) -> Result<Vec<LegacyAlert>> {
        self.generate_alerts_at(Local::now().naive_local())
    }
}

/// Day-by-day projection from a set of moving averages
///
/// `days_ahead` is capped at [`MAX_FORECAST_DAYS`].
fn project(
    averages: &MovingAverages,
    current_balance: f64,
    days_ahead: u32,
    today: NaiveDate,
) -> LegacyForecast {
    let days_ahead = days_ahead.min(MAX_FORECAST_DAYS);
    let mut running_balance = current_balance;
    let mut shortfall_day = None;
    let mut daily_forecast = Vec::with_capacity(days_ahead as usize);

    for day in 1..=days_ahead {
        let date = today + Duration::days(i64::from(day));
        let projected_income = averages.avg_daily_income;
        let mut projected_expenses = averages.avg_daily_expenses;

        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            projected_expenses *= WEEKEND_EXPENSE_FACTOR;
        }
        if averages.expense_volatility > 0.0 {
            projected_expenses += averages.expense_volatility * VOLATILITY_BUFFER;
        }

        let daily_net = projected_income - projected_expenses;
        running_balance += daily_net;

        if running_balance <= 0.0 && shortfall_day.is_none() {
            shortfall_day = Some(day);
        }

        daily_forecast.push(LegacyForecastDay {
            day,
            date,
            projected_income,
            projected_expenses,
            daily_net,
            running_balance,
        });
    }

    LegacyForecast {
        current_balance,
        projected_balance: running_balance,
        daily_net_change: averages.avg_daily_income - averages.avg_daily_expenses,
        days_ahead,
        daily_forecast,
        shortfall_day,
        expense_volatility: averages.expense_volatility,
    }
}
