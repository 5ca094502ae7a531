//! Cash balance forecasting
//!
//! The engine loads a user's recent history, runs the pattern analyzer once,
//! and walks the daily predictor forward day by day from tomorrow,
//! accumulating a running balance:
//!
//! ```text
//! predicted_balance[1] = current_balance + net_change[1]
//! predicted_balance[i] = predicted_balance[i-1] + net_change[i]
//! ```
//!
//! Any day whose predicted balance is negative is a shortfall.

mod engine;
mod explanation;
mod insights;
mod predictor;

pub use engine::ForecastEngine;
pub use explanation::{explain_forecast, ConfidenceFactors, ForecastExplanation, Methodology};
pub use insights::generate_insights;
pub use predictor::{predict_expenses, predict_income, prediction_confidence};

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::analysis::{ExpenseAnalysis, IncomeAnalysis};
use crate::models::AlertSeverity;

/// Longest horizon any projection will walk (ten years)
pub const MAX_FORECAST_DAYS: u32 = 3650;

/// Projection for a single future day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    /// Never negative
    pub predicted_income: f64,
    /// Magnitude of predicted spending, never negative
    pub predicted_expenses: f64,
    pub net_change: f64,
    pub predicted_balance: f64,
    /// In [0.1, 0.9]
    pub confidence: f64,
}

/// Kind of forecast insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    Warning,
    Info,
}

impl InsightKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightKind::Warning => "warning",
            InsightKind::Info => "info",
        }
    }
}

impl fmt::Display for InsightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A human-readable observation attached to a forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub kind: InsightKind,
    pub title: String,
    pub message: String,
    pub severity: AlertSeverity,
    /// Whether the user can do something about it
    pub actionable: bool,
}

/// Complete forecast for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Sum of all loaded signed amounts
    pub current_balance: f64,
    /// Requested horizon in days
    pub forecast_period: u32,
    pub daily_forecasts: Vec<DailyForecast>,
    /// Days from `daily_forecasts` whose predicted balance is below zero
    pub shortfalls: Vec<DailyForecast>,
    pub insights: Vec<Insight>,
    pub income_analysis: IncomeAnalysis,
    pub expense_analysis: ExpenseAnalysis,
    pub generated_at: NaiveDateTime,
}

impl ForecastResult {
    /// Forecast returned when there is no history to project from
    pub fn empty(days: u32, generated_at: NaiveDateTime) -> Self {
        Self {
            current_balance: 0.0,
            forecast_period: days,
            daily_forecasts: Vec::new(),
            shortfalls: Vec::new(),
            insights: vec![Insight {
                kind: InsightKind::Info,
                title: "No Transaction Data".to_string(),
                message: "Add some transactions to get personalized forecasts and insights."
                    .to_string(),
                severity: AlertSeverity::Low,
                actionable: true,
            }],
            income_analysis: IncomeAnalysis::no_data(),
            expense_analysis: ExpenseAnalysis::no_data(),
            generated_at,
        }
    }

    /// True when no daily projection was produced
    pub fn is_empty(&self) -> bool {
        self.daily_forecasts.is_empty()
    }

    /// Earliest day with a negative predicted balance
    pub fn first_shortfall(&self) -> Option<&DailyForecast> {
        self.shortfalls.iter().min_by_key(|d| d.date)
    }

    /// Predicted balance at the end of the horizon
    pub fn final_balance(&self) -> f64 {
        self.daily_forecasts
            .last()
            .map(|d| d.predicted_balance)
            .unwrap_or(self.current_balance)
    }

    /// Lowest predicted balance over the horizon
    pub fn lowest_balance(&self) -> Option<&DailyForecast> {
        self.daily_forecasts
            .iter()
            .min_by(|a, b| a.predicted_balance.total_cmp(&b.predicted_balance))
    }
}
