//! Alert generation
//!
//! Two strategies are available:
//! - `Forecast`: runs a short forecast per user and checks it against the
//!   user's own threshold; triggered alerts are appended to the alert log
//! - `Legacy`: the single-ledger calculator with flat balance thresholds;
//!   its alerts are returned for display only

mod evaluator;
mod legacy;

pub use evaluator::{
    income_alerts, shortfall_alerts, spending_alerts, AlertEvaluator, DEFAULT_ALERT_DAYS,
};
pub use legacy::{
    LegacyAlert, LegacyAlertKind, LegacyCalculator, LegacyForecast, LegacyForecastDay,
    MovingAverages,
};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::Alert;

/// Which alert generator to run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertStrategy {
    /// Per-user thresholds over a forecast, persisted
    #[default]
    Forecast,
    /// Flat thresholds over a moving average, not persisted
    Legacy,
}

impl AlertStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStrategy::Forecast => "forecast",
            AlertStrategy::Legacy => "legacy",
        }
    }
}

impl fmt::Display for AlertStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "forecast" => Ok(AlertStrategy::Forecast),
            "legacy" => Ok(AlertStrategy::Legacy),
            _ => Err(format!("Unknown alert strategy: {}", s)),
        }
    }
}

/// Output of an alert run, shaped by the strategy that produced it
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "strategy", content = "alerts", rename_all = "snake_case")]
pub enum AlertReport {
    Forecast(Vec<Alert>),
    Legacy(Vec<LegacyAlert>),
}

impl AlertReport {
    pub fn len(&self) -> usize {
        match self {
            AlertReport::Forecast(alerts) => alerts.len(),
            AlertReport::Legacy(alerts) => alerts.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
