//! Configuration for Pula
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a two-layer resolution:
//! 1. An explicit path (`--config`), or the override in the data dir
//!    (~/.local/share/pula/config/pula.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Unknown keys are ignored and missing keys keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::alerts::AlertStrategy;
use crate::currency::Currency;
use crate::error::{Error, Result};
use crate::forecast::MAX_FORECAST_DAYS;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/pula.toml");

/// Forecast horizons and history window
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    pub history_limit: usize,
    pub default_days: u32,
    pub alert_days: u32,
    pub advice_days: u32,
    /// Longest horizon a request may ask for
    pub max_days: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_limit: 200,
            default_days: 30,
            alert_days: 14,
            advice_days: 30,
            max_days: 365,
        }
    }
}

/// Alert evaluation settings
#[derive(Debug, Clone, PartialEq)]
pub struct AlertConfig {
    pub strategy: AlertStrategy,
    pub default_threshold: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            strategy: AlertStrategy::Forecast,
            default_threshold: 100.0,
        }
    }
}

/// Flat thresholds used by the single-ledger calculator
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyConfig {
    pub low_balance: f64,
    pub caution_balance: f64,
    pub window_days: u32,
}

impl Default for LegacyConfig {
    fn default() -> Self {
        Self {
            low_balance: 100.0,
            caution_balance: 500.0,
            window_days: 30,
        }
    }
}

/// Resolved configuration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PulaConfig {
    pub currency: Currency,
    pub forecast: ForecastConfig,
    pub alerts: AlertConfig,
    pub legacy: LegacyConfig,
}

impl PulaConfig {
    /// Load configuration (explicit path or override first, then default)
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let content = match override_path {
            Some(path) => {
                // An explicit path must exist
                fs::read_to_string(path).map_err(|e| {
                    Error::Config(format!("Failed to read {}: {}", path.display(), e))
                })?
            }
            None => match default_config_path() {
                Some(path) if path.exists() => {
                    debug!(path = %path.display(), "Loading config override");
                    fs::read_to_string(&path).map_err(|e| {
                        Error::Config(format!("Failed to read {}: {}", path.display(), e))
                    })?
                }
                _ => DEFAULT_CONFIG.to_string(),
            },
        };

        Self::parse(&content)
    }

    /// Parse config from TOML content
    pub fn parse(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = PulaConfig::default();

        if let Some(currency) = raw.currency {
            if let Some(code) = currency.code {
                config.currency.code = code;
            }
            if let Some(symbol) = currency.symbol {
                config.currency.symbol = symbol;
            }
        }

        if let Some(forecast) = raw.forecast {
            if let Some(limit) = forecast.history_limit {
                if limit == 0 {
                    return Err(Error::Config("forecast.history_limit must be positive".into()));
                }
                config.forecast.history_limit = limit;
            }
            if let Some(days) = forecast.default_days {
                config.forecast.default_days = days;
            }
            if let Some(days) = forecast.alert_days {
                config.forecast.alert_days = days;
            }
            if let Some(days) = forecast.advice_days {
                config.forecast.advice_days = days;
            }
            if let Some(days) = forecast.max_days {
                if !(1..=MAX_FORECAST_DAYS).contains(&days) {
                    return Err(Error::Config(format!(
                        "forecast.max_days must be between 1 and {}",
                        MAX_FORECAST_DAYS
                    )));
                }
                config.forecast.max_days = days;
            }
        }

        if let Some(alerts) = raw.alerts {
            if let Some(strategy) = alerts.strategy {
                config.alerts.strategy = strategy.parse().map_err(Error::Config)?;
            }
            if let Some(threshold) = alerts.default_threshold {
                config.alerts.default_threshold = threshold;
            }
        }

        if let Some(legacy) = raw.legacy {
            if let Some(low) = legacy.low_balance {
                config.legacy.low_balance = low;
            }
            if let Some(caution) = legacy.caution_balance {
                config.legacy.caution_balance = caution;
            }
            if let Some(days) = legacy.window_days {
                config.legacy.window_days = days.max(1);
            }
        }

        Ok(config)
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("pula").join("config").join("pula.toml"))
}

/// Default database path (~/.local/share/pula/pula.db)
pub fn default_db_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("pula").join("pula.db"))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    currency: Option<RawCurrency>,
    forecast: Option<RawForecast>,
    alerts: Option<RawAlerts>,
    legacy: Option<RawLegacy>,
}

#[derive(Debug, Deserialize)]
struct RawCurrency {
    code: Option<String>,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawForecast {
    history_limit: Option<usize>,
    default_days: Option<u32>,
    alert_days: Option<u32>,
    advice_days: Option<u32>,
    max_days: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawAlerts {
    strategy: Option<String>,
    default_threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawLegacy {
    low_balance: Option<f64>,
    caution_balance: Option<f64>,
    window_days: Option<u32>,
}
