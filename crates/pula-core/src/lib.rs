//! Pula Core Library
//!
//! Cash-flow forecasting for people with irregular income:
//! - Database access and migrations (users, ledger, alert log)
//! - Income and expense pattern analysis
//! - Day-by-day balance forecasting with shortfall detection
//! - Alert evaluation (per-user forecast thresholds or the legacy calculator)
//! - Templated financial advice
//! - Keyword-based transaction categorization
//! - CSV ledger import and sample data seeding

pub mod advice;
pub mod alerts;
pub mod analysis;
pub mod categorize;
pub mod config;
pub mod currency;
pub mod db;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;
pub mod seed;
pub mod service;
pub mod store;

/// Test utilities: in-memory repositories and fixture builders
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use advice::{Advice, AdviceGenerator, AdviceResult, AdviceTopic};
pub use alerts::{AlertEvaluator, AlertReport, AlertStrategy, LegacyAlert, LegacyCalculator};
pub use analysis::{ExpenseAnalysis, IncomeAnalysis, PatternType, Variability};
pub use categorize::{categorize, explain_category, Categorization};
pub use config::PulaConfig;
pub use currency::Currency;
pub use db::Database;
pub use error::{Error, Result};
pub use forecast::{explain_forecast, DailyForecast, ForecastEngine, ForecastResult, Insight};
pub use import::{import_csv, ImportSummary};
pub use service::{CategorizeResult, Dashboard, PulaService};
pub use store::{AlertStore, TransactionStore, UserStore};
