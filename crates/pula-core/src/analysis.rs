//! Pattern analysis over a user's transaction window
//!
//! Summarises how income arrives (how often, how steadily, how long ago) and
//! how money goes out (daily rate, variability, per-category totals). The
//! results feed the daily predictor and the alert checks.
//!
//! Both analyses share a denominator: the whole-day span between the first and
//! last transaction of the *entire* window, not just the income or expense
//! subset.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::Transaction;

/// How spread out a series of amounts is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variability {
    Low,
    Medium,
    High,
}

impl Variability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variability::Low => "low",
            Variability::Medium => "medium",
            Variability::High => "high",
        }
    }
}

impl fmt::Display for Variability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shape of an income or expense stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternType {
    Regular,
    SemiRegular,
    Irregular,
    /// No transactions of this kind in the window
    NoData,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Regular => "regular",
            PatternType::SemiRegular => "semi_regular",
            PatternType::Irregular => "irregular",
            PatternType::NoData => "no_data",
        }
    }
}

impl fmt::Display for PatternType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PatternType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "regular" => Ok(PatternType::Regular),
            "semi_regular" => Ok(PatternType::SemiRegular),
            "irregular" => Ok(PatternType::Irregular),
            "no_data" => Ok(PatternType::NoData),
            _ => Err(format!("Unknown pattern type: {}", s)),
        }
    }
}

/// Income statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeAnalysis {
    pub average_daily: f64,
    /// Mean gap in days between distinct income dates
    pub frequency_days: f64,
    pub variability: Variability,
    pub pattern_type: PatternType,
    /// Whole days since the most recent income, None without income
    pub last_income_days_ago: Option<i64>,
    /// Median income amount
    pub typical_amount: f64,
    /// 1 - coefficient of variation, clamped to [0, 1]
    pub income_consistency: f64,
}

impl IncomeAnalysis {
    pub fn no_data() -> Self {
        Self {
            average_daily: 0.0,
            frequency_days: DEFAULT_INCOME_FREQUENCY_DAYS,
            variability: Variability::High,
            pattern_type: PatternType::NoData,
            last_income_days_ago: None,
            typical_amount: 0.0,
            income_consistency: 0.0,
        }
    }
}

/// Per-category expense totals (magnitudes)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub total: f64,
    pub average: f64,
    pub frequency: usize,
}

/// Expense statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseAnalysis {
    /// Magnitude of average daily spending
    pub average_daily: f64,
    pub pattern_type: PatternType,
    pub variability: Variability,
    pub categories: BTreeMap<String, CategoryStats>,
    /// 1 - coefficient of variation of daily totals, clamped to [0, 1]
    pub expense_consistency: f64,
}

impl ExpenseAnalysis {
    pub fn no_data() -> Self {
        Self {
            average_daily: 0.0,
            pattern_type: PatternType::NoData,
            variability: Variability::Low,
            categories: BTreeMap::new(),
            expense_consistency: 0.0,
        }
    }

    /// Category with the largest total spend
    pub fn top_category(&self) -> Option<(&str, &CategoryStats)> {
        self.categories
            .iter()
            .max_by(|a, b| a.1.total.total_cmp(&b.1.total))
            .map(|(name, stats)| (name.as_str(), stats))
    }
}

/// Assumed income interval when fewer than two income dates exist
pub const DEFAULT_INCOME_FREQUENCY_DAYS: f64 = 30.0;

/// Whole days from `from` to `to`, rounded toward negative infinity
pub fn whole_days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_seconds().div_euclid(86_400)
}

/// Days covered by the window, at least 1
fn days_span(transactions: &[Transaction]) -> f64 {
    let first = transactions.iter().map(|t| t.date).min();
    let last = transactions.iter().map(|t| t.date).max();
    match (first, last) {
        (Some(first), Some(last)) => whole_days_between(first, last).max(1) as f64,
        _ => 1.0,
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation
pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sample standard deviation (n - 1 denominator), 0 below two values
pub(crate) fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub(crate) fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Coefficient of variation; 0 when the mean is 0
pub(crate) fn coefficient_of_variation(values: &[f64]) -> f64 {
    let m = mean(values);
    if m == 0.0 {
        return 0.0;
    }
    std_dev(values) / m
}

/// Analyse the income side of a transaction window
///
/// `now` anchors `last_income_days_ago`.
pub fn analyze_income(transactions: &[Transaction], now: NaiveDateTime) -> IncomeAnalysis {
    let income: Vec<&Transaction> = transactions.iter().filter(|t| t.is_income()).collect();
    if income.is_empty() {
        return IncomeAnalysis::no_data();
    }

    let amounts: Vec<f64> = income.iter().map(|t| t.amount).collect();
    let total: f64 = amounts.iter().sum();
    let average_daily = total / days_span(transactions);

    let mut dates: Vec<NaiveDate> = income.iter().map(|t| t.date.date()).collect();
    dates.sort();
    dates.dedup();
    let frequency_days = if dates.len() > 1 {
        let gaps: Vec<f64> = dates
            .windows(2)
            .map(|pair| (pair[1] - pair[0]).num_days() as f64)
            .collect();
        mean(&gaps)
    } else {
        DEFAULT_INCOME_FREQUENCY_DAYS
    };

    let cv = coefficient_of_variation(&amounts);
    let (pattern_type, variability) = if cv < 0.2 {
        (PatternType::Regular, Variability::Low)
    } else if cv < 0.5 {
        (PatternType::SemiRegular, Variability::Medium)
    } else {
        (PatternType::Irregular, Variability::High)
    };

    let last_income_days_ago = income
        .iter()
        .map(|t| t.date)
        .max()
        .map(|last| whole_days_between(last, now));

    debug!(
        income_count = income.len(),
        average_daily,
        frequency_days,
        cv,
        pattern = %pattern_type,
        "Analyzed income"
    );

    IncomeAnalysis {
        average_daily,
        frequency_days,
        variability,
        pattern_type,
        last_income_days_ago,
        typical_amount: median(&amounts),
        income_consistency: (1.0 - cv).clamp(0.0, 1.0),
    }
}

/// Analyse the expense side of a transaction window
pub fn analyze_expenses(transactions: &[Transaction]) -> ExpenseAnalysis {
    let expenses: Vec<&Transaction> = transactions.iter().filter(|t| !t.is_income()).collect();
    if expenses.is_empty() {
        return ExpenseAnalysis::no_data();
    }

    let total: f64 = expenses.iter().map(|t| t.amount).sum::<f64>().abs();
    let average_daily = total / days_span(transactions);

    let mut categories: BTreeMap<String, CategoryStats> = BTreeMap::new();
    for tx in &expenses {
        let entry = categories
            .entry(tx.category.clone())
            .or_insert(CategoryStats {
                total: 0.0,
                average: 0.0,
                frequency: 0,
            });
        entry.total += tx.amount;
        entry.frequency += 1;
    }
    for stats in categories.values_mut() {
        stats.average = (stats.total / stats.frequency as f64).abs();
        stats.total = stats.total.abs();
    }

    // Variability is measured on spending per calendar day
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for tx in &expenses {
        *daily.entry(tx.date.date()).or_insert(0.0) += tx.amount;
    }
    let daily_totals: Vec<f64> = daily.values().map(|v| v.abs()).collect();
    let cv = coefficient_of_variation(&daily_totals);

    let (pattern_type, variability) = if cv < 0.3 {
        (PatternType::Regular, Variability::Low)
    } else if cv < 0.6 {
        (PatternType::SemiRegular, Variability::Medium)
    } else {
        (PatternType::Irregular, Variability::High)
    };

    debug!(
        expense_count = expenses.len(),
        average_daily,
        cv,
        pattern = %pattern_type,
        "Analyzed expenses"
    );

    ExpenseAnalysis {
        average_daily,
        pattern_type,
        variability,
        categories,
        expense_consistency: (1.0 - cv).clamp(0.0, 1.0),
    }
}
