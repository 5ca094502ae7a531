//! Domain models for Pula

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A person whose ledger is tracked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// Balance below which a low-balance alert fires
    pub alert_threshold: f64,
    pub created_at: DateTime<Utc>,
}

/// Direction of money for a transaction, derived from the sign of its amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }

    /// Positive amounts are income, everything else is an expense
    pub fn of(amount: f64) -> Self {
        if amount > 0.0 {
            Self::Income
        } else {
            Self::Expense
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" | "expenses" => Ok(Self::Expense),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDateTime,
    /// Negative = expense, positive = income
    pub amount: f64,
    pub category: String,
    pub description: String,
    /// Hash for deduplication of imported rows
    pub import_hash: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn kind(&self) -> TransactionKind {
        TransactionKind::of(self.amount)
    }

    pub fn is_income(&self) -> bool {
        self.amount > 0.0
    }
}

/// A transaction before insertion
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub user_id: i64,
    pub date: NaiveDateTime,
    pub amount: f64,
    pub category: String,
    pub description: String,
    pub import_hash: Option<String>,
}

/// Fields to change on an existing transaction (None leaves the field as is)
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub date: Option<NaiveDateTime>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.description.is_none()
    }
}

/// Kind of alert raised by the alert evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    /// Balance is forecast to go negative
    CashShortfall,
    /// Balance is forecast to drop under the user's threshold
    LowBalance,
    /// Recent spending is well above the historical average
    HighSpending,
    /// Income has not arrived within the usual interval
    IncomeOverdue,
    /// Income amounts vary too much to plan around
    IrregularIncome,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CashShortfall => "cash_shortfall",
            Self::LowBalance => "low_balance",
            Self::HighSpending => "high_spending",
            Self::IncomeOverdue => "income_overdue",
            Self::IrregularIncome => "irregular_income",
        }
    }
}

impl std::str::FromStr for AlertType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cash_shortfall" => Ok(Self::CashShortfall),
            "low_balance" => Ok(Self::LowBalance),
            "high_spending" => Ok(Self::HighSpending),
            "income_overdue" => Ok(Self::IncomeOverdue),
            "irregular_income" => Ok(Self::IrregularIncome),
            _ => Err(format!("Unknown alert type: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How urgent an alert is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            _ => Err(format!("Unknown alert severity: {}", s)),
        }
    }
}

impl std::fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub user_id: i64,
    pub alert_type: AlertType,
    pub message: String,
    pub severity: AlertSeverity,
    /// Check-specific figures (days until, amounts, thresholds)
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}

/// An alert produced by a check, before it is persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAlert {
    pub user_id: i64,
    pub alert_type: AlertType,
    pub message: String,
    pub severity: AlertSeverity,
    pub metadata: serde_json::Value,
}

/// Income, expenses and net for a calendar month
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub income: f64,
    /// Magnitude of spending (always >= 0)
    pub expenses: f64,
    pub net: f64,
}

/// Aggregated amount for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    /// Magnitude of the summed amounts
    pub amount: f64,
    pub count: i64,
}

/// Closing balance at the end of a day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub date: NaiveDate,
    pub balance: f64,
}
