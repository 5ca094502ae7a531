//! Templated financial guidance
//!
//! Advice is static text selected by topic, with one dynamic part: the
//! spending topic names the user's largest expense category from a fresh
//! forecast and attaches a category-specific tip.

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::error;

use crate::analysis::ExpenseAnalysis;
use crate::currency::Currency;
use crate::error::{Error, Result};
use crate::forecast::ForecastEngine;
use crate::models::{AlertSeverity, AlertType};
use crate::store::{TransactionStore, UserStore};

/// Forecast horizon used to build advice context
pub const DEFAULT_ADVICE_DAYS: u32 = 30;

/// What the advice is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceTopic {
    CashShortfall,
    LowBalance,
    HighSpending,
    IncomeOverdue,
    IrregularIncome,
    General,
}

impl AdviceTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceTopic::CashShortfall => "cash_shortfall",
            AdviceTopic::LowBalance => "low_balance",
            AdviceTopic::HighSpending => "high_spending",
            AdviceTopic::IncomeOverdue => "income_overdue",
            AdviceTopic::IrregularIncome => "irregular_income",
            AdviceTopic::General => "general",
        }
    }

    /// Parse a topic name; anything unrecognised means general advice
    pub fn parse_or_general(s: &str) -> Self {
        s.parse().unwrap_or(AdviceTopic::General)
    }
}

impl FromStr for AdviceTopic {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cash_shortfall" => Ok(AdviceTopic::CashShortfall),
            "low_balance" => Ok(AdviceTopic::LowBalance),
            "high_spending" => Ok(AdviceTopic::HighSpending),
            "income_overdue" => Ok(AdviceTopic::IncomeOverdue),
            "irregular_income" => Ok(AdviceTopic::IrregularIncome),
            "general" => Ok(AdviceTopic::General),
            _ => Err(format!("Unknown advice topic: {}", s)),
        }
    }
}

impl fmt::Display for AdviceTopic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<AlertType> for AdviceTopic {
    fn from(alert_type: AlertType) -> Self {
        match alert_type {
            AlertType::CashShortfall => AdviceTopic::CashShortfall,
            AlertType::LowBalance => AdviceTopic::LowBalance,
            AlertType::HighSpending => AdviceTopic::HighSpending,
            AlertType::IncomeOverdue => AdviceTopic::IncomeOverdue,
            AlertType::IrregularIncome => AdviceTopic::IrregularIncome,
        }
    }
}

/// A named list of action items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdviceSection {
    /// snake_case key, e.g. `immediate_actions`
    pub key: String,
    pub items: Vec<String>,
}

impl AdviceSection {
    /// Human title derived from the key: `immediate_actions` -> `Immediate Actions`
    pub fn heading(&self) -> String {
        self.key
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

/// Largest expense category with a targeted tip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingAnalysis {
    pub highest_category: String,
    pub amount: f64,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Advice {
    pub title: String,
    pub sections: Vec<AdviceSection>,
    pub priority: AlertSeverity,
    pub estimated_reading_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spending_analysis: Option<SpendingAnalysis>,
}

/// Advice or an explicit error record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdviceResult {
    Advice(Advice),
    Error { error: String },
}

impl AdviceResult {
    pub fn error(message: impl Into<String>) -> Self {
        AdviceResult::Error {
            error: message.into(),
        }
    }
}

fn section(key: &str, items: &[&str]) -> AdviceSection {
    AdviceSection {
        key: key.to_string(),
        items: items.iter().map(|s| s.to_string()).collect(),
    }
}

fn owned_section(key: &str, items: Vec<String>) -> AdviceSection {
    AdviceSection {
        key: key.to_string(),
        items,
    }
}

/// One-line tip for a spending category
pub fn category_advice(category: &str) -> &'static str {
    match category {
        "food" => "Consider meal planning, bulk buying, and cooking at home more often.",
        "transport" => {
            "Look into public transport options, carpooling, or walking for short distances."
        }
        "communication" => {
            "Review your data and airtime usage, consider cheaper plans or Wi-Fi options."
        }
        "entertainment" => {
            "Look for free community events and activities, limit expensive outings."
        }
        "clothing" => {
            "Shop during sales, consider second-hand options, and buy quality items that last."
        }
        "housing" => {
            "Review utility usage, consider energy-saving measures, negotiate with service providers."
        }
        _ => "Review this spending category and look for ways to reduce costs.",
    }
}

fn shortfall_advice(currency: &Currency) -> Advice {
    Advice {
        title: "Managing Cash Shortfalls".to_string(),
        sections: vec![
            section(
                "immediate_actions",
                &[
                    "Review and reduce non-essential expenses immediately",
                    "Contact creditors to negotiate payment delays if needed",
                    "Look for quick income opportunities (piece jobs, selling items)",
                    "Borrow from trusted family/friends as last resort",
                ],
            ),
            owned_section(
                "medium_term_solutions",
                vec![
                    "Create a detailed budget and stick to it".to_string(),
                    format!(
                        "Build an emergency fund (start with {} 100-500)",
                        currency.code
                    ),
                    "Diversify income sources to reduce dependency on single source".to_string(),
                    "Consider joining a savings group (motshelo) for financial support"
                        .to_string(),
                ],
            ),
            section(
                "botswana_resources",
                &[
                    "Contact Citizen Entrepreneurial Development Agency (CEDA) for business support",
                    "Look into Youth Development Fund (YDF) programs",
                    "Check eligibility for government social programs",
                    "Visit local bank branches for financial literacy programs",
                ],
            ),
        ],
        priority: AlertSeverity::High,
        estimated_reading_time: "3 minutes".to_string(),
        spending_analysis: None,
    }
}

fn low_balance_advice(currency: &Currency) -> Advice {
    Advice {
        title: "Managing Low Balance".to_string(),
        sections: vec![
            section(
                "immediate_actions",
                &[
                    "Track all expenses for the next week",
                    "Postpone non-urgent purchases",
                    "Look for ways to increase income this week",
                    "Use cash instead of cards to control spending",
                ],
            ),
            owned_section(
                "preventive_measures",
                vec![
                    format!(
                        "Set up automatic savings (start with {} 20-50 per week)",
                        currency.code
                    ),
                    "Create spending categories and limits".to_string(),
                    "Plan purchases in advance".to_string(),
                    "Keep a small emergency fund separate from daily money".to_string(),
                ],
            ),
            section(
                "local_tips",
                &[
                    "Buy in bulk from wholesalers to save money",
                    "Use public transport or walk when possible",
                    "Cook at home instead of buying takeaways",
                    "Share expenses with neighbors (bulk buying, transport)",
                ],
            ),
        ],
        priority: AlertSeverity::Medium,
        estimated_reading_time: "2 minutes".to_string(),
        spending_analysis: None,
    }
}

fn spending_advice(expenses: &ExpenseAnalysis) -> Advice {
    let (category, amount) = expenses
        .top_category()
        .map(|(name, stats)| (name.to_string(), stats.total))
        .unwrap_or_else(|| ("other".to_string(), 0.0));

    Advice {
        title: "Controlling Your Spending".to_string(),
        sections: vec![
            section(
                "immediate_actions",
                &[
                    "Write down all expenses for one week",
                    "Identify which expenses are needs vs wants",
                    "Set daily spending limits",
                    "Use the 24-hour rule for non-essential purchases",
                ],
            ),
            section(
                "budgeting_tips",
                &[
                    "Use the 50/30/20 rule: 50% needs, 30% wants, 20% savings",
                    "Pay yourself first - save before spending",
                    "Use envelopes or separate accounts for different expense categories",
                    "Review and adjust budget monthly",
                ],
            ),
            section(
                "botswana_context",
                &[
                    "Take advantage of month-end specials at stores",
                    "Join bulk-buying groups in your community",
                    "Use loyalty programs at major retailers",
                    "Consider generic brands to save money",
                ],
            ),
        ],
        priority: AlertSeverity::Medium,
        estimated_reading_time: "4 minutes".to_string(),
        spending_analysis: Some(SpendingAnalysis {
            suggestion: category_advice(&category).to_string(),
            highest_category: category,
            amount,
        }),
    }
}

fn income_advice() -> Advice {
    Advice {
        title: "Increasing and Stabilizing Income".to_string(),
        sections: vec![
            section(
                "immediate_opportunities",
                &[
                    "Look for piece jobs in your community",
                    "Sell skills or services (tutoring, repairs, crafts)",
                    "Sell unused items",
                    "Offer services like cleaning, gardening, or childcare",
                ],
            ),
            section(
                "skill_development",
                &[
                    "Learn digital skills (computer literacy, social media)",
                    "Develop crafts or trades (sewing, woodwork, mechanics)",
                    "Improve language skills (English for tourism/service jobs)",
                    "Learn basic business and financial management",
                ],
            ),
            section(
                "formal_opportunities",
                &[
                    "Register your business with Companies and Intellectual Property Authority (CIPA)",
                    "Apply for CEDA funding for small business development",
                    "Look into Youth Development Fund programs",
                    "Consider agricultural programs if you have land access",
                ],
            ),
            section(
                "income_diversification",
                &[
                    "Develop multiple income streams",
                    "Balance formal and informal income sources",
                    "Create passive income through small investments",
                    "Build long-term client relationships",
                ],
            ),
        ],
        priority: AlertSeverity::High,
        estimated_reading_time: "5 minutes".to_string(),
        spending_analysis: None,
    }
}

fn irregular_income_advice() -> Advice {
    Advice {
        title: "Managing Irregular Income".to_string(),
        sections: vec![
            section(
                "cash_flow_management",
                &[
                    "Create a minimum monthly budget based on lowest expected income",
                    "Save extra money during high-income periods",
                    "Keep 2-3 months of expenses as emergency fund",
                    "Use percentage-based budgeting instead of fixed amounts",
                ],
            ),
            section(
                "planning_strategies",
                &[
                    "Track income patterns to predict lean periods",
                    "Plan major expenses during high-income periods",
                    "Build relationships with multiple income sources",
                    "Create income calendar noting payment dates",
                ],
            ),
            section(
                "financial_tools",
                &[
                    "Join or start a savings group (motshelo)",
                    "Use mobile money services for easy saving",
                    "Consider informal lending circles",
                    "Open a savings account with low minimum balance",
                ],
            ),
            section(
                "stress_management",
                &[
                    "Accept that irregular income is normal for many people",
                    "Focus on what you can control (expenses, skills)",
                    "Build supportive community networks",
                    "Celebrate financial wins, however small",
                ],
            ),
        ],
        priority: AlertSeverity::Medium,
        estimated_reading_time: "4 minutes".to_string(),
        spending_analysis: None,
    }
}

fn general_advice(currency: &Currency) -> Advice {
    Advice {
        title: "Building Financial Wellness".to_string(),
        sections: vec![
            owned_section(
                "foundation_steps",
                vec![
                    "Track all money coming in and going out".to_string(),
                    "Create a simple budget you can stick to".to_string(),
                    format!("Start saving something, even {} 10 per week", currency.code),
                    "Learn basic financial concepts".to_string(),
                ],
            ),
            section(
                "botswana_specific",
                &[
                    "Understand your rights as a consumer",
                    "Learn about mobile money services (Orange Money, MyZaka)",
                    "Know about government programs you may qualify for",
                    "Understand basic banking services and fees",
                ],
            ),
            section(
                "long_term_goals",
                &[
                    "Build emergency fund (3-6 months expenses)",
                    "Plan for major life events (education, health, family)",
                    "Consider retirement planning, even small amounts",
                    "Work towards home ownership or business development",
                ],
            ),
            section(
                "resources",
                &[
                    "Bank of Botswana financial literacy resources",
                    "CEDA business development programs",
                    "Community financial education workshops",
                    "Mobile banking and digital payment training",
                ],
            ),
        ],
        priority: AlertSeverity::Low,
        estimated_reading_time: "3 minutes".to_string(),
        spending_analysis: None,
    }
}

/// Build the advice template for a topic given the user's expense picture
pub fn advice_for_topic(topic: AdviceTopic, expenses: &ExpenseAnalysis, currency: &Currency) -> Advice {
    match topic {
        AdviceTopic::CashShortfall => shortfall_advice(currency),
        AdviceTopic::LowBalance => low_balance_advice(currency),
        AdviceTopic::HighSpending => spending_advice(expenses),
        AdviceTopic::IncomeOverdue => income_advice(),
        AdviceTopic::IrregularIncome => irregular_income_advice(),
        AdviceTopic::General => general_advice(currency),
    }
}

/// Produces advice for a user from their current forecast
pub struct AdviceGenerator<'a> {
    transactions: &'a dyn TransactionStore,
    users: &'a dyn UserStore,
    forecast_days: u32,
    history_limit: Option<usize>,
    currency: Currency,
}

impl<'a> AdviceGenerator<'a> {
    pub fn new(transactions: &'a dyn TransactionStore, users: &'a dyn UserStore) -> Self {
        Self {
            transactions,
            users,
            forecast_days: DEFAULT_ADVICE_DAYS,
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

    /// Advice for `topic` (unknown topics fall back to general advice)
    ///
    /// Returns an error record for unknown users or when the forecast fails.
    pub fn advice(&self, user_id: i64, topic: &str) -> AdviceResult {
        self.advice_at(user_id, topic, Local::now().naive_local())
    }

    pub fn advice_at(&self, user_id: i64, topic: &str, now: NaiveDateTime) -> AdviceResult {
        match self.try_advice_at(user_id, AdviceTopic::parse_or_general(topic), now) {
            Ok(advice) => AdviceResult::Advice(advice),
            Err(Error::NotFound(_)) => AdviceResult::error("User not found"),
            Err(e) => {
                error!(user_id, error = %e, "Error getting financial advice");
                AdviceResult::error("Failed to generate advice")
            }
        }
    }

    fn try_advice_at(&self, user_id: i64, topic: AdviceTopic, now: NaiveDateTime) -> Result<Advice> {
        if self.users.get_user(user_id)?.is_none() {
            return Err(Error::NotFound(format!("user {}", user_id)));
        }

        let mut engine = ForecastEngine::new(self.transactions);
        if let Some(limit) = self.history_limit {
            engine = engine.with_history_limit(limit);
        }
        let forecast = engine.try_forecast_at(user_id, self.forecast_days, now)?;

        Ok(advice_for_topic(topic, &forecast.expense_analysis, &self.currency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, tx, user, FailingStore, MemoryStore};

    #[test]
    fn test_topic_parsing_falls_back_to_general() {
        assert_eq!(AdviceTopic::parse_or_general("low_balance"), AdviceTopic::LowBalance);
        assert_eq!(AdviceTopic::parse_or_general("lottery"), AdviceTopic::General);
        assert_eq!(AdviceTopic::from(AlertType::IncomeOverdue), AdviceTopic::IncomeOverdue);
    }

    #[test]
    fn test_section_heading() {
        let s = section("botswana_resources", &[]);
        assert_eq!(s.heading(), "Botswana Resources");
    }

    #[test]
    fn test_unknown_user_error_record() {
        let store = MemoryStore::new();
        let result = AdviceGenerator::new(&store, &store).advice_at(9, "general", at(2026, 3, 1, 12));
        assert_eq!(result, AdviceResult::error("User not found"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "User not found" }));
    }

    #[test]
    fn test_failure_error_record() {
        let failing = FailingStore;
        let store = MemoryStore::new().with_users(vec![user(1, 100.0)]);
        let result = AdviceGenerator::new(&failing, &store).advice_at(1, "general", at(2026, 3, 1, 12));
        assert_eq!(result, AdviceResult::error("Failed to generate advice"));
    }

    #[test]
    fn test_spending_advice_names_top_category() {
        let store = MemoryStore::new()
            .with_users(vec![user(1, 100.0)])
            .with_transactions(vec![
                tx(1, at(2026, 3, 1, 9), 1000.0, "salary"),
                tx(2, at(2026, 3, 2, 9), -300.0, "transport"),
                tx(3, at(2026, 3, 3, 9), -120.0, "food"),
            ]);

        let result =
            AdviceGenerator::new(&store, &store).advice_at(1, "high_spending", at(2026, 3, 4, 12));
        let AdviceResult::Advice(advice) = result else {
            panic!("expected advice");
        };

        assert_eq!(advice.title, "Controlling Your Spending");
        let analysis = advice.spending_analysis.unwrap();
        assert_eq!(analysis.highest_category, "transport");
        assert_eq!(analysis.amount, 300.0);
        assert!(analysis.suggestion.contains("public transport"));
    }

    #[test]
    fn test_spending_advice_without_expenses() {
        let advice = advice_for_topic(
            AdviceTopic::HighSpending,
            &ExpenseAnalysis::no_data(),
            &Currency::pula(),
        );
        let analysis = advice.spending_analysis.unwrap();
        assert_eq!(analysis.highest_category, "other");
        assert_eq!(analysis.amount, 0.0);
    }

    #[test]
    fn test_templates() {
        let bwp = Currency::pula();
        let expenses = ExpenseAnalysis::no_data();

        let shortfall = advice_for_topic(AdviceTopic::CashShortfall, &expenses, &bwp);
        assert_eq!(shortfall.priority, AlertSeverity::High);
        assert!(shortfall.sections[1].items[1].contains("BWP 100-500"));

        let general = advice_for_topic(AdviceTopic::General, &expenses, &bwp);
        assert_eq!(general.priority, AlertSeverity::Low);
        assert_eq!(general.sections.len(), 4);

        let income = advice_for_topic(AdviceTopic::IncomeOverdue, &expenses, &bwp);
        assert_eq!(income.estimated_reading_time, "5 minutes");
    }

    #[test]
    fn test_category_advice_default() {
        assert!(category_advice("food").contains("meal planning"));
        assert_eq!(
            category_advice("gambling"),
            "Review this spending category and look for ways to reduce costs."
        );
    }
}
