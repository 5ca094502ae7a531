//! Actionable observations derived from a forecast

use super::{DailyForecast, Insight, InsightKind};
use crate::analysis::{ExpenseAnalysis, IncomeAnalysis, PatternType};
use crate::models::AlertSeverity;

/// Income older than this many days is called out as due
const INCOME_DUE_AFTER_DAYS: i64 = 7;

/// Build forecast insights in a fixed order: shortfall, irregular income,
/// income due, expenses exceeding income
pub fn generate_insights(
    daily_forecasts: &[DailyForecast],
    income: &IncomeAnalysis,
    expenses: &ExpenseAnalysis,
) -> Vec<Insight> {
    let mut insights = Vec::new();

    if let Some(first) = daily_forecasts
        .iter()
        .filter(|d| d.predicted_balance < 0.0)
        .min_by_key(|d| d.date)
    {
        insights.push(Insight {
            kind: InsightKind::Warning,
            title: "Potential Cash Shortfall".to_string(),
            message: format!(
                "Your balance may go negative on {}. Consider reducing expenses or finding additional income.",
                first.date.format("%Y-%m-%d")
            ),
            severity: AlertSeverity::High,
            actionable: true,
        });
    }

    if income.pattern_type == PatternType::Irregular {
        insights.push(Insight {
            kind: InsightKind::Info,
            title: "Irregular Income Pattern".to_string(),
            message: "Your income varies significantly. Consider building an emergency fund during high-income periods.".to_string(),
            severity: AlertSeverity::Medium,
            actionable: true,
        });
    }

    if let Some(days) = income.last_income_days_ago {
        if days > INCOME_DUE_AFTER_DAYS {
            insights.push(Insight {
                kind: InsightKind::Info,
                title: "Income Due".to_string(),
                message: format!(
                    "It's been {} days since your last income. Based on your pattern, income may be due soon.",
                    days
                ),
                severity: AlertSeverity::Low,
                actionable: false,
            });
        }
    }

    if expenses.average_daily > income.average_daily {
        insights.push(Insight {
            kind: InsightKind::Warning,
            title: "Expenses Exceed Income".to_string(),
            message: "Your daily expenses are higher than your daily income on average. Review your spending patterns.".to_string(),
            severity: AlertSeverity::High,
            actionable: true,
        });
    }

    insights
}
