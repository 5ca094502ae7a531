//! Single-day income and expense prediction
//!
//! Calendar effects: informal earners are often paid at the end of the work
//! week, and spending climbs on Fridays, weekends and Mondays.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::analysis::{ExpenseAnalysis, IncomeAnalysis, PatternType};

fn income_day_multiplier(weekday: Weekday) -> f64 {
    match weekday {
        Weekday::Fri => 1.5,
        Weekday::Sat | Weekday::Sun => 0.7,
        _ => 1.0,
    }
}

fn expense_day_multiplier(weekday: Weekday) -> f64 {
    match weekday {
        Weekday::Fri => 1.2,
        Weekday::Sat | Weekday::Sun => 1.3,
        Weekday::Mon => 1.1,
        _ => 1.0,
    }
}

/// Predicted income for `date` (never negative)
pub fn predict_income(date: NaiveDate, income: &IncomeAnalysis) -> f64 {
    if income.pattern_type == PatternType::NoData {
        return 0.0;
    }

    let mut predicted = income.average_daily * income_day_multiplier(date.weekday());

    let days_since = income.last_income_days_ago.unwrap_or(0) as f64;
    let frequency = income.frequency_days;
    if days_since >= frequency {
        // Overdue: more likely to land
        predicted *= 1.5;
    } else if days_since < frequency / 2.0 {
        // Just paid: less likely to land again
        predicted *= 0.3;
    }

    predicted.max(0.0)
}

/// Predicted spending for `date`, returned as a negative amount
pub fn predict_expenses(date: NaiveDate, expenses: &ExpenseAnalysis) -> f64 {
    if expenses.pattern_type == PatternType::NoData {
        return 0.0;
    }

    -(expenses.average_daily * expense_day_multiplier(date.weekday()))
}

/// Confidence for a prediction `date`, with `today` as day zero
pub fn prediction_confidence(
    date: NaiveDate,
    today: NaiveDate,
    income: &IncomeAnalysis,
    expenses: &ExpenseAnalysis,
) -> f64 {
    let mut confidence: f64 = 0.5;

    if income.income_consistency > 0.7 {
        confidence += 0.2;
    }
    if expenses.expense_consistency > 0.7 {
        confidence += 0.2;
    }

    let days_ahead = (date - today).num_days();
    if days_ahead > 14 {
        confidence -= 0.1;
    }
    if days_ahead > 21 {
        confidence -= 0.1;
    }

    confidence.clamp(0.1, 0.9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Variability;
    use std::collections::BTreeMap;

    fn income(average_daily: f64, days_since: i64, frequency: f64) -> IncomeAnalysis {
        IncomeAnalysis {
            average_daily,
            frequency_days: frequency,
            variability: Variability::Low,
            pattern_type: PatternType::Regular,
            last_income_days_ago: Some(days_since),
            typical_amount: average_daily,
            income_consistency: 0.9,
        }
    }

    fn expenses(average_daily: f64) -> ExpenseAnalysis {
        ExpenseAnalysis {
            average_daily,
            pattern_type: PatternType::Regular,
            variability: Variability::Low,
            categories: BTreeMap::new(),
            expense_consistency: 0.9,
        }
    }

    // 2026-03-02 is a Monday
    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_income_weekday_and_recency() {
        // Between half and full frequency: no recency adjustment
        let steady = income(100.0, 20, 30.0);
        assert_eq!(predict_income(day(4), &steady), 100.0); // Wed
        assert_eq!(predict_income(day(6), &steady), 150.0); // Fri
        assert!((predict_income(day(7), &steady) - 70.0).abs() < 1e-9); // Sat

        let overdue = income(100.0, 30, 30.0);
        assert_eq!(predict_income(day(4), &overdue), 150.0);

        let just_paid = income(100.0, 2, 30.0);
        assert!((predict_income(day(4), &just_paid) - 30.0).abs() < 1e-9);

        assert_eq!(predict_income(day(4), &IncomeAnalysis::no_data()), 0.0);
    }

    #[test]
    fn test_expense_weekday_multipliers() {
        let e = expenses(100.0);
        assert!((predict_expenses(day(2), &e) + 110.0).abs() < 1e-9); // Mon
        assert_eq!(predict_expenses(day(3), &e), -100.0); // Tue
        assert!((predict_expenses(day(6), &e) + 120.0).abs() < 1e-9); // Fri
        assert!((predict_expenses(day(8), &e) + 130.0).abs() < 1e-9); // Sun
        assert_eq!(predict_expenses(day(3), &ExpenseAnalysis::no_data()), 0.0);
    }

    #[test]
    fn test_confidence_decays_with_horizon() {
        let today = day(1);
        let i = income(100.0, 20, 30.0);
        let e = expenses(100.0);

        assert!((prediction_confidence(day(2), today, &i, &e) - 0.9).abs() < 1e-9);
        assert!((prediction_confidence(day(16), today, &i, &e) - 0.8).abs() < 1e-9);
        assert!((prediction_confidence(day(23), today, &i, &e) - 0.7).abs() < 1e-9);

        let none = prediction_confidence(
            day(30),
            today,
            &IncomeAnalysis::no_data(),
            &ExpenseAnalysis::no_data(),
        );
        assert!((none - 0.3).abs() < 1e-9);

        for d in 2..=31 {
            let c = prediction_confidence(day(d), today, &i, &e);
            assert!((0.1..=0.9).contains(&c));
        }
    }
}
