//! Plain-language description of how forecasts are produced

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Methodology {
    pub income_prediction: String,
    pub expense_prediction: String,
    pub balance_calculation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    pub high_confidence: String,
    pub medium_confidence: String,
    pub low_confidence: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastExplanation {
    pub methodology: Methodology,
    pub factors_considered: Vec<String>,
    pub limitations: Vec<String>,
    pub confidence_factors: ConfidenceFactors,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Methodology, inputs and limitations of the forecast
pub fn explain_forecast() -> ForecastExplanation {
    ForecastExplanation {
        methodology: Methodology {
            income_prediction: "We analyze your historical income patterns, including frequency and amounts, to predict future income. For irregular earners, we consider factors like days since last payment and typical payment cycles.".to_string(),
            expense_prediction: "Daily expenses are predicted based on your spending history, with adjustments for day-of-week patterns (e.g., higher weekend spending).".to_string(),
            balance_calculation: "Future balance = Current balance + Predicted income - Predicted expenses for each day.".to_string(),
        },
        factors_considered: strings(&[
            "Historical transaction patterns",
            "Income frequency and variability",
            "Day-of-week spending patterns",
            "Time since last income payment",
        ]),
        limitations: strings(&[
            "Predictions are based on historical patterns and may not account for unexpected events",
            "Accuracy decreases for longer forecast periods",
            "New income sources or expense categories may not be predicted",
            "Economic changes or personal circumstances may affect actual results",
        ]),
        confidence_factors: ConfidenceFactors {
            high_confidence: "Regular income and expense patterns with sufficient historical data".to_string(),
            medium_confidence: "Some regularity in patterns but with moderate variability".to_string(),
            low_confidence: "Highly irregular patterns or limited historical data".to_string(),
        },
    }
}
