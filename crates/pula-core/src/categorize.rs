//! Keyword-based transaction categorization
//!
//! Tuned for Botswana merchants and income sources. Keywords are matched as
//! whole words (so "bus" does not match "business"); merchant, indicator and
//! subcategory hints are plain substrings.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::TransactionKind;

/// Keyword tables by category for money coming in
const INCOME_KEYWORDS: &[(&str, &[&str])] = &[
    ("salary", &["salary", "wage", "wages", "payroll", "payslip", "bonus"]),
    ("business", &["business", "sales", "customer", "stall", "tuck shop", "crafts"]),
    ("freelance", &["freelance", "consulting", "gig", "piece job", "contract work"]),
    ("government", &["government", "grant", "allowance", "pension", "ipelegeng"]),
    ("remittance", &["remittance", "family support", "orange money", "myzaka"]),
    ("other_income", &["refund", "gift", "winnings"]),
];

/// Keyword tables by category for money going out
const EXPENSE_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "food",
        &[
            "food", "grocery", "groceries", "spar", "choppies", "pick n pay", "supermarket",
            "restaurant", "takeaway", "lunch", "breakfast", "nandos", "steers", "kfc", "butchery",
        ],
    ),
    (
        "transport",
        &["taxi", "combi", "combis", "bus", "fuel", "petrol", "diesel", "shell", "engen", "transport"],
    ),
    (
        "communication",
        &["airtime", "data", "mascom", "btc", "orange", "internet", "wifi", "recharge"],
    ),
    ("housing", &["rent", "electricity", "bpc", "water", "wuc", "utilities"]),
    (
        "healthcare",
        &["doctor", "clinic", "hospital", "pharmacy", "medicine", "medical", "consultation"],
    ),
    ("education", &["school", "fees", "tuition", "books", "uniform"]),
    ("entertainment", &["movies", "cinema", "party", "concert", "entertainment"]),
    ("clothing", &["clothes", "clothing", "shoes", "woolworths", "pep", "ackermans", "mr price"]),
    ("savings", &["motshelo", "savings", "stokvel"]),
    ("financial", &["loan", "insurance", "premium", "bank charges", "interest"]),
];

const MERCHANTS: &[&str] = &[
    "spar",
    "choppies",
    "pick n pay",
    "mascom",
    "btc",
    "orange",
    "first national bank",
    "fnb",
    "standard chartered",
    "barclays",
];

const INCOME_INDICATORS: &[&str] = &["salary", "wage", "pay", "allowance", "grant"];
const EXPENSE_INDICATORS: &[&str] = &["purchase", "payment", "bill", "fee"];

const SUBCATEGORIES: &[(&str, &[(&str, &[&str])])] = &[
    (
        "food",
        &[
            ("restaurant", &["restaurant", "takeaway", "fast food", "cafe"]),
            ("grocery", &["grocery", "spar", "choppies", "pick n pay", "supermarket"]),
            ("street_food", &["vendor", "street", "market"]),
        ],
    ),
    (
        "transport",
        &[
            ("taxi", &["taxi", "combi"]),
            ("fuel", &["fuel", "petrol", "diesel", "gas"]),
            ("public", &["bus", "public transport"]),
        ],
    ),
    (
        "communication",
        &[
            ("airtime", &["airtime", "credit", "recharge"]),
            ("data", &["data", "internet", "wifi"]),
            ("monthly", &["monthly", "subscription", "contract"]),
        ],
    ),
    (
        "healthcare",
        &[
            ("medication", &["medicine", "pharmacy", "drugs"]),
            ("consultation", &["doctor", "clinic", "consultation"]),
            ("emergency", &["emergency", "hospital", "ambulance"]),
        ],
    ),
];

const GOVERNMENT_KEYWORDS: &[&str] = &["government", "ministry", "council", "bdf", "police", "ipelegeng"];
const EDUCATION_KEYWORDS: &[&str] = &["university", "school", "college", "ub", "botho", "limkokwing"];
const EVERYDAY_KEYWORDS: &[&str] = &["taxi", "food", "lunch", "breakfast"];

const BASE_CONFIDENCE: f64 = 0.6;
const DEFAULT_CONFIDENCE: f64 = 0.1;
const MATCH_CAP: f64 = 0.95;
const RULE_CAP: f64 = 0.9;
const LARGE_INCOME: f64 = 5000.0;

/// Result of categorizing one description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Categorization {
    pub category: String,
    pub subcategory: Option<String>,
    pub confidence: f64,
    pub explanation: String,
}

impl Categorization {
    fn fallback(kind: TransactionKind) -> Self {
        let category = match kind {
            TransactionKind::Income => "other_income",
            TransactionKind::Expense => "other_expenses",
        };
        Self {
            category: category.to_string(),
            subcategory: None,
            confidence: DEFAULT_CONFIDENCE,
            explanation: "Default category assigned - no specific keywords matched".to_string(),
        }
    }
}

/// Whole-word, case-insensitive containment (`text` is already lowercased)
fn contains_word(text: &str, word: &str) -> bool {
    let pattern = format!(r"\b{}\b", regex::escape(&word.to_lowercase()));
    Regex::new(&pattern)
        .map(|re| re.is_match(text))
        .unwrap_or(false)
}

fn match_confidence(keyword: &str, description: &str, kind: TransactionKind) -> f64 {
    let mut confidence = BASE_CONFIDENCE;

    if keyword == description {
        confidence += 0.3;
    }
    if MERCHANTS.iter().any(|m| description.contains(m)) {
        confidence += 0.2;
    }
    let indicators = match kind {
        TransactionKind::Income => INCOME_INDICATORS,
        TransactionKind::Expense => EXPENSE_INDICATORS,
    };
    if indicators.iter().any(|i| description.contains(i)) {
        confidence += 0.15;
    }

    confidence.min(MATCH_CAP)
}

fn subcategory(category: &str, description: &str) -> Option<String> {
    let (_, subs) = SUBCATEGORIES.iter().find(|(name, _)| *name == category)?;
    subs.iter()
        .find(|(_, words)| words.iter().any(|w| description.contains(w)))
        .map(|(name, _)| name.to_string())
}

fn apply_rules(description: &str, amount: f64, mut result: Categorization) -> Categorization {
    if amount > LARGE_INCOME {
        result.category = "salary".to_string();
        result.confidence = (result.confidence + 0.1).min(RULE_CAP);
        result
            .explanation
            .push_str(" (Large amount suggests salary/business income)");
    }

    if (10.0..=100.0).contains(&amount.abs())
        && EVERYDAY_KEYWORDS.iter().any(|w| contains_word(description, w))
    {
        result.confidence = (result.confidence + 0.05).min(RULE_CAP);
    }

    if GOVERNMENT_KEYWORDS.iter().any(|w| contains_word(description, w)) {
        if amount > 0.0 {
            result.category = "government".to_string();
        }
        result.confidence = (result.confidence + 0.2).min(RULE_CAP);
        result
            .explanation
            .push_str(" (Government-related transaction detected)");
    }

    if EDUCATION_KEYWORDS.iter().any(|w| contains_word(description, w)) {
        result.category = "education".to_string();
        result.confidence = (result.confidence + 0.15).min(RULE_CAP);
        result
            .explanation
            .push_str(" (Educational institution detected)");
    }

    result
}

/// Categorize a transaction from its description and signed amount
///
/// Pure: the same inputs always give the same result.
pub fn categorize(description: &str, amount: f64) -> Categorization {
    let description = description.trim().to_lowercase();
    let kind = TransactionKind::of(amount);
    let table = match kind {
        TransactionKind::Income => INCOME_KEYWORDS,
        TransactionKind::Expense => EXPENSE_KEYWORDS,
    };

    let mut best = Categorization::fallback(kind);
    for (category, keywords) in table {
        for keyword in keywords.iter() {
            if !contains_word(&description, keyword) {
                continue;
            }
            let confidence = match_confidence(keyword, &description, kind);
            if confidence > best.confidence {
                best = Categorization {
                    category: category.to_string(),
                    subcategory: subcategory(category, &description),
                    confidence,
                    explanation: format!("Matched keyword \"{}\" in description", keyword),
                };
            }
        }
    }

    apply_rules(&description, amount, best)
}

/// User-facing explanation of a categorization decision
pub fn explain_category(category: &str, confidence: f64) -> String {
    let base = match category {
        "food" => "This transaction appears to be food-related based on keywords like grocery stores or restaurants.",
        "transport" => "This looks like a transportation expense, including taxi, fuel, or public transport.",
        "communication" => "This seems to be a communication expense for airtime, data, or phone services.",
        "salary" => "This appears to be salary or regular income based on the amount and description.",
        "business" => "This looks like business-related income or expense.",
        "healthcare" => "This appears to be a medical or healthcare-related expense.",
        "education" => "This seems to be an education-related expense or fee.",
        "housing" => "This looks like a housing-related expense such as rent or utilities.",
        "entertainment" => "This appears to be an entertainment or leisure expense.",
        _ => "Category assigned based on transaction description analysis.",
    };

    let certainty = if confidence >= 0.8 {
        " I'm quite confident about this categorization."
    } else if confidence >= 0.6 {
        " I'm moderately confident about this categorization."
    } else {
        " This categorization has lower confidence - you may want to review it."
    };

    format!("{}{}", base, certainty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grocery_merchant() {
        let result = categorize("Choppies Groceries", -150.0);
        assert_eq!(result.category, "food");
        assert_eq!(result.subcategory.as_deref(), Some("grocery"));
        assert!(result.confidence >= 0.8);
    }

    #[test]
    fn test_government_salary() {
        let result = categorize("Monthly Salary Government", 8500.0);
        assert_eq!(result.category, "government");
        assert!(result.confidence <= 0.9);
        assert!(result.explanation.contains("Large amount"));
        assert!(result.explanation.contains("Government-related"));
    }

    #[test]
    fn test_default_category_by_sign() {
        let income = categorize("zzz", 40.0);
        assert_eq!(income.category, "other_income");
        assert_eq!(income.confidence, 0.1);
        assert!(income.subcategory.is_none());

        let expense = categorize("zzz", -40.0);
        assert_eq!(expense.category, "other_expenses");
    }

    #[test]
    fn test_whole_word_matching() {
        // "bus" must not match inside "business"
        let result = categorize("business lunch", -300.0);
        assert_eq!(result.category, "food");

        let result = categorize("Busisiwe", -300.0);
        assert_eq!(result.category, "other_expenses");
    }

    #[test]
    fn test_exact_keyword_boost() {
        let result = categorize("  Taxi ", -20.0);
        assert_eq!(result.category, "transport");
        assert_eq!(result.subcategory.as_deref(), Some("taxi"));
        // 0.6 + 0.3 exact, then +0.05 everyday rule capped at 0.9
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_government_expense_keeps_category() {
        let result = categorize("Council rates payment", -200.0);
        assert_eq!(result.category, "other_expenses");
        // Default 0.1, then +0.2 for the government rule on either sign
        assert!((result.confidence - 0.3).abs() < 1e-9);
        assert!(result.explanation.contains("Government-related"));
    }

    #[test]
    fn test_equal_confidence_keeps_earlier_category() {
        // "data" (communication) and "loan" (financial) both score 0.6
        let result = categorize("data loan", -50.0);
        assert_eq!(result.category, "communication");
        assert_eq!(result.subcategory.as_deref(), Some("data"));
        assert!((result.confidence - 0.6).abs() < 1e-9);
        assert!(result.explanation.contains("\"data\""));
    }

    #[test]
    fn test_education_rule() {
        let result = categorize("Botho fees", -1500.0);
        assert_eq!(result.category, "education");
        // 0.6 + 0.15 ("fee" indicator), then +0.15 capped at 0.9
        assert!((result.confidence - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_confidence_bounds_and_purity() {
        let cases = [
            ("Mascom airtime purchase", -50.0),
            ("Spar pick n pay groceries payment", -400.0),
            ("Ipelegeng wage", 900.0),
            ("", 0.0),
            ("Salary", 12000.0),
        ];
        for (description, amount) in cases {
            let first = categorize(description, amount);
            assert!((0.1..=0.95).contains(&first.confidence), "{:?}", first);
            assert_eq!(first, categorize(description, amount));
        }
    }

    #[test]
    fn test_explanation_wording() {
        assert!(explain_category("food", 0.85).ends_with("quite confident about this categorization."));
        assert!(explain_category("salary", 0.6).contains("moderately confident"));
        assert!(explain_category("mystery", 0.2).starts_with("Category assigned"));
        assert!(explain_category("mystery", 0.2).contains("lower confidence"));
    }
}
