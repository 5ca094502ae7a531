//! Currency formatting
//!
//! All user-facing amounts go through [`Currency::format`] or
//! [`Currency::format_code`] so the unit is configured in one place.

use serde::{Deserialize, Serialize};

/// A currency unit: ISO code plus display symbol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub symbol: String,
}

impl Default for Currency {
    fn default() -> Self {
        Self::pula()
    }
}

impl Currency {
    /// Botswana Pula
    pub fn pula() -> Self {
        Self {
            code: "BWP".to_string(),
            symbol: "P".to_string(),
        }
    }

    /// Symbol style with two decimals: `P50.00`, `-P12.50`
    pub fn format(&self, amount: f64) -> String {
        let sign = if amount < 0.0 { "-" } else { "" };
        format!("{}{}{:.2}", sign, self.symbol, amount.abs())
    }

    /// Code style with two decimals: `BWP 123.45`, `BWP -12.50`
    pub fn format_code(&self, amount: f64) -> String {
        format!("{} {:.2}", self.code, amount)
    }

    /// Symbol style without decimals, for advice text: `P1500`
    pub fn format_whole(&self, amount: f64) -> String {
        let sign = if amount < 0.0 { "-" } else { "" };
        format!("{}{}{:.0}", sign, self.symbol, amount.abs())
    }
}
