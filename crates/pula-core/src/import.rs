//! CSV ledger import
//!
//! Accepts `date,description,amount[,category]` files with a header row.
//! Rows without a category are run through the categorizer. Each row gets a
//! SHA-256 import hash so re-importing the same file adds nothing.

use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::io::Read;
use tracing::{debug, info};

use crate::categorize::categorize;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::NewTransaction;

/// Outcome of importing one file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped_duplicates: usize,
    /// Rows whose category came from the categorizer
    pub auto_categorized: usize,
}

/// Deduplication hash for a row of a user's ledger
pub fn import_hash(user_id: i64, date: &NaiveDateTime, description: &str, amount: f64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(user_id.to_be_bytes());
    hasher.update(date.to_string().as_bytes());
    hasher.update(description.as_bytes());
    hasher.update(amount.to_be_bytes());
    hex::encode(hasher.finalize())
}

/// Parse a ledger CSV into transactions for `user_id`
///
/// Returns each transaction with a flag telling whether its category was
/// inferred.
pub fn parse_csv<R: Read>(reader: R, user_id: i64) -> Result<Vec<(NewTransaction, bool)>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut transactions = Vec::new();
    for (index, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let line = index + 2;

        let date_str = record
            .get(0)
            .ok_or_else(|| Error::Import(format!("Line {}: missing date", line)))?;
        let date = parse_date(date_str)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        let description = record
            .get(1)
            .ok_or_else(|| Error::Import(format!("Line {}: missing description", line)))?
            .to_string();

        let amount_str = record
            .get(2)
            .ok_or_else(|| Error::Import(format!("Line {}: missing amount", line)))?;
        let amount = parse_amount(amount_str)
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        let given = record.get(3).filter(|s| !s.is_empty()).map(str::to_string);
        let inferred = given.is_none();
        let category = given.unwrap_or_else(|| categorize(&description, amount).category);

        transactions.push((
            NewTransaction {
                user_id,
                date,
                amount,
                import_hash: Some(import_hash(user_id, &date, &description, amount)),
                category,
                description,
            },
            inferred,
        ));
    }

    debug!(user_id, rows = transactions.len(), "Parsed ledger CSV");
    Ok(transactions)
}

/// Parse and insert a ledger CSV, skipping rows already imported
pub fn import_csv<R: Read>(db: &Database, reader: R, user_id: i64) -> Result<ImportSummary> {
    if db.get_user(user_id)?.is_none() {
        return Err(Error::NotFound(format!("user {}", user_id)));
    }

    let mut summary = ImportSummary::default();
    for (tx, inferred) in parse_csv(reader, user_id)? {
        match db.insert_transaction(&tx)? {
            Some(_) => {
                summary.imported += 1;
                if inferred {
                    summary.auto_categorized += 1;
                }
            }
            None => summary.skipped_duplicates += 1,
        }
    }

    info!(
        user_id,
        imported = summary.imported,
        skipped = summary.skipped_duplicates,
        "Imported ledger CSV"
    );
    Ok(summary)
}

/// Parse a timestamp or a plain date (midnight)
fn parse_date(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();

    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }

    let formats = [
        "%Y-%m-%d", // 2026-01-15
        "%d/%m/%Y", // 15/01/2026
        "%d-%m-%Y", // 15-01-2026
        "%Y/%m/%d", // 2026/01/15
    ];
    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = date.and_hms_opt(0, 0, 0) {
                return Ok(dt);
            }
        }
    }

    Err(Error::Import(format!("Unable to parse date: {}", s)))
}

/// Parse an amount, tolerating pula prefixes and thousands separators
fn parse_amount(s: &str) -> Result<f64> {
    let trimmed = s.trim();
    let unprefixed = trimmed
        .strip_prefix("BWP")
        .or_else(|| trimmed.strip_prefix('P'))
        .unwrap_or(trimmed);
    let cleaned = unprefixed
        .replace([',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    let amount = cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unable to parse amount: {}", s)))?;
    if !amount.is_finite() {
        return Err(Error::Import(format!("Unable to parse amount: {}", s)));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(parse_date("2026-01-15").unwrap(), expected);
        assert_eq!(parse_date("15/01/2026").unwrap(), expected);
        assert_eq!(
            parse_date("2026-01-15 08:30:00").unwrap(),
            expected + chrono::Duration::minutes(510)
        );
        assert!(parse_date("yesterday").is_err());
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("P1,234.50").unwrap(), 1234.5);
        assert_eq!(parse_amount("BWP -80").unwrap(), -80.0);
        assert_eq!(parse_amount("(100.00)").unwrap(), -100.0);
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("ten").is_err());
    }

    #[test]
    fn test_parse_csv_categorizes_missing() {
        let csv = "date,description,amount,category
2026-03-01,Choppies Groceries,-150,
2026-03-02,Rent March,-2200,housing
";
        let rows = parse_csv(csv.as_bytes(), 7).unwrap();
        assert_eq!(rows.len(), 2);

        let (first, inferred) = &rows[0];
        assert!(*inferred);
        assert_eq!(first.category, "food");
        assert_eq!(first.user_id, 7);
        assert!(first.import_hash.is_some());

        let (second, inferred) = &rows[1];
        assert!(!*inferred);
        assert_eq!(second.category, "housing");
    }

    #[test]
    fn test_three_column_file() {
        let csv = "date,description,amount\n2026-03-01,Salary,8500\n";
        let rows = parse_csv(csv.as_bytes(), 1).unwrap();
        assert_eq!(rows[0].0.category, "salary");
        assert!(rows[0].1);
    }

    #[test]
    fn test_bad_row_reports_line() {
        let csv = "date,description,amount\n2026-03-01,Taxi,-20\nnot-a-date,Taxi,-20\n";
        let err = parse_csv(csv.as_bytes(), 1).unwrap_err().to_string();
        assert!(err.contains("Line 3"), "{}", err);
    }

    #[test]
    fn test_hash_is_per_user() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(
            import_hash(1, &date, "Taxi", -20.0),
            import_hash(1, &date, "Taxi", -20.0)
        );
        assert_ne!(
            import_hash(1, &date, "Taxi", -20.0),
            import_hash(2, &date, "Taxi", -20.0)
        );
    }
}
