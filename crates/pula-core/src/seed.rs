//! Sample ledger for demos
//!
//! Builds 45 days of Botswana-flavoured history ending at `now`: a government
//! salary on the 25th, occasional freelance and craft income, everyday
//! expenses that get denser over the last two weeks, and a handful of large
//! recent bills that push the forecast into a shortfall. The schedule is
//! fixed, so the same `now` always yields the same ledger.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use tracing::info;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::NewTransaction;

/// Days of history generated
pub const SEED_DAYS: i64 = 45;

const SALARY: (&str, f64, &str) = ("Salary - Government Job", 8500.0, "salary");

const SIDE_INCOME: &[(&str, f64, &str)] = &[
    ("Freelance Web Design", 1200.0, "freelance"),
    ("Side Business - Crafts", 800.0, "business"),
];

/// (description, low, high, category)
const EXPENSES: &[(&str, f64, f64, &str)] = &[
    ("Groceries - Choppies", 150.0, 300.0, "food"),
    ("Transport - Combis", 80.0, 150.0, "transport"),
    ("Rent - 2BR Flat", 2200.0, 2200.0, "housing"),
    ("Electricity - BPC", 180.0, 280.0, "housing"),
    ("Water Bill", 120.0, 180.0, "housing"),
    ("Internet - Orange", 299.0, 299.0, "communication"),
    ("Fuel - Shell/Engen", 200.0, 400.0, "transport"),
    ("Medical - Consultation", 150.0, 500.0, "healthcare"),
    ("Entertainment - Movies", 80.0, 200.0, "entertainment"),
    ("Clothing - Woolworths", 200.0, 800.0, "clothing"),
    ("Phone Airtime", 50.0, 100.0, "communication"),
    ("Restaurant - Nandos/Steers", 120.0, 250.0, "food"),
];

const LARGE_EXPENSES: &[(&str, f64, &str)] = &[
    ("Car Repair - Brake Service", 1500.0, "transport"),
    ("Medical Emergency", 2200.0, "healthcare"),
    ("Laptop Replacement", 4500.0, "shopping"),
    ("Insurance Premium", 1800.0, "financial"),
];

fn entry(
    user_id: i64,
    date: NaiveDateTime,
    description: &str,
    amount: f64,
    category: &str,
) -> NewTransaction {
    NewTransaction {
        user_id,
        date,
        amount: (amount * 100.0).round() / 100.0,
        category: category.to_string(),
        description: description.to_string(),
        import_hash: None,
    }
}

/// Generate the sample ledger for `user_id` ending at `now`
pub fn sample_ledger(user_id: i64, now: NaiveDateTime) -> Vec<NewTransaction> {
    let start = (now - Duration::days(SEED_DAYS))
        .with_hour(0)
        .and_then(|d| d.with_minute(0))
        .and_then(|d| d.with_second(0))
        .unwrap_or(now - Duration::days(SEED_DAYS));
    let recent_from = now - Duration::days(15);

    let mut ledger = Vec::new();
    for i in 0..=SEED_DAYS {
        let day = start + Duration::days(i);
        if day > now {
            break;
        }
        let step = i as usize;

        if day.day() == 25 {
            let (description, amount, category) = SALARY;
            ledger.push(entry(user_id, day + Duration::hours(8), description, amount, category));
        }

        // Side income roughly one day in ten, 50% to 150% of the usual amount
        if step % 10 == 3 {
            let (description, base, category) = SIDE_INCOME[(step / 10) % SIDE_INCOME.len()];
            let factor = 0.5 + (step % 3) as f64 * 0.5;
            ledger.push(entry(
                user_id,
                day + Duration::hours(14),
                description,
                base * factor,
                category,
            ));
        }

        let count = if day >= recent_from {
            1 + step % 3
        } else if step % 5 < 2 {
            1 + step % 2
        } else {
            0
        };

        for k in 0..count {
            let (description, low, high, category) = EXPENSES[(step * 7 + k * 3) % EXPENSES.len()];
            let fraction = ((step * 13 + k * 5) % 10) as f64 / 9.0;
            let amount = low + (high - low) * fraction;
            let hour = 8 + ((step + k * 4) % 13) as i64;
            ledger.push(entry(
                user_id,
                day + Duration::hours(hour),
                description,
                -amount,
                category,
            ));
        }
    }

    for (i, (description, amount, category)) in LARGE_EXPENSES.iter().enumerate() {
        ledger.push(entry(
            user_id,
            now - Duration::days(i as i64 + 1),
            description,
            -amount,
            category,
        ));
    }

    // Nothing lands in the future on the final day
    ledger.retain(|t| t.date <= now);
    ledger.sort_by_key(|t| t.date);
    ledger
}

/// Replace a user's ledger with the sample ledger, returning rows inserted
pub fn seed_sample_data(db: &Database, user_id: i64, now: NaiveDateTime) -> Result<usize> {
    if db.get_user(user_id)?.is_none() {
        return Err(Error::NotFound(format!("user {}", user_id)));
    }

    let removed = db.clear_transactions(user_id)?;
    let ledger = sample_ledger(user_id, now);
    for tx in &ledger {
        db.insert_transaction(tx)?;
    }

    let balance: f64 = ledger.iter().map(|t| t.amount).sum();
    info!(
        user_id,
        removed,
        inserted = ledger.len(),
        balance,
        "Seeded sample ledger"
    );
    Ok(ledger.len())
}
