//! Dashboard reports: monthly summary, category breakdown, balance trend

use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::params;

use super::transaction_filter::TransactionFilter;
use super::{Database, TIMESTAMP_FORMAT};
use crate::error::{Error, Result};
use crate::models::{BalancePoint, CategoryTotal, MonthlySummary, TransactionKind};

/// First and last instant of a calendar month
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDateTime, NaiveDateTime)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| Error::InvalidData(format!("invalid month {}-{:02}", year, month)))?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(|| Error::InvalidData(format!("invalid month {}-{:02}", year, month)))?;

    let start = first.and_time(NaiveTime::MIN);
    let end = next.and_time(NaiveTime::MIN) - Duration::seconds(1);
    Ok((start, end))
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN) + Duration::days(1) - Duration::seconds(1)
}

impl Database {
    /// Income, expenses and net for one calendar month
    pub fn monthly_summary(&self, user_id: i64, year: i32, month: u32) -> Result<MonthlySummary> {
        let (start, end) = month_bounds(year, month)?;
        let base = TransactionFilter::for_user(user_id)
            .since(Some(start))
            .until(Some(end));

        let income = self.sum_transactions(&base.clone().kind(Some(TransactionKind::Income)))?;
        let expenses = self
            .sum_transactions(&base.kind(Some(TransactionKind::Expense)))?
            .abs();

        Ok(MonthlySummary {
            income,
            expenses,
            net: income - expenses,
        })
    }

    /// Expense totals per category between two dates (inclusive), largest first
    pub fn category_breakdown(
        &self,
        user_id: i64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CategoryTotal>> {
        let filter = TransactionFilter::for_user(user_id)
            .since(Some(from.and_time(NaiveTime::MIN)))
            .until(Some(end_of_day(to)))
            .kind(Some(TransactionKind::Expense));
        self.sum_by_category(&filter)
    }

    /// Closing balance for each of the `days` days ending on `end` (oldest first)
    pub fn balance_trend(&self, user_id: i64, end: NaiveDate, days: u32) -> Result<Vec<BalancePoint>> {
        if days == 0 {
            return Ok(Vec::new());
        }
        let start = end - Duration::days(i64::from(days) - 1);
        let conn = self.conn()?;

        // Balance carried into the window
        let opening: f64 = conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions WHERE user_id = ? AND date < ?",
            params![
                user_id,
                start.and_time(NaiveTime::MIN).format(TIMESTAMP_FORMAT).to_string()
            ],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(
            r#"
            SELECT substr(date, 1, 10) AS day, SUM(amount)
            FROM transactions
            WHERE user_id = ? AND date >= ? AND date <= ?
            GROUP BY day
            "#,
        )?;
        let daily: HashMap<String, f64> = stmt
            .query_map(
                params![
                    user_id,
                    start.and_time(NaiveTime::MIN).format(TIMESTAMP_FORMAT).to_string(),
                    end_of_day(end).format(TIMESTAMP_FORMAT).to_string()
                ],
                |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)),
            )?
            .collect::<std::result::Result<_, _>>()?;

        let mut balance = opening;
        let points = start
            .iter_days()
            .take(days as usize)
            .map(|date| {
                balance += daily
                    .get(&date.format("%Y-%m-%d").to_string())
                    .copied()
                    .unwrap_or(0.0);
                BalancePoint { date, balance }
            })
            .collect();

        Ok(points)
    }

    /// Monthly summary for the month containing `today`
    pub fn current_month_summary(&self, user_id: i64, today: NaiveDate) -> Result<MonthlySummary> {
        self.monthly_summary(user_id, today.year(), today.month())
    }
}
