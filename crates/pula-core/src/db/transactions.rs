//! Transaction operations

use rusqlite::{params, OptionalExtension};

use super::transaction_filter::TransactionFilter;
use super::{parse_datetime, parse_timestamp, Database, TIMESTAMP_FORMAT};
use crate::error::{Error, Result};
use crate::models::{CategoryTotal, NewTransaction, Transaction, TransactionUpdate};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, date, amount, category, description, import_hash, created_at";

impl Database {
    /// Insert a transaction
    ///
    /// Returns `None` when a row with the same import_hash already exists.
    /// Manual entries (no import_hash) are never treated as duplicates.
    pub fn insert_transaction(&self, tx: &NewTransaction) -> Result<Option<i64>> {
        if !tx.amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "amount must be a finite number, got {}",
                tx.amount
            )));
        }

        let conn = self.conn()?;

        if let Some(ref hash) = tx.import_hash {
            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM transactions WHERE import_hash = ?",
                    params![hash],
                    |row| row.get(0),
                )
                .optional()?;

            if existing.is_some() {
                return Ok(None); // Duplicate, skip
            }
        }

        conn.execute(
            r#"
            INSERT INTO transactions (user_id, date, amount, category, description, import_hash)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                tx.user_id,
                tx.date.format(TIMESTAMP_FORMAT).to_string(),
                tx.amount,
                tx.category,
                tx.description,
                tx.import_hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Get a single transaction by ID
    pub fn get_transaction(&self, id: i64) -> Result<Option<Transaction>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM transactions WHERE id = ?", TRANSACTION_COLUMNS);

        let transaction = conn
            .query_row(&sql, params![id], Self::row_to_transaction)
            .optional()?;

        Ok(transaction)
    }

    /// Apply an explicit edit to a transaction
    pub fn update_transaction(&self, id: i64, update: &TransactionUpdate) -> Result<()> {
        let Some(mut tx) = self.get_transaction(id)? else {
            return Err(Error::NotFound(format!("transaction {}", id)));
        };

        if let Some(date) = update.date {
            tx.date = date;
        }
        if let Some(amount) = update.amount {
            if !amount.is_finite() {
                return Err(Error::InvalidData(format!(
                    "amount must be a finite number, got {}",
                    amount
                )));
            }
            tx.amount = amount;
        }
        if let Some(ref category) = update.category {
            tx.category = category.clone();
        }
        if let Some(ref description) = update.description {
            tx.description = description.clone();
        }

        let conn = self.conn()?;
        conn.execute(
            "UPDATE transactions SET date = ?, amount = ?, category = ?, description = ? WHERE id = ?",
            params![
                tx.date.format(TIMESTAMP_FORMAT).to_string(),
                tx.amount,
                tx.category,
                tx.description,
                id
            ],
        )?;
        Ok(())
    }

    /// Delete a transaction, returning whether a row was removed
    pub fn delete_transaction(&self, id: i64) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM transactions WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Delete every transaction of a user, returning how many were removed
    pub fn clear_transactions(&self, user_id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM transactions WHERE user_id = ?",
            params![user_id],
        )?;
        Ok(deleted)
    }

    /// Query transactions matching a filter
    pub fn query_transactions(&self, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let built = filter.build();

        let sql = format!(
            "SELECT {} FROM transactions {} {} {}",
            TRANSACTION_COLUMNS, built.where_clause, built.order_clause, built.limit_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            built.params.iter().map(|p| p.as_ref()).collect();

        let transactions = stmt
            .query_map(params_refs.as_slice(), Self::row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// The `limit` most recent transactions of a user, returned in ascending date order
    pub fn recent_transactions(&self, user_id: i64, limit: usize) -> Result<Vec<Transaction>> {
        let filter = TransactionFilter::for_user(user_id)
            .newest_first(true)
            .limit(Some(limit));

        let mut transactions = self.query_transactions(&filter)?;
        transactions.reverse();
        Ok(transactions)
    }

    /// Sum of signed amounts matching a filter (ordering and limit are ignored)
    pub fn sum_transactions(&self, filter: &TransactionFilter) -> Result<f64> {
        let conn = self.conn()?;
        let built = filter.build();

        let sql = format!(
            "SELECT COALESCE(SUM(amount), 0) FROM transactions {}",
            built.where_clause
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            built.params.iter().map(|p| p.as_ref()).collect();

        let total: f64 = conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))?;
        Ok(total)
    }

    /// Totals per category for transactions matching a filter, largest first
    pub fn sum_by_category(&self, filter: &TransactionFilter) -> Result<Vec<CategoryTotal>> {
        let conn = self.conn()?;
        let built = filter.build();

        let sql = format!(
            r#"
            SELECT category, ABS(SUM(amount)) AS total, COUNT(*)
            FROM transactions
            {}
            GROUP BY category
            ORDER BY total DESC, category ASC
            "#,
            built.where_clause
        );
        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            built.params.iter().map(|p| p.as_ref()).collect();

        let totals = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok(CategoryTotal {
                    category: row.get(0)?,
                    amount: row.get(1)?,
                    count: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(totals)
    }

    /// Count transactions, optionally for a single user
    pub fn count_transactions(&self, user_id: Option<i64>) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = match user_id {
            Some(uid) => conn.query_row(
                "SELECT COUNT(*) FROM transactions WHERE user_id = ?",
                params![uid],
                |row| row.get(0),
            )?,
            None => conn.query_row("SELECT COUNT(*) FROM transactions", [], |row| row.get(0))?,
        };
        Ok(count)
    }

    /// Helper to convert a row to Transaction
    /// Column order: id, user_id, date, amount, category, description, import_hash, created_at
    pub(crate) fn row_to_transaction(row: &rusqlite::Row) -> rusqlite::Result<Transaction> {
        let date_str: String = row.get(2)?;
        let created_at_str: String = row.get(7)?;
        Ok(Transaction {
            id: row.get(0)?,
            user_id: row.get(1)?,
            date: parse_timestamp(&date_str)?,
            amount: row.get(3)?,
            category: row.get(4)?,
            description: row.get(5)?,
            import_hash: row.get(6)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
