//! Transaction filter builder for constructing ledger queries
//!
//! The same filter drives the SQL query built for [`Database`](super::Database)
//! and the in-memory evaluation used by other [`TransactionStore`](crate::store::TransactionStore)
//! implementations, so both agree on what "matches" means.

use chrono::NaiveDateTime;

use super::TIMESTAMP_FORMAT;
use crate::models::{Transaction, TransactionKind};

/// Builder for constructing transaction query filters
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub user_id: Option<i64>,
    /// Inclusive lower bound on the transaction timestamp
    pub since: Option<NaiveDateTime>,
    /// Inclusive upper bound on the transaction timestamp
    pub until: Option<NaiveDateTime>,
    pub kind: Option<TransactionKind>,
    pub category: Option<String>,
    pub limit: Option<usize>,
    /// Order by date descending (most recent first)
    pub newest_first: bool,
}

/// Result of building a filter - contains SQL components and parameters
pub struct FilterResult {
    /// WHERE clause including "WHERE" keyword (empty if no conditions)
    pub where_clause: String,
    /// ORDER BY clause including "ORDER BY" keyword
    pub order_clause: &'static str,
    /// LIMIT clause (empty if unbounded)
    pub limit_clause: String,
    /// Parameters for the query (boxed for rusqlite compatibility)
    pub params: Vec<Box<dyn rusqlite::ToSql>>,
}

impl TransactionFilter {
    /// Create a new filter builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter for one user's ledger
    pub fn for_user(user_id: i64) -> Self {
        Self::new().user_id(Some(user_id))
    }

    pub fn user_id(mut self, id: Option<i64>) -> Self {
        self.user_id = id;
        self
    }

    pub fn since(mut self, from: Option<NaiveDateTime>) -> Self {
        self.since = from;
        self
    }

    pub fn until(mut self, to: Option<NaiveDateTime>) -> Self {
        self.until = to;
        self
    }

    pub fn kind(mut self, kind: Option<TransactionKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn category(mut self, category: Option<&str>) -> Self {
        self.category = category.map(str::to_string);
        self
    }

    pub fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    pub fn newest_first(mut self, value: bool) -> Self {
        self.newest_first = value;
        self
    }

    /// Build the SQL filter components
    pub fn build(&self) -> FilterResult {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(uid) = self.user_id {
            conditions.push("user_id = ?");
            params.push(Box::new(uid));
        }

        if let Some(from) = self.since {
            conditions.push("date >= ?");
            params.push(Box::new(from.format(TIMESTAMP_FORMAT).to_string()));
        }

        if let Some(to) = self.until {
            conditions.push("date <= ?");
            params.push(Box::new(to.format(TIMESTAMP_FORMAT).to_string()));
        }

        match self.kind {
            Some(TransactionKind::Income) => conditions.push("amount > 0"),
            Some(TransactionKind::Expense) => conditions.push("amount <= 0"),
            None => {}
        }

        if let Some(ref category) = self.category {
            conditions.push("category = ?");
            params.push(Box::new(category.clone()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let order_clause = if self.newest_first {
            "ORDER BY date DESC, id DESC"
        } else {
            "ORDER BY date ASC, id ASC"
        };

        let limit_clause = self
            .limit
            .map(|n| format!("LIMIT {}", n))
            .unwrap_or_default();

        FilterResult {
            where_clause,
            order_clause,
            limit_clause,
            params,
        }
    }

    /// Check a single transaction against every condition except ordering and limit
    pub fn matches(&self, tx: &Transaction) -> bool {
        if self.user_id.is_some_and(|uid| tx.user_id != uid) {
            return false;
        }
        if self.since.is_some_and(|from| tx.date < from) {
            return false;
        }
        if self.until.is_some_and(|to| tx.date > to) {
            return false;
        }
        if self.kind.is_some_and(|kind| tx.kind() != kind) {
            return false;
        }
        if let Some(ref category) = self.category {
            if &tx.category != category {
                return false;
            }
        }
        true
    }

    /// Filter, order and bound an in-memory ledger the same way the SQL query does
    pub fn apply<'a, I>(&self, transactions: I) -> Vec<Transaction>
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut selected: Vec<Transaction> = transactions
            .into_iter()
            .filter(|tx| self.matches(tx))
            .cloned()
            .collect();

        selected.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        if self.newest_first {
            selected.reverse();
        }
        if let Some(n) = self.limit {
            selected.truncate(n);
        }
        selected
    }
}
