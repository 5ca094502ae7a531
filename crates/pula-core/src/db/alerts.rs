//! Alert log operations
//!
//! Alerts are appended by the evaluator and only ever flipped inactive afterwards.

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Alert, AlertType, NewAlert};

impl Database {
    /// Append an alert
    pub fn insert_alert(&self, alert: &NewAlert) -> Result<i64> {
        let conn = self.conn()?;
        let metadata = serde_json::to_string(&alert.metadata)?;

        conn.execute(
            r#"
            INSERT INTO alerts (user_id, alert_type, message, severity, metadata)
            VALUES (?, ?, ?, ?, ?)
            "#,
            params![
                alert.user_id,
                alert.alert_type.as_str(),
                alert.message,
                alert.severity.as_str(),
                metadata,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// List alerts, newest first
    pub fn list_alerts(&self, user_id: Option<i64>, include_inactive: bool) -> Result<Vec<Alert>> {
        let conn = self.conn()?;

        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();
        if let Some(uid) = user_id {
            conditions.push("user_id = ?");
            params.push(Box::new(uid));
        }
        if !include_inactive {
            conditions.push("is_active = TRUE");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let sql = format!(
            r#"
            SELECT id, user_id, alert_type, message, severity, metadata, is_active, created_at
            FROM alerts
            {}
            ORDER BY created_at DESC, id DESC
            "#,
            where_clause
        );

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let alerts = stmt
            .query_map(params_refs.as_slice(), Self::row_to_alert)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(alerts)
    }

    /// Get a single alert by ID
    pub fn get_alert(&self, id: i64) -> Result<Option<Alert>> {
        let conn = self.conn()?;
        let alert = conn
            .query_row(
                r#"
                SELECT id, user_id, alert_type, message, severity, metadata, is_active, created_at
                FROM alerts WHERE id = ?
                "#,
                params![id],
                Self::row_to_alert,
            )
            .optional()?;
        Ok(alert)
    }

    /// Mark an alert inactive
    pub fn deactivate_alert(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE alerts SET is_active = FALSE WHERE id = ?",
            params![id],
        )?;

        if updated == 0 {
            return Err(Error::NotFound(format!("alert {}", id)));
        }
        Ok(())
    }

    /// Count active alerts of one type for a user
    pub fn count_active_alerts(&self, user_id: i64, alert_type: AlertType) -> Result<i64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM alerts WHERE user_id = ? AND alert_type = ? AND is_active = TRUE",
            params![user_id, alert_type.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn row_to_alert(row: &rusqlite::Row) -> rusqlite::Result<Alert> {
        let type_str: String = row.get(2)?;
        let severity_str: String = row.get(4)?;
        let metadata_str: String = row.get(5)?;
        let created_at_str: String = row.get(7)?;

        let conversion = |idx: usize, msg: String| {
            rusqlite::Error::FromSqlConversionFailure(
                idx,
                rusqlite::types::Type::Text,
                msg.into(),
            )
        };

        Ok(Alert {
            id: row.get(0)?,
            user_id: row.get(1)?,
            alert_type: type_str.parse().map_err(|e| conversion(2, e))?,
            message: row.get(3)?,
            severity: severity_str.parse().map_err(|e| conversion(4, e))?,
            metadata: serde_json::from_str(&metadata_str).unwrap_or_default(),
            is_active: row.get(6)?,
            created_at: parse_datetime(&created_at_str),
        })
    }
}
