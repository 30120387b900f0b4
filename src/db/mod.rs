//! SQLite-backed ledger entry store.
//!
//! Query functions are free functions over `&Connection` so the service layer
//! can run them either directly or inside a `rusqlite::Transaction` when a
//! compound mutation has to commit as a unit.

pub(crate) mod accounts;
pub(crate) mod analytics;
pub(crate) mod contacts;
pub(crate) mod entries;
pub(crate) mod labels;
mod schema;
pub(crate) mod users;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::types::{ToSql, Type};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

use crate::models::{EntryKind, SYSTEM_CATEGORY_ID, SYSTEM_CATEGORY_NAME};

/// Stored form of an entry's user-meaningful date.
pub(crate) const ENTRY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        db.seed_system_category()?;
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        db.seed_system_category()?;
        Ok(db)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn transaction(&mut self) -> rusqlite::Result<rusqlite::Transaction<'_>> {
        self.conn.transaction()
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?;

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    fn seed_system_category(&mut self) -> Result<()> {
        let now = now_ts();
        self.conn.execute(
            "INSERT OR IGNORE INTO categories (id, user_id, name, color, icon, created_at, updated_at)
             VALUES (?1, NULL, ?2, '#000000', 'shield', ?3, ?3)",
            params![SYSTEM_CATEGORY_ID, SYSTEM_CATEGORY_NAME, now],
        )?;
        Ok(())
    }
}

// ── Conversions ───────────────────────────────────────────────

pub(crate) fn now_ts() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub(crate) fn fmt_entry_date(date: &NaiveDateTime) -> String {
    date.format(ENTRY_DATE_FORMAT).to_string()
}

pub(crate) fn entry_date_from_sql(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, ENTRY_DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn day_from_sql(idx: usize, raw: &str) -> rusqlite::Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(raw, crate::models::DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn amount_from_sql(idx: usize, raw: &str) -> rusqlite::Result<Decimal> {
    Decimal::from_str(raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn kind_from_sql(idx: usize, raw: &str) -> rusqlite::Result<EntryKind> {
    EntryKind::parse(raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            Type::Text,
            format!("unknown entry kind '{raw}'").into(),
        )
    })
}

/// Append `AND <column> IN (?n, ...)` and its parameters.
pub(crate) fn push_in_clause(
    sql: &mut String,
    param_values: &mut Vec<Box<dyn ToSql>>,
    column: &str,
    ids: &[i64],
) {
    let placeholders = placeholders(param_values.len() + 1, ids.len());
    sql.push_str(&format!(" AND {column} IN ({placeholders})"));
    for id in ids {
        param_values.push(Box::new(*id));
    }
}

/// `?start, ?start+1, ...` for `count` parameters.
pub(crate) fn placeholders(start: usize, count: usize) -> String {
    (0..count)
        .map(|i| format!("?{}", start + i))
        .collect::<Vec<_>>()
        .join(",")
}

pub(crate) fn param_refs(param_values: &[Box<dyn ToSql>]) -> Vec<&dyn ToSql> {
    param_values.iter().map(|p| p.as_ref()).collect()
}

#[cfg(test)]
mod tests;
