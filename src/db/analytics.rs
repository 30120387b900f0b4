use chrono::NaiveDate;
use rusqlite::types::ToSql;
use rusqlite::Connection;
use rust_decimal::Decimal;

use super::{amount_from_sql, day_from_sql, kind_from_sql, param_refs};
use crate::models::{day_bounds, DateWindow, DayCount, EntryKind};

/// One live entry reduced to what the per-day reports fold over.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DayLine {
    pub day: NaiveDate,
    pub kind: EntryKind,
    pub amount: Decimal,
}

/// Live entries of the user in date order, optionally restricted to those
/// whose `to` side is `to_account_id`.
pub(crate) fn day_lines(
    conn: &Connection,
    user_id: i64,
    window: &DateWindow,
    to_account_id: Option<i64>,
) -> rusqlite::Result<Vec<DayLine>> {
    let mut sql = String::from(
        "SELECT substr(e.date, 1, 10), e.kind, e.amount
         FROM entries e
         JOIN accounts a ON a.id = e.to_account_id
         WHERE e.deleted_at IS NULL AND a.user_id = ?1",
    );
    let mut param_values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];

    if let Some((lo, hi)) = window.timestamp_bounds() {
        let n = param_values.len() + 1;
        sql.push_str(&format!(" AND e.date BETWEEN ?{n} AND ?{}", n + 1));
        param_values.push(Box::new(lo));
        param_values.push(Box::new(hi));
    }
    if let Some(account_id) = to_account_id {
        sql.push_str(&format!(" AND e.to_account_id = ?{}", param_values.len() + 1));
        param_values.push(Box::new(account_id));
    }
    sql.push_str(" ORDER BY e.date, e.id");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs(&param_values).as_slice(), |row| {
        let day: String = row.get(0)?;
        let kind: String = row.get(1)?;
        let amount: String = row.get(2)?;
        Ok(DayLine {
            day: day_from_sql(0, &day)?,
            kind: kind_from_sql(1, &kind)?,
            amount: amount_from_sql(2, &amount)?,
        })
    })?;
    rows.collect()
}

/// `(category name, amount)` for every live entry of one kind that touches
/// one of the user's accounts on either side.
pub(crate) fn category_lines(
    conn: &Connection,
    user_id: i64,
    kind: EntryKind,
    window: &DateWindow,
) -> rusqlite::Result<Vec<(String, Decimal)>> {
    let mut sql = String::from(
        "SELECT c.name, e.amount
         FROM entries e
         JOIN categories c ON c.id = e.category_id
         WHERE e.deleted_at IS NULL AND e.kind = ?2
           AND (e.to_account_id IN (SELECT id FROM accounts WHERE user_id = ?1)
                OR e.from_account_id IN (SELECT id FROM accounts WHERE user_id = ?1))",
    );
    let mut param_values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id), Box::new(kind.as_str())];
    if let Some((lo, hi)) = window.timestamp_bounds() {
        sql.push_str(" AND e.date BETWEEN ?3 AND ?4");
        param_values.push(Box::new(lo));
        param_values.push(Box::new(hi));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs(&param_values).as_slice(), |row| {
        let amount: String = row.get(1)?;
        Ok((row.get::<_, String>(0)?, amount_from_sql(1, &amount)?))
    })?;
    rows.collect()
}

/// Live entry counts per calendar day between `start` and `end` inclusive.
/// Days without entries are absent.
pub(crate) fn counts_by_day(
    conn: &Connection,
    user_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> rusqlite::Result<Vec<DayCount>> {
    let (lo, hi) = day_bounds(start, end);
    let mut stmt = conn.prepare(
        "SELECT substr(e.date, 1, 10) AS day, COUNT(*)
         FROM entries e
         JOIN accounts a ON a.id = e.to_account_id
         WHERE e.deleted_at IS NULL AND a.user_id = ?1 AND e.date BETWEEN ?2 AND ?3
         GROUP BY day
         ORDER BY day",
    )?;
    let rows = stmt.query_map(rusqlite::params![user_id, lo, hi], |row| {
        let day: String = row.get(0)?;
        Ok(DayCount {
            date: day_from_sql(0, &day)?,
            value: row.get(1)?,
        })
    })?;
    rows.collect()
}
