use std::collections::HashMap;

use rusqlite::types::ToSql;
use rusqlite::{params, Connection};

use super::{
    amount_from_sql, entry_date_from_sql, fmt_entry_date, kind_from_sql, now_ts, param_refs,
    placeholders, push_in_clause,
};
use crate::balance::BalanceLine;
use crate::models::{DateWindow, Entry, EntryDraft, EntryFilter, LabelRef, DATE_FORMAT};

/// Live entries joined with their category and their `to` account, whose
/// owner is the entry's owner.
const ENTRY_SELECT: &str = "SELECT e.id, e.from_account_id, e.to_account_id, e.date, e.amount, e.kind,
        e.description, e.location, c.id, c.name, c.color, c.icon, e.created_at, e.updated_at
 FROM entries e
 JOIN categories c ON c.id = e.category_id
 JOIN accounts a ON a.id = e.to_account_id
 WHERE e.deleted_at IS NULL";

const TAG_CHUNK: usize = 500;

fn map_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entry> {
    let date: String = row.get(3)?;
    let amount: String = row.get(4)?;
    let kind: String = row.get(5)?;
    Ok(Entry {
        id: row.get(0)?,
        from_account_id: row.get(1)?,
        to_account_id: row.get(2)?,
        date: entry_date_from_sql(3, &date)?,
        amount: amount_from_sql(4, &amount)?,
        kind: kind_from_sql(5, &kind)?,
        description: row.get(6)?,
        location: row.get(7)?,
        category: LabelRef {
            id: row.get(8)?,
            name: row.get(9)?,
            color: row.get(10)?,
            icon: row.get(11)?,
        },
        tags: Vec::new(),
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn select_entries(
    conn: &Connection,
    where_sql: &str,
    param_values: &[Box<dyn ToSql>],
    tail: &str,
) -> rusqlite::Result<Vec<Entry>> {
    let sql = format!("{ENTRY_SELECT}{where_sql}{tail}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs(param_values).as_slice(), map_entry)?;
    let mut entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
    attach_tags(conn, &mut entries)?;
    Ok(entries)
}

fn attach_tags(conn: &Connection, entries: &mut [Entry]) -> rusqlite::Result<()> {
    let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
    let mut by_entry: HashMap<i64, Vec<LabelRef>> = HashMap::new();

    for chunk in ids.chunks(TAG_CHUNK) {
        let sql = format!(
            "SELECT et.entry_id, t.id, t.name, t.color, t.icon
             FROM entry_tags et JOIN tags t ON t.id = et.tag_id
             WHERE et.entry_id IN ({})
             ORDER BY t.name",
            placeholders(1, chunk.len())
        );
        let chunk_params: Vec<&dyn ToSql> = chunk.iter().map(|id| id as &dyn ToSql).collect();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(chunk_params.as_slice(), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                LabelRef {
                    id: row.get(1)?,
                    name: row.get(2)?,
                    color: row.get(3)?,
                    icon: row.get(4)?,
                },
            ))
        })?;
        for row in rows {
            let (entry_id, tag) = row?;
            by_entry.entry(entry_id).or_default().push(tag);
        }
    }

    for entry in entries.iter_mut() {
        if let Some(tags) = by_entry.remove(&entry.id) {
            entry.tags = tags;
        }
    }
    Ok(())
}

// ── Mutations ─────────────────────────────────────────────────

pub(crate) fn insert(conn: &Connection, draft: &EntryDraft) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO entries (from_account_id, to_account_id, date, amount, kind, description, description_folded, location, category_id, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)",
        params![
            draft.from_account_id,
            draft.to_account_id,
            fmt_entry_date(&draft.date),
            draft.amount.to_string(),
            draft.kind.as_str(),
            draft.description,
            draft.description.to_lowercase(),
            draft.location,
            draft.category_id,
            now_ts(),
        ],
    )?;
    let id = conn.last_insert_rowid();
    insert_tags(conn, id, &draft.tag_ids)?;
    Ok(id)
}

/// Replace every editable field and the tag set. Callers run this inside a
/// store transaction so both halves commit together.
pub(crate) fn replace(conn: &Connection, id: i64, draft: &EntryDraft) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE entries SET from_account_id = ?1, to_account_id = ?2, date = ?3, amount = ?4,
                kind = ?5, description = ?6, description_folded = ?7, location = ?8,
                category_id = ?9, updated_at = ?10
         WHERE id = ?11 AND deleted_at IS NULL",
        params![
            draft.from_account_id,
            draft.to_account_id,
            fmt_entry_date(&draft.date),
            draft.amount.to_string(),
            draft.kind.as_str(),
            draft.description,
            draft.description.to_lowercase(),
            draft.location,
            draft.category_id,
            now_ts(),
            id,
        ],
    )?;
    conn.execute("DELETE FROM entry_tags WHERE entry_id = ?1", params![id])?;
    insert_tags(conn, id, &draft.tag_ids)
}

/// Logically remove the entry and drop its tag associations.
pub(crate) fn soft_delete(conn: &Connection, id: i64) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM entry_tags WHERE entry_id = ?1", params![id])?;
    let now = now_ts();
    conn.execute(
        "UPDATE entries SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![now, id],
    )?;
    Ok(())
}

fn insert_tags(conn: &Connection, entry_id: i64, tag_ids: &[i64]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare("INSERT INTO entry_tags (entry_id, tag_id) VALUES (?1, ?2)")?;
    for tag_id in tag_ids {
        stmt.execute(params![entry_id, tag_id])?;
    }
    Ok(())
}

// ── Reads ─────────────────────────────────────────────────────

pub(crate) fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Entry>> {
    let param_values: Vec<Box<dyn ToSql>> = vec![Box::new(id)];
    Ok(select_entries(conn, " AND e.id = ?1", &param_values, "")?
        .into_iter()
        .next())
}

pub(crate) fn belongs_to_user(conn: &Connection, user_id: i64, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM entries e JOIN accounts a ON a.id = e.to_account_id
         WHERE e.id = ?1 AND a.user_id = ?2 AND e.deleted_at IS NULL)",
        params![id, user_id],
        |row| row.get(0),
    )
}

pub(crate) fn list_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Entry>> {
    let param_values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];
    select_entries(
        conn,
        " AND a.user_id = ?1",
        &param_values,
        " ORDER BY e.date DESC, e.id DESC",
    )
}

/// Entries where the account is either side, within a `YYYY-MM` month.
pub(crate) fn for_account_month(
    conn: &Connection,
    account_id: i64,
    month_key: &str,
) -> rusqlite::Result<Vec<Entry>> {
    let param_values: Vec<Box<dyn ToSql>> =
        vec![Box::new(account_id), Box::new(format!("{month_key}%"))];
    select_entries(
        conn,
        " AND (e.from_account_id = ?1 OR e.to_account_id = ?1) AND e.date LIKE ?2",
        &param_values,
        " ORDER BY e.date DESC, e.id DESC",
    )
}

pub(crate) fn by_filter(conn: &Connection, filter: &EntryFilter) -> rusqlite::Result<Vec<Entry>> {
    let mut sql = String::from(" AND a.user_id = ?1");
    let mut param_values: Vec<Box<dyn ToSql>> = vec![Box::new(filter.user_id)];

    if let Some(kind) = filter.kind {
        sql.push_str(&format!(" AND e.kind = ?{}", param_values.len() + 1));
        param_values.push(Box::new(kind.as_str()));
    }
    if let Some((lo, hi)) = filter.window.timestamp_bounds() {
        let n = param_values.len() + 1;
        sql.push_str(&format!(" AND e.date BETWEEN ?{n} AND ?{}", n + 1));
        param_values.push(Box::new(lo));
        param_values.push(Box::new(hi));
    }
    if let Some(day) = filter.day {
        sql.push_str(&format!(" AND e.date LIKE ?{}", param_values.len() + 1));
        param_values.push(Box::new(format!("{}%", day.format(DATE_FORMAT))));
    }
    if !filter.account_ids.is_empty() {
        let ph = placeholders(param_values.len() + 1, filter.account_ids.len());
        sql.push_str(&format!(
            " AND (e.to_account_id IN ({ph}) OR e.from_account_id IN ({ph}))"
        ));
        for id in &filter.account_ids {
            param_values.push(Box::new(*id));
        }
    }
    if !filter.category_ids.is_empty() {
        push_in_clause(&mut sql, &mut param_values, "e.category_id", &filter.category_ids);
    }
    if !filter.tag_ids.is_empty() {
        let ph = placeholders(param_values.len() + 1, filter.tag_ids.len());
        sql.push_str(&format!(
            " AND e.id IN (SELECT DISTINCT entry_id FROM entry_tags WHERE tag_id IN ({ph}))"
        ));
        for id in &filter.tag_ids {
            param_values.push(Box::new(*id));
        }
    }
    // SQLite only folds ASCII case, so both sides are lowercased in Rust
    if let Some(text) = filter.description.as_deref().filter(|s| !s.is_empty()) {
        sql.push_str(&format!(
            " AND e.description_folded LIKE ?{} ESCAPE '\\'",
            param_values.len() + 1
        ));
        param_values.push(Box::new(format!("%{}%", escape_like(&text.to_lowercase()))));
    }

    select_entries(conn, &sql, &param_values, " ORDER BY e.date DESC, e.id DESC")
}

/// The `limit` largest live entries of the user, largest first.
pub(crate) fn top(
    conn: &Connection,
    user_id: i64,
    window: &DateWindow,
    limit: u32,
) -> rusqlite::Result<Vec<Entry>> {
    let mut sql = String::from(" AND a.user_id = ?1");
    let mut param_values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];
    if let Some((lo, hi)) = window.timestamp_bounds() {
        sql.push_str(" AND e.date BETWEEN ?2 AND ?3");
        param_values.push(Box::new(lo));
        param_values.push(Box::new(hi));
    }
    // Amounts are TEXT; rank on exact decimals before cutting
    let mut entries = select_entries(conn, &sql, &param_values, "")?;
    entries.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.id.cmp(&b.id)));
    entries.truncate(limit as usize);
    Ok(entries)
}

// ── Balance inputs ────────────────────────────────────────────

/// Live INCOME/EXPENSE lines whose `to` side is the account.
pub(crate) fn non_transfer_lines(
    conn: &Connection,
    account_id: i64,
    month_key: Option<&str>,
) -> rusqlite::Result<Vec<BalanceLine>> {
    balance_lines(
        conn,
        "to_account_id = ?1 AND kind <> 'TRANSFER'",
        account_id,
        month_key,
    )
}

/// Live TRANSFER lines touching the account on either side.
pub(crate) fn transfer_lines(
    conn: &Connection,
    account_id: i64,
    month_key: Option<&str>,
) -> rusqlite::Result<Vec<BalanceLine>> {
    balance_lines(
        conn,
        "kind = 'TRANSFER' AND (to_account_id = ?1 OR from_account_id = ?1)",
        account_id,
        month_key,
    )
}

fn balance_lines(
    conn: &Connection,
    predicate: &str,
    account_id: i64,
    month_key: Option<&str>,
) -> rusqlite::Result<Vec<BalanceLine>> {
    let mut sql = format!(
        "SELECT kind, from_account_id, to_account_id, amount FROM entries
         WHERE deleted_at IS NULL AND {predicate}"
    );
    let mut param_values: Vec<Box<dyn ToSql>> = vec![Box::new(account_id)];
    if let Some(m) = month_key {
        sql.push_str(" AND date LIKE ?2");
        param_values.push(Box::new(format!("{m}%")));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(param_refs(&param_values).as_slice(), |row| {
        let kind: String = row.get(0)?;
        let amount: String = row.get(3)?;
        Ok(BalanceLine {
            kind: kind_from_sql(0, &kind)?,
            from_account_id: row.get(1)?,
            to_account_id: row.get(2)?,
            amount: amount_from_sql(3, &amount)?,
        })
    })?;
    rows.collect()
}

fn escape_like(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
