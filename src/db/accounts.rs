use rusqlite::{params, Connection, OptionalExtension};

use super::now_ts;
use crate::models::{Account, AccountDraft};

const ACCOUNT_COLUMNS: &str =
    "id, user_id, name, currency, color, icon, created_at, updated_at";

fn map_account(row: &rusqlite::Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        currency: row.get(3)?,
        color: row.get(4)?,
        icon: row.get(5)?,
        created_at: row.get(6)?,
        updated_at: row.get(7)?,
    })
}

pub(crate) fn insert(conn: &Connection, user_id: i64, draft: &AccountDraft) -> rusqlite::Result<i64> {
    let now = now_ts();
    conn.execute(
        "INSERT INTO accounts (user_id, name, currency, color, icon, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
        params![
            user_id,
            draft.name.trim(),
            draft.currency,
            draft.color,
            draft.icon,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Update display fields. The stated balance is never written here.
pub(crate) fn update(conn: &Connection, id: i64, draft: &AccountDraft) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE accounts SET name = ?1, currency = ?2, color = ?3, icon = ?4, updated_at = ?5
         WHERE id = ?6 AND deleted_at IS NULL",
        params![
            draft.name.trim(),
            draft.currency,
            draft.color,
            draft.icon,
            now_ts(),
            id,
        ],
    )?;
    Ok(())
}

pub(crate) fn soft_delete(conn: &Connection, id: i64) -> rusqlite::Result<()> {
    let now = now_ts();
    conn.execute(
        "UPDATE accounts SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![now, id],
    )?;
    Ok(())
}

pub(crate) fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Account>> {
    conn.query_row(
        &format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        map_account,
    )
    .optional()
}

pub(crate) fn list_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Account>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts
         WHERE user_id = ?1 AND deleted_at IS NULL ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![user_id], map_account)?;
    rows.collect()
}

pub(crate) fn belongs_to_user(conn: &Connection, user_id: i64, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL)",
        params![id, user_id],
        |row| row.get(0),
    )
}

/// Whether another live account of this user already has the name.
pub(crate) fn name_taken(
    conn: &Connection,
    user_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM accounts
         WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE AND deleted_at IS NULL
           AND id != ?3)",
        params![user_id, name.trim(), exclude_id.unwrap_or(0)],
        |row| row.get(0),
    )
}

/// Live entries that reference the account on either side.
pub(crate) fn entry_count(conn: &Connection, id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM entries
         WHERE deleted_at IS NULL AND (from_account_id = ?1 OR to_account_id = ?1)",
        params![id],
        |row| row.get(0),
    )
}
