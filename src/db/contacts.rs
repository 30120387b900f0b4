use rusqlite::{params, Connection, OptionalExtension};

use super::now_ts;
use crate::models::{Contact, ContactDraft};

const CONTACT_COLUMNS: &str = "id, user_id, name, email, phone, created_at, updated_at";

fn map_contact(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        email: row.get(3)?,
        phone: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

pub(crate) fn insert(conn: &Connection, user_id: i64, draft: &ContactDraft) -> rusqlite::Result<i64> {
    let now = now_ts();
    conn.execute(
        "INSERT INTO contacts (user_id, name, email, phone, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![
            user_id,
            draft.name.trim(),
            draft.email.trim(),
            draft.phone.trim(),
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn update(conn: &Connection, id: i64, draft: &ContactDraft) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE contacts SET name = ?1, email = ?2, phone = ?3, updated_at = ?4
         WHERE id = ?5 AND deleted_at IS NULL",
        params![
            draft.name.trim(),
            draft.email.trim(),
            draft.phone.trim(),
            now_ts(),
            id,
        ],
    )?;
    Ok(())
}

pub(crate) fn soft_delete(conn: &Connection, id: i64) -> rusqlite::Result<()> {
    let now = now_ts();
    conn.execute(
        "UPDATE contacts SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![now, id],
    )?;
    Ok(())
}

pub(crate) fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<Contact>> {
    conn.query_row(
        &format!("SELECT {CONTACT_COLUMNS} FROM contacts WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        map_contact,
    )
    .optional()
}

pub(crate) fn list_for_user(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Contact>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CONTACT_COLUMNS} FROM contacts
         WHERE user_id = ?1 AND deleted_at IS NULL ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![user_id], map_contact)?;
    rows.collect()
}

pub(crate) fn belongs_to_user(conn: &Connection, user_id: i64, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM contacts WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL)",
        params![id, user_id],
        |row| row.get(0),
    )
}

/// Whether another live contact of this user uses `column`'s value.
fn taken(
    conn: &Connection,
    column: &str,
    user_id: i64,
    value: &str,
    exclude_id: Option<i64>,
) -> rusqlite::Result<bool> {
    conn.query_row(
        &format!(
            "SELECT EXISTS(SELECT 1 FROM contacts
             WHERE user_id = ?1 AND {column} = ?2 COLLATE NOCASE AND deleted_at IS NULL
               AND id != ?3)"
        ),
        params![user_id, value.trim(), exclude_id.unwrap_or(0)],
        |row| row.get(0),
    )
}

pub(crate) fn name_taken(
    conn: &Connection,
    user_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> rusqlite::Result<bool> {
    taken(conn, "name", user_id, name, exclude_id)
}

pub(crate) fn email_taken(
    conn: &Connection,
    user_id: i64,
    email: &str,
    exclude_id: Option<i64>,
) -> rusqlite::Result<bool> {
    taken(conn, "email", user_id, email, exclude_id)
}
