use rusqlite::{params, Connection, OptionalExtension};

use super::now_ts;
use crate::models::User;

const USER_COLUMNS: &str = "id, name, username, created_at";

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        created_at: row.get(3)?,
    })
}

pub(crate) fn insert(conn: &Connection, name: &str, username: &str) -> rusqlite::Result<i64> {
    conn.execute(
        "INSERT INTO users (name, username, created_at) VALUES (?1, ?2, ?3)",
        params![name, username, now_ts()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn get(conn: &Connection, id: i64) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
        params![id],
        map_user,
    )
    .optional()
}

pub(crate) fn find_by_username(conn: &Connection, username: &str) -> rusqlite::Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
        params![username],
        map_user,
    )
    .optional()
}

pub(crate) fn username_taken(conn: &Connection, username: &str) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = ?1)",
        params![username],
        |row| row.get(0),
    )
}
