use rusqlite::types::ToSql;
use rusqlite::{params, Connection, OptionalExtension};

use super::{now_ts, param_refs, placeholders};
use crate::models::{Category, LabelDraft, Tag};

// ── Categories ────────────────────────────────────────────────

const CATEGORY_COLUMNS: &str = "id, user_id, name, color, icon";

fn map_category(row: &rusqlite::Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        icon: row.get(4)?,
    })
}

pub(crate) fn insert_category(
    conn: &Connection,
    user_id: i64,
    draft: &LabelDraft,
) -> rusqlite::Result<i64> {
    let now = now_ts();
    conn.execute(
        "INSERT INTO categories (user_id, name, color, icon, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![user_id, draft.name.trim(), draft.color, draft.icon, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn update_category(conn: &Connection, id: i64, draft: &LabelDraft) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE categories SET name = ?1, color = ?2, icon = ?3, updated_at = ?4
         WHERE id = ?5 AND deleted_at IS NULL",
        params![draft.name.trim(), draft.color, draft.icon, now_ts(), id],
    )?;
    Ok(())
}

pub(crate) fn soft_delete_category(conn: &Connection, id: i64) -> rusqlite::Result<()> {
    let now = now_ts();
    conn.execute(
        "UPDATE categories SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![now, id],
    )?;
    Ok(())
}

pub(crate) fn get_category(conn: &Connection, id: i64) -> rusqlite::Result<Option<Category>> {
    conn.query_row(
        &format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        map_category,
    )
    .optional()
}

/// The user's live categories plus the shared system category.
pub(crate) fn list_categories(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Category>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories
         WHERE (user_id = ?1 OR user_id IS NULL) AND deleted_at IS NULL
         ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![user_id], map_category)?;
    rows.collect()
}

pub(crate) fn category_belongs_to_user(
    conn: &Connection,
    user_id: i64,
    id: i64,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL)",
        params![id, user_id],
        |row| row.get(0),
    )
}

pub(crate) fn category_name_taken(
    conn: &Connection,
    user_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM categories
         WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE AND deleted_at IS NULL AND id != ?3)",
        params![user_id, name.trim(), exclude_id.unwrap_or(0)],
        |row| row.get(0),
    )
}

pub(crate) fn category_usage(conn: &Connection, id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM entries WHERE category_id = ?1 AND deleted_at IS NULL",
        params![id],
        |row| row.get(0),
    )
}

// ── Tags ──────────────────────────────────────────────────────

const TAG_COLUMNS: &str = "id, user_id, name, color, icon";

fn map_tag(row: &rusqlite::Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        color: row.get(3)?,
        icon: row.get(4)?,
    })
}

pub(crate) fn insert_tag(conn: &Connection, user_id: i64, draft: &LabelDraft) -> rusqlite::Result<i64> {
    let now = now_ts();
    conn.execute(
        "INSERT INTO tags (user_id, name, color, icon, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        params![user_id, draft.name.trim(), draft.color, draft.icon, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub(crate) fn update_tag(conn: &Connection, id: i64, draft: &LabelDraft) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE tags SET name = ?1, color = ?2, icon = ?3, updated_at = ?4
         WHERE id = ?5 AND deleted_at IS NULL",
        params![draft.name.trim(), draft.color, draft.icon, now_ts(), id],
    )?;
    Ok(())
}

pub(crate) fn soft_delete_tag(conn: &Connection, id: i64) -> rusqlite::Result<()> {
    let now = now_ts();
    conn.execute(
        "UPDATE tags SET deleted_at = ?1, updated_at = ?1 WHERE id = ?2 AND deleted_at IS NULL",
        params![now, id],
    )?;
    Ok(())
}

pub(crate) fn get_tag(conn: &Connection, id: i64) -> rusqlite::Result<Option<Tag>> {
    conn.query_row(
        &format!("SELECT {TAG_COLUMNS} FROM tags WHERE id = ?1 AND deleted_at IS NULL"),
        params![id],
        map_tag,
    )
    .optional()
}

pub(crate) fn list_tags(conn: &Connection, user_id: i64) -> rusqlite::Result<Vec<Tag>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {TAG_COLUMNS} FROM tags WHERE user_id = ?1 AND deleted_at IS NULL ORDER BY name"
    ))?;
    let rows = stmt.query_map(params![user_id], map_tag)?;
    rows.collect()
}

pub(crate) fn tag_belongs_to_user(conn: &Connection, user_id: i64, id: i64) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?1 AND user_id = ?2 AND deleted_at IS NULL)",
        params![id, user_id],
        |row| row.get(0),
    )
}

pub(crate) fn tag_name_taken(
    conn: &Connection,
    user_id: i64,
    name: &str,
    exclude_id: Option<i64>,
) -> rusqlite::Result<bool> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM tags
         WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE AND deleted_at IS NULL AND id != ?3)",
        params![user_id, name.trim(), exclude_id.unwrap_or(0)],
        |row| row.get(0),
    )
}

/// How many of `tag_ids` are live tags owned by the user.
pub(crate) fn count_owned_tags(
    conn: &Connection,
    user_id: i64,
    tag_ids: &[i64],
) -> rusqlite::Result<i64> {
    if tag_ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "SELECT COUNT(*) FROM tags WHERE user_id = ?1 AND deleted_at IS NULL AND id IN ({})",
        placeholders(2, tag_ids.len())
    );
    let mut param_values: Vec<Box<dyn ToSql>> = vec![Box::new(user_id)];
    for id in tag_ids {
        param_values.push(Box::new(*id));
    }
    conn.query_row(&sql, param_refs(&param_values).as_slice(), |row| row.get(0))
}

/// Live entries carrying the tag.
pub(crate) fn tag_usage(conn: &Connection, id: i64) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM entry_tags et
         JOIN entries e ON e.id = et.entry_id
         WHERE et.tag_id = ?1 AND e.deleted_at IS NULL",
        params![id],
        |row| row.get(0),
    )
}
