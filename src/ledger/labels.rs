use rusqlite::Connection;

use super::{guard, Ledger};
use crate::db::labels;
use crate::error::{LedgerError, LedgerResult, Violation};
use crate::models::{Category, LabelDraft, Tag, SYSTEM_CATEGORY_ID};

fn validated(mut violations: Vec<Violation>, taken: bool, what: &str, name: &str) -> LedgerResult<()> {
    if taken {
        violations.push(Violation::new(
            "name",
            format!("a {what} named '{}' already exists", name.trim()),
        ));
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::Validation(violations))
    }
}

fn ensure_category_owned(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<()> {
    if id == SYSTEM_CATEGORY_ID {
        return Err(LedgerError::invalid(
            "category",
            "the System category cannot be modified",
        ));
    }
    if !labels::category_belongs_to_user(conn, user_id, id)? {
        return Err(LedgerError::not_owned("category", id, user_id));
    }
    Ok(())
}

fn ensure_tag_owned(conn: &Connection, user_id: i64, id: i64) -> LedgerResult<()> {
    if !labels::tag_belongs_to_user(conn, user_id, id)? {
        return Err(LedgerError::not_owned("tag", id, user_id));
    }
    Ok(())
}

fn load_category(conn: &Connection, id: i64) -> LedgerResult<Category> {
    labels::get_category(conn, id)?
        .ok_or_else(|| LedgerError::Store(rusqlite::Error::QueryReturnedNoRows))
}

fn load_tag(conn: &Connection, id: i64) -> LedgerResult<Tag> {
    labels::get_tag(conn, id)?.ok_or_else(|| LedgerError::Store(rusqlite::Error::QueryReturnedNoRows))
}

impl Ledger {
    // ── Categories ────────────────────────────────────────────

    pub fn create_category(&mut self, user_id: i64, draft: &LabelDraft) -> LedgerResult<Category> {
        let conn = self.db.conn();
        let taken = labels::category_name_taken(conn, user_id, &draft.name, None)?;
        validated(draft.validate_category(), taken, "category", &draft.name)?;

        let id = labels::insert_category(conn, user_id, draft)?;
        tracing::info!(user_id, category_id = id, name = %draft.name.trim(), "category created");
        load_category(conn, id)
    }

    pub fn update_category(
        &mut self,
        user_id: i64,
        category_id: i64,
        draft: &LabelDraft,
    ) -> LedgerResult<Category> {
        let conn = self.db.conn();
        ensure_category_owned(conn, user_id, category_id)?;
        let taken = labels::category_name_taken(conn, user_id, &draft.name, Some(category_id))?;
        validated(draft.validate_category(), taken, "category", &draft.name)?;

        labels::update_category(conn, category_id, draft)?;
        tracing::info!(user_id, category_id, "category updated");
        load_category(conn, category_id)
    }

    pub fn delete_category(&mut self, user_id: i64, category_id: i64) -> LedgerResult<()> {
        let tx = self.db.transaction()?;
        ensure_category_owned(&tx, user_id, category_id)?;
        guard::ensure_unreferenced("category", category_id, labels::category_usage(&tx, category_id)?)?;
        labels::soft_delete_category(&tx, category_id)?;
        tx.commit()?;

        tracing::info!(user_id, category_id, "category deleted");
        Ok(())
    }

    /// The user's categories plus the shared System category, by name.
    pub fn list_categories(&self, user_id: i64) -> LedgerResult<Vec<Category>> {
        Ok(labels::list_categories(self.db.conn(), user_id)?)
    }

    // ── Tags ──────────────────────────────────────────────────

    pub fn create_tag(&mut self, user_id: i64, draft: &LabelDraft) -> LedgerResult<Tag> {
        let conn = self.db.conn();
        let taken = labels::tag_name_taken(conn, user_id, &draft.name, None)?;
        validated(draft.validate(), taken, "tag", &draft.name)?;

        let id = labels::insert_tag(conn, user_id, draft)?;
        tracing::info!(user_id, tag_id = id, name = %draft.name.trim(), "tag created");
        load_tag(conn, id)
    }

    pub fn update_tag(&mut self, user_id: i64, tag_id: i64, draft: &LabelDraft) -> LedgerResult<Tag> {
        let conn = self.db.conn();
        ensure_tag_owned(conn, user_id, tag_id)?;
        let taken = labels::tag_name_taken(conn, user_id, &draft.name, Some(tag_id))?;
        validated(draft.validate(), taken, "tag", &draft.name)?;

        labels::update_tag(conn, tag_id, draft)?;
        tracing::info!(user_id, tag_id, "tag updated");
        load_tag(conn, tag_id)
    }

    pub fn delete_tag(&mut self, user_id: i64, tag_id: i64) -> LedgerResult<()> {
        let tx = self.db.transaction()?;
        ensure_tag_owned(&tx, user_id, tag_id)?;
        guard::ensure_unreferenced("tag", tag_id, labels::tag_usage(&tx, tag_id)?)?;
        labels::soft_delete_tag(&tx, tag_id)?;
        tx.commit()?;

        tracing::info!(user_id, tag_id, "tag deleted");
        Ok(())
    }

    pub fn list_tags(&self, user_id: i64) -> LedgerResult<Vec<Tag>> {
        Ok(labels::list_tags(self.db.conn(), user_id)?)
    }
}
