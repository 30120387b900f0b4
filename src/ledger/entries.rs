use rusqlite::Connection;

use super::{guard, Ledger};
use crate::classify::classify_draft;
use crate::db::entries;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Entry, EntryDraft, EntryFilter};

/// Shape checks, ownership guard, then the classifier. Nothing is written
/// unless all three pass.
fn check_draft(conn: &Connection, user_id: i64, draft: &EntryDraft) -> LedgerResult<()> {
    let violations = draft.validate_shape();
    if !violations.is_empty() {
        return Err(LedgerError::Validation(violations));
    }
    guard::check_entry_refs(conn, user_id, draft)?;
    let violations = classify_draft(draft);
    if !violations.is_empty() {
        return Err(LedgerError::Validation(violations));
    }
    Ok(())
}

pub(super) fn insert_checked(conn: &Connection, user_id: i64, draft: &EntryDraft) -> LedgerResult<i64> {
    check_draft(conn, user_id, draft)?;
    Ok(entries::insert(conn, draft)?)
}

pub(super) fn load(conn: &Connection, id: i64) -> LedgerResult<Entry> {
    entries::get(conn, id)?
        .ok_or_else(|| LedgerError::Store(rusqlite::Error::QueryReturnedNoRows))
}

fn ensure_owned(conn: &Connection, user_id: i64, entry_id: i64) -> LedgerResult<()> {
    if !entries::belongs_to_user(conn, user_id, entry_id)? {
        return Err(LedgerError::not_owned("entry", entry_id, user_id));
    }
    Ok(())
}

impl Ledger {
    pub fn create_entry(&mut self, user_id: i64, draft: &EntryDraft) -> LedgerResult<Entry> {
        let tx = self.db.transaction()?;
        let id = insert_checked(&tx, user_id, draft)?;
        tx.commit()?;

        let entry = load(self.db.conn(), id)?;
        tracing::info!(user_id, entry_id = id, kind = %entry.kind, amount = %entry.amount, "entry created");
        self.notify(user_id, "entry.created", &entry);
        Ok(entry)
    }

    /// Replace every field of the entry and its whole tag set.
    pub fn update_entry(
        &mut self,
        user_id: i64,
        entry_id: i64,
        draft: &EntryDraft,
    ) -> LedgerResult<Entry> {
        let tx = self.db.transaction()?;
        ensure_owned(&tx, user_id, entry_id)?;
        check_draft(&tx, user_id, draft)?;
        entries::replace(&tx, entry_id, draft)?;
        tx.commit()?;

        let entry = load(self.db.conn(), entry_id)?;
        tracing::info!(user_id, entry_id, "entry updated");
        self.notify(user_id, "entry.updated", &entry);
        Ok(entry)
    }

    pub fn delete_entry(&mut self, user_id: i64, entry_id: i64) -> LedgerResult<()> {
        let tx = self.db.transaction()?;
        ensure_owned(&tx, user_id, entry_id)?;
        entries::soft_delete(&tx, entry_id)?;
        tx.commit()?;

        tracing::info!(user_id, entry_id, "entry deleted");
        self.notify(user_id, "entry.deleted", &entry_id);
        Ok(())
    }

    pub fn get_entry(&self, user_id: i64, entry_id: i64) -> LedgerResult<Entry> {
        ensure_owned(self.db.conn(), user_id, entry_id)?;
        let entry = load(self.db.conn(), entry_id)?;
        self.notify(user_id, "entry.viewed", &entry);
        Ok(entry)
    }

    /// All live entries of the user, newest first.
    pub fn list_entries(&self, user_id: i64) -> LedgerResult<Vec<Entry>> {
        Ok(entries::list_for_user(self.db.conn(), user_id)?)
    }

    pub fn filter_entries(&self, filter: &EntryFilter) -> LedgerResult<Vec<Entry>> {
        let violations = filter.validate();
        if !violations.is_empty() {
            return Err(LedgerError::Validation(violations));
        }
        let found = entries::by_filter(self.db.conn(), filter)?;
        tracing::debug!(user_id = filter.user_id, count = found.len(), "entries filtered");
        Ok(found)
    }
}
