use rusqlite::Connection;

use super::Ledger;
use crate::db::contacts;
use crate::error::{LedgerError, LedgerResult, Violation};
use crate::models::{Contact, ContactDraft};

/// Shape checks, then per-user uniqueness of both name and email.
fn check_draft(
    conn: &Connection,
    user_id: i64,
    draft: &ContactDraft,
    exclude_id: Option<i64>,
) -> LedgerResult<()> {
    let mut violations = draft.validate();
    if violations.is_empty() {
        if contacts::name_taken(conn, user_id, &draft.name, exclude_id)? {
            violations.push(Violation::new(
                "name",
                format!("a contact named '{}' already exists", draft.name.trim()),
            ));
        }
        if contacts::email_taken(conn, user_id, &draft.email, exclude_id)? {
            violations.push(Violation::new(
                "email",
                format!("a contact with email '{}' already exists", draft.email.trim()),
            ));
        }
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::Validation(violations))
    }
}

fn ensure_owned(conn: &Connection, user_id: i64, contact_id: i64) -> LedgerResult<()> {
    if !contacts::belongs_to_user(conn, user_id, contact_id)? {
        return Err(LedgerError::not_owned("contact", contact_id, user_id));
    }
    Ok(())
}

fn load(conn: &Connection, id: i64) -> LedgerResult<Contact> {
    contacts::get(conn, id)?.ok_or_else(|| LedgerError::Store(rusqlite::Error::QueryReturnedNoRows))
}

impl Ledger {
    pub fn create_contact(&mut self, user_id: i64, draft: &ContactDraft) -> LedgerResult<Contact> {
        let tx = self.db.transaction()?;
        check_draft(&tx, user_id, draft, None)?;
        let id = contacts::insert(&tx, user_id, draft)?;
        tx.commit()?;

        tracing::info!(user_id, contact_id = id, "contact created");
        load(self.db.conn(), id)
    }

    pub fn update_contact(
        &mut self,
        user_id: i64,
        contact_id: i64,
        draft: &ContactDraft,
    ) -> LedgerResult<Contact> {
        let tx = self.db.transaction()?;
        ensure_owned(&tx, user_id, contact_id)?;
        check_draft(&tx, user_id, draft, Some(contact_id))?;
        contacts::update(&tx, contact_id, draft)?;
        tx.commit()?;

        tracing::info!(user_id, contact_id, "contact updated");
        load(self.db.conn(), contact_id)
    }

    pub fn delete_contact(&mut self, user_id: i64, contact_id: i64) -> LedgerResult<()> {
        let tx = self.db.transaction()?;
        ensure_owned(&tx, user_id, contact_id)?;
        contacts::soft_delete(&tx, contact_id)?;
        tx.commit()?;

        tracing::info!(user_id, contact_id, "contact deleted");
        Ok(())
    }

    /// The user's live contacts, by name.
    pub fn list_contacts(&self, user_id: i64) -> LedgerResult<Vec<Contact>> {
        Ok(contacts::list_for_user(self.db.conn(), user_id)?)
    }
}
