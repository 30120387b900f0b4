use rusqlite::Connection;

use crate::db::{accounts, labels};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryDraft, EntryKind, SYSTEM_CATEGORY_ID};

/// Every account, category and tag the draft references must be live and
/// owned by `user_id`. The System category is exempt.
pub(super) fn check_entry_refs(
    conn: &Connection,
    user_id: i64,
    draft: &EntryDraft,
) -> LedgerResult<()> {
    if !accounts::belongs_to_user(conn, user_id, draft.to_account_id)? {
        return Err(LedgerError::not_owned("account", draft.to_account_id, user_id));
    }
    if draft.kind == EntryKind::Transfer {
        if let Some(from) = draft.from_account_id {
            if !accounts::belongs_to_user(conn, user_id, from)? {
                return Err(LedgerError::not_owned("account", from, user_id));
            }
        }
    }
    if draft.category_id != SYSTEM_CATEGORY_ID
        && !labels::category_belongs_to_user(conn, user_id, draft.category_id)?
    {
        return Err(LedgerError::not_owned("category", draft.category_id, user_id));
    }
    if !draft.tag_ids.is_empty() {
        let found = labels::count_owned_tags(conn, user_id, &draft.tag_ids)?;
        if found != draft.tag_ids.len() as i64 {
            return Err(LedgerError::Ownership(format!(
                "tags {:?} do not exist or do not belong to user {user_id}",
                draft.tag_ids
            )));
        }
    }
    Ok(())
}

/// Reject the deletion while live entries still point at the entity.
pub(super) fn ensure_unreferenced(entity: &'static str, id: i64, count: i64) -> LedgerResult<()> {
    if count > 0 {
        tracing::info!(entity, id, count, "deletion blocked by live entries");
        return Err(LedgerError::ReferentialConflict { entity, id, count });
    }
    Ok(())
}
