//! Structural rules that separate INCOME / EXPENSE from TRANSFER entries.
//!
//! The same check runs on create and on update; it is a pure function of the
//! entry kind and its account references.

use crate::error::Violation;
use crate::models::{EntryDraft, EntryKind};

pub const FROM_NOT_ALLOWED: &str = "from account not allowed for this kind";
pub const FROM_REQUIRED: &str = "from account required for transfer";
pub const ACCOUNTS_MUST_DIFFER: &str = "from and to accounts must differ";

const FIELD: &str = "fromAccount";

/// Return every structural violation, or an empty list when the shape is valid.
pub fn classify(kind: EntryKind, from_account_id: Option<i64>, to_account_id: i64) -> Vec<Violation> {
    let mut violations = Vec::new();
    match kind {
        EntryKind::Income | EntryKind::Expense => {
            if from_account_id.is_some() {
                violations.push(Violation::new(FIELD, FROM_NOT_ALLOWED));
            }
        }
        EntryKind::Transfer => match from_account_id {
            None => violations.push(Violation::new(FIELD, FROM_REQUIRED)),
            Some(from) if from == to_account_id => {
                violations.push(Violation::new(FIELD, ACCOUNTS_MUST_DIFFER));
            }
            Some(_) => {}
        },
    }
    violations
}

pub fn classify_draft(draft: &EntryDraft) -> Vec<Violation> {
    classify(draft.kind, draft.from_account_id, draft.to_account_id)
}

#[cfg(test)]
mod tests;
