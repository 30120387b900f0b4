use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rusqlite::Connection;

use super::accounts::derived_balance;
use super::entries::insert_checked;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{EntryDraft, EntryKind, SYSTEM_CATEGORY_ID};

pub const INITIAL_BALANCE: &str = "Initial balance";
pub const ADJUSTED_BALANCE: &str = "Adjusted balance";

/// The entry kind and amount that move `current` onto `target`, if any.
pub(super) fn adjustment_for(current: Decimal, target: Decimal) -> Option<(EntryKind, Decimal)> {
    let delta = current - target;
    if delta > Decimal::ZERO {
        Some((EntryKind::Expense, delta))
    } else if delta < Decimal::ZERO {
        Some((EntryKind::Income, -delta))
    } else {
        None
    }
}

fn system_draft(
    kind: EntryKind,
    account_id: i64,
    amount: Decimal,
    description: &str,
    date: NaiveDateTime,
) -> EntryDraft {
    EntryDraft::new(kind, account_id, amount, SYSTEM_CATEGORY_ID, date).with_description(description)
}

/// Record a nonzero opening balance as an INCOME entry.
pub(super) fn record_opening_balance(
    conn: &Connection,
    user_id: i64,
    account_id: i64,
    balance: Decimal,
    date: NaiveDateTime,
) -> LedgerResult<Option<i64>> {
    if balance.is_zero() {
        return Ok(None);
    }
    let draft = system_draft(EntryKind::Income, account_id, balance, INITIAL_BALANCE, date);
    let id = insert_checked(conn, user_id, &draft).map_err(|e| LedgerError::Reconciliation {
        account_id,
        source: Box::new(e),
    })?;
    Ok(Some(id))
}

/// Append the compensating entry that makes the derived balance equal
/// `target`. Runs on the caller's transaction.
pub(super) fn reconcile(
    conn: &Connection,
    user_id: i64,
    account_id: i64,
    target: Decimal,
    date: NaiveDateTime,
) -> LedgerResult<Option<i64>> {
    let current = derived_balance(conn, account_id, None)?;
    let Some((kind, amount)) = adjustment_for(current, target) else {
        tracing::debug!(account_id, %current, "balance already matches");
        return Ok(None);
    };

    let draft = system_draft(kind, account_id, amount, ADJUSTED_BALANCE, date);
    let id = insert_checked(conn, user_id, &draft).map_err(|e| LedgerError::Reconciliation {
        account_id,
        source: Box::new(e),
    })?;
    tracing::info!(account_id, %current, %target, %kind, %amount, "balance adjusted");
    Ok(Some(id))
}
