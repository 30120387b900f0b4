//! Balance derivation. No balance is ever stored: an account's balance is the
//! signed sum of its live entries, split into a non-transfer and a transfer
//! component. The store supplies the rows; the folding happens here so the
//! arithmetic stays in exact decimals.

use rust_decimal::Decimal;

use crate::models::EntryKind;

/// The projection of an entry that balance arithmetic needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BalanceLine {
    pub kind: EntryKind,
    pub from_account_id: Option<i64>,
    pub to_account_id: i64,
    pub amount: Decimal,
}

/// +amount for INCOME, -amount for EXPENSE, over non-transfer lines whose `to`
/// side is `account_id`.
pub fn non_transfer_component(account_id: i64, lines: &[BalanceLine]) -> Decimal {
    lines
        .iter()
        .filter(|l| l.kind != EntryKind::Transfer && l.to_account_id == account_id)
        .map(|l| signed_amount(l.kind, l.amount))
        .sum()
}

/// +amount when `account_id` receives a transfer, -amount when it sends one.
pub fn transfer_component(account_id: i64, lines: &[BalanceLine]) -> Decimal {
    lines
        .iter()
        .filter(|l| l.kind == EntryKind::Transfer)
        .map(|l| {
            if l.to_account_id == account_id {
                l.amount
            } else if l.from_account_id == Some(account_id) {
                -l.amount
            } else {
                Decimal::ZERO
            }
        })
        .sum()
}

pub fn derive_balance(account_id: i64, lines: &[BalanceLine]) -> Decimal {
    non_transfer_component(account_id, lines) + transfer_component(account_id, lines)
}

/// Effect of an entry on its `to` account, ignoring transfers. Used by the
/// reports, which look at one side of the ledger only.
pub fn signed_amount(kind: EntryKind, amount: Decimal) -> Decimal {
    match kind {
        EntryKind::Income => amount,
        EntryKind::Expense => -amount,
        EntryKind::Transfer => Decimal::ZERO,
    }
}

/// `((this - last) / last) * 100`, floored to 0 when last month is 0.
pub fn month_over_month_rate(this_month: Decimal, last_month: Decimal) -> Decimal {
    if last_month.is_zero() {
        return Decimal::ZERO;
    }
    (this_month - last_month)
        .checked_div(last_month)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .map(|r| r.round_dp(2))
        .unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests;
