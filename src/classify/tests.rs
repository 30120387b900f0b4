#![allow(clippy::unwrap_used)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use super::*;

fn messages(kind: EntryKind, from: Option<i64>, to: i64) -> Vec<String> {
    classify(kind, from, to)
        .into_iter()
        .map(|v| v.message)
        .collect()
}

#[test]
fn test_income_and_expense_without_from_are_valid() {
    assert!(classify(EntryKind::Income, None, 1).is_empty());
    assert!(classify(EntryKind::Expense, None, 1).is_empty());
}

#[test]
fn test_income_and_expense_reject_from() {
    assert_eq!(messages(EntryKind::Income, Some(2), 1), vec![FROM_NOT_ALLOWED]);
    assert_eq!(messages(EntryKind::Expense, Some(2), 1), vec![FROM_NOT_ALLOWED]);
    // Even a from equal to `to` is just "not allowed"
    assert_eq!(messages(EntryKind::Expense, Some(1), 1), vec![FROM_NOT_ALLOWED]);
}

#[test]
fn test_transfer_requires_from() {
    assert_eq!(messages(EntryKind::Transfer, None, 1), vec![FROM_REQUIRED]);
}

#[test]
fn test_transfer_requires_distinct_accounts() {
    assert_eq!(messages(EntryKind::Transfer, Some(4), 4), vec![ACCOUNTS_MUST_DIFFER]);
}

#[test]
fn test_valid_transfer() {
    assert!(classify(EntryKind::Transfer, Some(1), 2).is_empty());
}

#[test]
fn test_violations_name_the_from_field() {
    for v in classify(EntryKind::Transfer, None, 1) {
        assert_eq!(v.field, "fromAccount");
    }
}

#[test]
fn test_classify_draft_matches_classify() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap();
    let mut draft = EntryDraft::transfer(3, 3, dec!(10), 1, date);
    assert_eq!(classify_draft(&draft), classify(EntryKind::Transfer, Some(3), 3));
    draft.from_account_id = Some(5);
    assert!(classify_draft(&draft).is_empty());
}
