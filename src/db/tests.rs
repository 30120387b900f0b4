#![allow(clippy::unwrap_used)]

use super::*;
use crate::balance::derive_balance;
use crate::models::{AccountDraft, DateWindow, EntryDraft, EntryFilter, LabelDraft};
use chrono::NaiveDate;
use rust_decimal_macros::dec;

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

/// A user with two accounts.
fn setup(db: &Database) -> (i64, i64, i64) {
    let conn = db.conn();
    let user_id = users::insert(conn, "Alice", "alice").unwrap();
    let a = accounts::insert(conn, user_id, &AccountDraft::new("Checking")).unwrap();
    let b = accounts::insert(conn, user_id, &AccountDraft::new("Savings")).unwrap();
    (user_id, a, b)
}

fn expense(to: i64, amount: Decimal, date: NaiveDateTime) -> EntryDraft {
    EntryDraft::new(EntryKind::Expense, to, amount, SYSTEM_CATEGORY_ID, date)
}

// ── Schema ────────────────────────────────────────────────────

#[test]
fn test_system_category_seeded() {
    let db = Database::open_in_memory().unwrap();
    let system = labels::get_category(db.conn(), SYSTEM_CATEGORY_ID).unwrap().unwrap();
    assert_eq!(system.name, SYSTEM_CATEGORY_NAME);
    assert!(system.user_id.is_none());
    assert!(system.is_system());
}

#[test]
fn test_reopen_keeps_data_and_version() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");
    {
        let db = Database::open(&path).unwrap();
        setup(&db);
    }
    let db = Database::open(&path).unwrap();
    let version: i32 = db
        .conn()
        .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version, schema::CURRENT_VERSION);
    let count: i64 = db
        .conn()
        .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert!(users::find_by_username(db.conn(), "alice").unwrap().is_some());
}

#[test]
fn test_schema_rejects_malformed_transfer() {
    let db = Database::open_in_memory().unwrap();
    let (_, a, _) = setup(&db);
    let mut draft = expense(a, dec!(1), at(2024, 1, 1));
    draft.kind = EntryKind::Transfer;
    assert!(entries::insert(db.conn(), &draft).is_err());
}

// ── Accounts and labels ───────────────────────────────────────

#[test]
fn test_account_name_check_is_case_insensitive() {
    let db = Database::open_in_memory().unwrap();
    let (user_id, a, _) = setup(&db);
    let conn = db.conn();
    assert!(accounts::name_taken(conn, user_id, "CHECKING", None).unwrap());
    assert!(!accounts::name_taken(conn, user_id, "checking", Some(a)).unwrap());
    assert!(!accounts::name_taken(conn, user_id + 1, "Checking", None).unwrap());
}

#[test]
fn test_soft_deleted_rows_are_invisible() {
    let db = Database::open_in_memory().unwrap();
    let (user_id, a, _) = setup(&db);
    let conn = db.conn();
    accounts::soft_delete(conn, a).unwrap();
    assert!(accounts::get(conn, a).unwrap().is_none());
    assert!(!accounts::belongs_to_user(conn, user_id, a).unwrap());
    assert_eq!(accounts::list_for_user(conn, user_id).unwrap().len(), 1);
    // The name is free again
    accounts::insert(conn, user_id, &AccountDraft::new("Checking")).unwrap();

    let tag = labels::insert_tag(conn, user_id, &LabelDraft::new("trip")).unwrap();
    labels::soft_delete_tag(conn, tag).unwrap();
    assert_eq!(labels::count_owned_tags(conn, user_id, &[tag]).unwrap(), 0);
}

#[test]
fn test_categories_include_system() {
    let db = Database::open_in_memory().unwrap();
    let (user_id, _, _) = setup(&db);
    let conn = db.conn();
    labels::insert_category(conn, user_id, &LabelDraft::new("Food")).unwrap();
    let names: Vec<_> = labels::list_categories(conn, user_id)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Food", "System"]);
    assert!(!labels::category_belongs_to_user(conn, user_id, SYSTEM_CATEGORY_ID).unwrap());
}

// ── Entries ───────────────────────────────────────────────────

#[test]
fn test_replace_swaps_tag_set() {
    let db = Database::open_in_memory().unwrap();
    let (user_id, a, _) = setup(&db);
    let conn = db.conn();
    let trip = labels::insert_tag(conn, user_id, &LabelDraft::new("trip")).unwrap();
    let work = labels::insert_tag(conn, user_id, &LabelDraft::new("work")).unwrap();

    let id = entries::insert(conn, &expense(a, dec!(5), at(2024, 1, 1)).with_tags(vec![trip]))
        .unwrap();
    entries::replace(conn, id, &expense(a, dec!(6), at(2024, 1, 2)).with_tags(vec![work]))
        .unwrap();

    let entry = entries::get(conn, id).unwrap().unwrap();
    assert_eq!(entry.amount, dec!(6));
    assert_eq!(entry.tags.len(), 1);
    assert_eq!(entry.tags[0].name, "work");
    assert_eq!(labels::tag_usage(conn, trip).unwrap(), 0);

    entries::soft_delete(conn, id).unwrap();
    assert!(entries::get(conn, id).unwrap().is_none());
    assert_eq!(labels::tag_usage(conn, work).unwrap(), 0);
}

#[test]
fn test_amounts_keep_exact_scale() {
    let db = Database::open_in_memory().unwrap();
    let (_, a, _) = setup(&db);
    let conn = db.conn();
    let id = entries::insert(conn, &expense(a, dec!(0.10), at(2024, 1, 1))).unwrap();
    entries::insert(conn, &expense(a, dec!(0.20), at(2024, 1, 1))).unwrap();
    assert_eq!(entries::get(conn, id).unwrap().unwrap().amount.to_string(), "0.10");

    let lines = entries::non_transfer_lines(conn, a, None).unwrap();
    assert_eq!(derive_balance(a, &lines), dec!(-0.30));
}

#[test]
fn test_unreadable_amount_is_an_error() {
    let db = Database::open_in_memory().unwrap();
    let (user_id, a, _) = setup(&db);
    let conn = db.conn();
    let id = entries::insert(conn, &expense(a, dec!(1), at(2024, 1, 1))).unwrap();
    conn.execute("UPDATE entries SET amount = 'lots' WHERE id = ?1", params![id])
        .unwrap();

    assert!(entries::non_transfer_lines(conn, a, None).is_err());
    assert!(entries::list_for_user(conn, user_id).is_err());
}

#[test]
fn test_balance_lines_split_by_kind() {
    let db = Database::open_in_memory().unwrap();
    let (_, a, b) = setup(&db);
    let conn = db.conn();
    entries::insert(conn, &expense(a, dec!(3), at(2024, 1, 1))).unwrap();
    entries::insert(
        conn,
        &EntryDraft::transfer(b, a, dec!(10), SYSTEM_CATEGORY_ID, at(2024, 2, 1)),
    )
    .unwrap();

    let plain = entries::non_transfer_lines(conn, a, None).unwrap();
    let transfers = entries::transfer_lines(conn, a, None).unwrap();
    assert_eq!(plain.len(), 1);
    assert_eq!(transfers.len(), 1);
    assert_eq!(entries::transfer_lines(conn, b, None).unwrap().len(), 1);
    assert!(entries::transfer_lines(conn, a, Some("2024-01")).unwrap().is_empty());
}

#[test]
fn test_filter_combines_criteria() {
    let db = Database::open_in_memory().unwrap();
    let (user_id, a, b) = setup(&db);
    let conn = db.conn();
    entries::insert(conn, &expense(a, dec!(3), at(2024, 1, 1)).with_description("Coffee"))
        .unwrap();
    entries::insert(conn, &expense(b, dec!(4), at(2024, 1, 1)).with_description("coffee beans"))
        .unwrap();
    entries::insert(conn, &expense(a, dec!(5), at(2024, 1, 9)).with_description("Coffee"))
        .unwrap();

    let mut filter = EntryFilter::for_user(user_id);
    filter.description = Some("coffee".into());
    filter.account_ids = vec![a];
    filter.window = DateWindow::between(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
    );
    let found = entries::by_filter(conn, &filter).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].amount, dec!(3));
}

// ── Analytics ─────────────────────────────────────────────────

#[test]
fn test_day_lines_in_date_order() {
    let db = Database::open_in_memory().unwrap();
    let (user_id, a, b) = setup(&db);
    let conn = db.conn();
    entries::insert(conn, &expense(a, dec!(2), at(2024, 1, 9))).unwrap();
    entries::insert(conn, &expense(b, dec!(1), at(2024, 1, 3))).unwrap();

    let lines = analytics::day_lines(conn, user_id, &DateWindow::unbounded(), None).unwrap();
    let days: Vec<_> = lines.iter().map(|l| l.day.to_string()).collect();
    assert_eq!(days, vec!["2024-01-03", "2024-01-09"]);

    let only_b = analytics::day_lines(conn, user_id, &DateWindow::unbounded(), Some(b)).unwrap();
    assert_eq!(only_b.len(), 1);
}

#[test]
fn test_counts_by_day_skip_empty_days() {
    let db = Database::open_in_memory().unwrap();
    let (user_id, a, _) = setup(&db);
    let conn = db.conn();
    entries::insert(conn, &expense(a, dec!(1), at(2024, 6, 1))).unwrap();
    entries::insert(conn, &expense(a, dec!(1), at(2024, 6, 1))).unwrap();
    let gone = entries::insert(conn, &expense(a, dec!(1), at(2024, 6, 2))).unwrap();
    entries::soft_delete(conn, gone).unwrap();

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
    let counts = analytics::counts_by_day(conn, user_id, start, end).unwrap();
    assert_eq!(counts.len(), 1);
    assert_eq!(counts[0].value, 2);
}

#[test]
fn test_description_filter_folds_non_ascii_case() {
    let db = Database::open_in_memory().unwrap();
    let (user_id, a, _) = setup(&db);
    let conn = db.conn();
    let id = entries::insert(conn, &expense(a, dec!(4), at(2024, 1, 1)).with_description("Café Über"))
        .unwrap();
    entries::insert(conn, &expense(a, dec!(5), at(2024, 1, 1)).with_description("Cafe Uber"))
        .unwrap();

    let mut filter = EntryFilter::for_user(user_id);
    filter.description = Some("CAFÉ ÜBER".into());
    let found = entries::by_filter(conn, &filter).unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, id);
    assert_eq!(found[0].description, "Café Über");

    // The folded copy follows a rewrite
    entries::replace(conn, id, &expense(a, dec!(4), at(2024, 1, 1)).with_description("Straße"))
        .unwrap();
    filter.description = Some("STRASSE".into());
    assert!(entries::by_filter(conn, &filter).unwrap().is_empty());
    filter.description = Some("straße".into());
    assert_eq!(entries::by_filter(conn, &filter).unwrap().len(), 1);
    filter.description = Some("café".into());
    assert!(entries::by_filter(conn, &filter).unwrap().is_empty());
}

#[test]
fn test_top_cutoff_uses_exact_amounts() {
    let db = Database::open_in_memory().unwrap();
    let (user_id, a, _) = setup(&db);
    let conn = db.conn();
    // Both collapse to the same f64
    let small = entries::insert(conn, &expense(a, dec!(0.1000000000000000001), at(2024, 1, 1)))
        .unwrap();
    let big = entries::insert(conn, &expense(a, dec!(0.1000000000000000009), at(2024, 1, 2)))
        .unwrap();

    let top = entries::top(conn, user_id, &DateWindow::unbounded(), 1).unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].id, big);

    let both = entries::top(conn, user_id, &DateWindow::unbounded(), 5).unwrap();
    let ids: Vec<_> = both.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![big, small]);
}
