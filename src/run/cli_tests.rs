#![allow(clippy::unwrap_used)]

use super::*;
use crate::config::{Config, DEFAULT_LOG_FILTER};
use rust_decimal_macros::dec;

fn args(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn context(dir: &tempfile::TempDir) -> AppContext {
    let config = Config {
        database_path: dir.path().join("cli.db"),
        signing_key: None,
        log_filter: DEFAULT_LOG_FILTER.to_string(),
    };
    let mut ctx = AppContext::open(config).unwrap();
    ctx.ledger.create_user("Default", DEFAULT_USER).unwrap();
    ctx
}

fn default_user(ctx: &AppContext) -> i64 {
    ctx.ledger.find_user(DEFAULT_USER).unwrap().unwrap().id
}

// ── Argument helpers ──────────────────────────────────────────

#[test]
fn test_split_user_defaults() {
    let (user, rest) = split_user(&args(&["accounts"]));
    assert_eq!(user, DEFAULT_USER);
    assert_eq!(rest, args(&["accounts"]));
}

#[test]
fn test_split_user_anywhere() {
    let (user, rest) = split_user(&args(&["balance", "--user", "bob", "--month", "2024-01"]));
    assert_eq!(user, "bob");
    assert_eq!(rest, args(&["balance", "--month", "2024-01"]));
}

#[test]
fn test_flag_lookup() {
    let a = args(&["entry-add", "expense", "5", "--to", "Checking"]);
    assert_eq!(flag(&a, "--to"), Some("Checking"));
    assert_eq!(flag(&a, "--from"), None);
}

#[test]
fn test_parse_amount_strips_symbols() {
    assert_eq!(parse_amount("$1,234.50").unwrap(), dec!(1234.50));
    assert_eq!(parse_amount("-3").unwrap(), dec!(-3));
    assert!(parse_amount("abc").is_err());
}

#[test]
fn test_resolve_id_by_number_or_name() {
    let names = [(4, "Checking"), (7, "Savings")];
    assert_eq!(resolve_id("Account", "7", names).unwrap(), 7);
    assert_eq!(resolve_id("Account", "savings", names).unwrap(), 7);
    assert!(resolve_id("Account", "Brokerage", names).is_err());
}

#[test]
fn test_shellexpand_leaves_plain_paths() {
    assert_eq!(shellexpand("/tmp/out.csv"), "/tmp/out.csv");
    assert!(!shellexpand("~/out.csv").starts_with('~'));
}

// ── Commands ──────────────────────────────────────────────────

#[test]
fn test_help_and_version_need_no_user() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        database_path: dir.path().join("empty.db"),
        signing_key: None,
        log_filter: DEFAULT_LOG_FILTER.to_string(),
    };
    let mut ctx = AppContext::open(config).unwrap();
    as_cli(&args(&["help"]), &mut ctx).unwrap();
    as_cli(&args(&["--version"]), &mut ctx).unwrap();
    as_cli(&[], &mut ctx).unwrap();
}

#[test]
fn test_unknown_command_and_user() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);
    assert!(as_cli(&args(&["frobnicate"]), &mut ctx).is_err());
    assert!(as_cli(&args(&["--user", "ghost", "accounts"]), &mut ctx).is_err());
}

#[test]
fn test_account_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);
    let user = default_user(&ctx);

    as_cli(&args(&["account-add", "Checking", "--balance", "500"]), &mut ctx).unwrap();
    let summary = &ctx.ledger.list_accounts(user).unwrap()[0];
    assert_eq!(summary.balance, dec!(500));
    let id = summary.account.id;

    // Renaming alone keeps the balance
    as_cli(&args(&["account-edit", "checking", "--name", "Main"]), &mut ctx).unwrap();
    let summary = &ctx.ledger.list_accounts(user).unwrap()[0];
    assert_eq!(summary.account.name, "Main");
    assert_eq!(summary.balance, dec!(500));

    as_cli(&args(&["account-edit", "Main", "--balance", "320.25"]), &mut ctx).unwrap();
    assert_eq!(ctx.ledger.account_balance(user, id).unwrap(), dec!(320.25));

    // Still has entries from the opening balance and the adjustment
    assert!(as_cli(&args(&["account-delete", "Main"]), &mut ctx).is_err());
}

#[test]
fn test_entry_add_by_names() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);
    let user = default_user(&ctx);
    as_cli(&args(&["account-add", "Checking"]), &mut ctx).unwrap();
    as_cli(&args(&["account-add", "Savings"]), &mut ctx).unwrap();
    as_cli(&args(&["category-add", "Food", "--color", "#00FF00"]), &mut ctx).unwrap();
    as_cli(&args(&["tag-add", "trip"]), &mut ctx).unwrap();

    as_cli(
        &args(&[
            "entry-add", "expense", "12.50", "--to", "Checking", "--category", "food", "--tags",
            "trip", "--date", "2024-03-05", "--description", "Lunch",
        ]),
        &mut ctx,
    )
    .unwrap();
    as_cli(
        &args(&["entry-add", "transfer", "100", "--from", "Checking", "--to", "Savings"]),
        &mut ctx,
    )
    .unwrap();

    let entries = ctx.ledger.list_entries(user).unwrap();
    assert_eq!(entries.len(), 2);
    let lunch = entries.iter().find(|e| e.description == "Lunch").unwrap();
    assert_eq!(lunch.category.name, "Food");
    assert_eq!(lunch.tags.len(), 1);
    assert_eq!(lunch.date.format("%Y-%m-%d").to_string(), "2024-03-05");

    let accounts = ctx.ledger.list_accounts(user).unwrap();
    let checking = accounts.iter().find(|s| s.account.name == "Checking").unwrap();
    assert_eq!(checking.balance, dec!(-112.50));

    as_cli(&args(&["entries", "--kind", "transfer"]), &mut ctx).unwrap();
    as_cli(&args(&["report", "top", "--limit", "1"]), &mut ctx).unwrap();
    as_cli(&args(&["balance", "Savings", "--month", "2024-03"]), &mut ctx).unwrap();
}

#[test]
fn test_entry_add_rejects_transfer_without_source() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);
    as_cli(&args(&["account-add", "Checking"]), &mut ctx).unwrap();
    assert!(as_cli(&args(&["entry-add", "transfer", "5", "--to", "Checking"]), &mut ctx).is_err());
    assert!(as_cli(&args(&["entry-add", "refund", "5", "--to", "Checking"]), &mut ctx).is_err());
    assert!(as_cli(&args(&["entry-add", "expense"]), &mut ctx).is_err());
}

#[test]
fn test_report_arguments_are_checked() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);
    assert!(as_cli(&args(&["report", "forecast"]), &mut ctx).is_err());
    assert!(as_cli(&args(&["report", "top", "--limit", "0"]), &mut ctx).is_err());
    assert!(as_cli(&args(&["report", "counts", "--year", "1850"]), &mut ctx).is_err());
    as_cli(&args(&["report", "counts", "--year", "2024"]), &mut ctx).unwrap();
}

#[test]
fn test_export_writes_csv() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);
    as_cli(&args(&["account-add", "Checking", "--balance", "10"]), &mut ctx).unwrap();

    let out = dir.path().join("out.csv");
    let out_arg = out.display().to_string();
    as_cli(&args(&["export", &out_arg]), &mut ctx).unwrap();

    let written = std::fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    assert!(lines.next().unwrap().starts_with("id,date,kind"));
    let row = lines.next().unwrap();
    assert!(row.contains("INCOME"));
    assert!(row.contains("Checking"));
}

#[test]
fn test_contact_commands() {
    let dir = tempfile::tempdir().unwrap();
    let mut ctx = context(&dir);
    let user = default_user(&ctx);

    as_cli(
        &args(&["contact-add", "Ana Pop", "--email", "ana@example.com", "--phone", "0700"]),
        &mut ctx,
    )
    .unwrap();
    assert!(as_cli(&args(&["contact-add", "Dan Marin"]), &mut ctx).is_err());
    as_cli(&args(&["contacts"]), &mut ctx).unwrap();

    let contacts = ctx.ledger.list_contacts(user).unwrap();
    assert_eq!(contacts.len(), 1);
    assert_eq!(contacts[0].phone, "0700");

    as_cli(&args(&["contact-delete", "ana pop"]), &mut ctx).unwrap();
    assert!(ctx.ledger.list_contacts(user).unwrap().is_empty());
}
