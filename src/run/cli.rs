use anyhow::{Context, Result};
use chrono::{Local, NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;

use crate::config::AppContext;
use crate::error::LedgerError;
use crate::export::CsvExporter;
use crate::ledger::Ledger;
use crate::models::{
    parse_date, parse_month, AccountDraft, AccountSummary, Category, ContactDraft, DateWindow, Entry,
    EntryDraft, EntryFilter, EntryKind, EvolutionParams, LabelDraft, Tag, TopEntriesParams,
    SYSTEM_CATEGORY_ID,
};

pub const DEFAULT_USER: &str = "default";

pub fn as_cli(args: &[String], ctx: &mut AppContext) -> Result<()> {
    let (username, args) = split_user(args);
    let Some(command) = args.first() else {
        print_usage();
        return Ok(());
    };
    let rest = &args[1..];

    match command.as_str() {
        "--help" | "-h" | "help" => {
            print_usage();
            return Ok(());
        }
        "--version" | "-V" | "version" => {
            println!("fintrack {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    let ledger = &mut ctx.ledger;
    let user_id = ledger
        .find_user(&username)?
        .map(|u| u.id)
        .ok_or_else(|| anyhow::anyhow!("Unknown user '{username}'"))?;

    match command.as_str() {
        "accounts" => cli_accounts(ledger, user_id),
        "account-add" => cli_account_add(rest, ledger, user_id),
        "account-edit" => cli_account_edit(rest, ledger, user_id),
        "account-delete" => {
            let id = account_id(first_arg(rest, "account-delete <account>")?, ledger, user_id)?;
            ledger.delete_account(user_id, id)?;
            println!("Deleted account {id}");
            Ok(())
        }
        "categories" => cli_categories(ledger, user_id),
        "category-add" => {
            let draft = label_draft(rest, "category-add <name> [--color #RRGGBB]")?;
            let category = ledger.create_category(user_id, &draft)?;
            println!("Created category {} ({})", category.name, category.id);
            Ok(())
        }
        "category-delete" => {
            let id = category_id(first_arg(rest, "category-delete <category>")?, ledger, user_id)?;
            ledger.delete_category(user_id, id)?;
            println!("Deleted category {id}");
            Ok(())
        }
        "tags" => cli_tags(ledger, user_id),
        "tag-add" => {
            let draft = label_draft(rest, "tag-add <name> [--color #RRGGBB]")?;
            let tag = ledger.create_tag(user_id, &draft)?;
            println!("Created tag {} ({})", tag.name, tag.id);
            Ok(())
        }
        "tag-delete" => {
            let id = tag_id(first_arg(rest, "tag-delete <tag>")?, ledger, user_id)?;
            ledger.delete_tag(user_id, id)?;
            println!("Deleted tag {id}");
            Ok(())
        }
        "contacts" => cli_contacts(ledger, user_id),
        "contact-add" => {
            let usage = "contact-add <name> --email <email> [--phone <phone>]";
            let name = first_arg(rest, usage)?;
            let email = flag(rest, "--email")
                .ok_or_else(|| anyhow::anyhow!("Usage: fintrack {usage}"))?;
            let mut draft = ContactDraft::new(name, email);
            if let Some(phone) = flag(rest, "--phone") {
                draft.phone = phone.to_string();
            }
            let contact = ledger.create_contact(user_id, &draft)?;
            println!("Created contact {} ({})", contact.name, contact.id);
            Ok(())
        }
        "contact-delete" => {
            let raw = first_arg(rest, "contact-delete <contact>")?;
            let contacts = ledger.list_contacts(user_id)?;
            let id = resolve_id("Contact", raw, contacts.iter().map(|c| (c.id, c.name.as_str())))?;
            ledger.delete_contact(user_id, id)?;
            println!("Deleted contact {id}");
            Ok(())
        }
        "entry-add" => cli_entry_add(rest, ledger, user_id),
        "entry-delete" => {
            let raw = first_arg(rest, "entry-delete <id>")?;
            let id: i64 = raw.parse().with_context(|| format!("Invalid entry id '{raw}'"))?;
            ledger.delete_entry(user_id, id)?;
            println!("Deleted entry {id}");
            Ok(())
        }
        "entries" | "e" => {
            let filter = filter_from_args(rest, ledger, user_id)?;
            print_entries(&ledger.filter_entries(&filter)?);
            Ok(())
        }
        "balance" | "b" => cli_balance(rest, ledger, user_id),
        "report" | "r" => cli_report(rest, ledger, user_id),
        "export" => cli_export(rest, ledger, user_id),
        other => {
            print_usage();
            anyhow::bail!("Unknown command: {other}");
        }
    }
}

fn print_usage() {
    println!("fintrack: personal finance ledger");
    println!();
    println!("Usage: fintrack [--user <username>] <command>");
    println!();
    println!("Commands:");
    println!("  accounts                      List accounts with derived balances");
    println!("  account-add <name>            Create an account");
    println!("    --balance <amount>          Opening balance (default: 0)");
    println!("    --currency <XXX>            Currency code (default: USD)");
    println!("    --color <#RRGGBB>           Display color");
    println!("  account-edit <account>        Edit an account; --balance reconciles");
    println!("    --name, --balance, --currency, --color");
    println!("  account-delete <account>      Delete an account without entries");
    println!("  categories                    List categories");
    println!("  category-add <name>           Create a category");
    println!("  category-delete <category>    Delete an unused category");
    println!("  tags                          List tags");
    println!("  tag-add <name>                Create a tag");
    println!("  tag-delete <tag>              Delete an unused tag");
    println!("  contacts                      List contacts");
    println!("  contact-add <name>            Create a contact");
    println!("    --email <email>             Email (required)");
    println!("    --phone <phone>             Phone number");
    println!("  contact-delete <contact>      Delete a contact");
    println!("  entry-add <kind> <amount>     Record INCOME, EXPENSE or TRANSFER");
    println!("    --to <account>              Receiving account (required)");
    println!("    --from <account>            Sending account (transfers)");
    println!("    --category <category>       Category (default: System)");
    println!("    --tags <a,b>                Tags");
    println!("    --date <YYYY-MM-DD>         Entry date (default: now)");
    println!("    --description <text>, --location <text>");
    println!("  entry-delete <id>             Delete an entry");
    println!("  entries                       List entries, newest first");
    println!("    --kind, --start, --end, --day, --account, --category, --tag, --search");
    println!("  balance [account]             Balance of one account or all of them");
    println!("    --month <YYYY-MM>           Only entries in that month");
    println!("  report <name>                 cash-flow | evolution | top | spending |");
    println!("                                income | counts (printed as JSON)");
    println!("    --start, --end, --account, --limit, --year");
    println!("  export [path]                 Export entries to CSV (entries filters apply)");
    println!("  --help, -h                    Show this help");
    println!("  --version, -V                 Show version");
}

// ── Argument helpers ──────────────────────────────────────────

/// Pull the global `--user <name>` pair out of the arguments.
pub(crate) fn split_user(args: &[String]) -> (String, Vec<String>) {
    let mut username = DEFAULT_USER.to_string();
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--user" {
            if let Some(name) = iter.next() {
                username = name.clone();
            }
        } else {
            rest.push(arg.clone());
        }
    }
    (username, rest)
}

pub(crate) fn flag<'a>(args: &'a [String], name: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == name)
        .map(|w| w[1].as_str())
}

fn first_arg<'a>(args: &'a [String], usage: &str) -> Result<&'a str> {
    args.first()
        .filter(|a| !a.starts_with("--"))
        .map(|a| a.as_str())
        .ok_or_else(|| anyhow::anyhow!("Usage: fintrack {usage}"))
}

pub(crate) fn parse_amount(s: &str) -> Result<Decimal> {
    let cleaned = s.replace(['$', ','], "");
    Decimal::from_str(cleaned.trim()).with_context(|| format!("Failed to parse '{s}' as an amount"))
}

fn parse_day(field: &'static str, s: &str) -> Result<NaiveDate> {
    parse_date(field, s).map_err(|v| LedgerError::Validation(vec![v]).into())
}

/// A numeric id, or a case-insensitive name looked up in `candidates`.
pub(crate) fn resolve_id<'a>(
    what: &str,
    raw: &str,
    candidates: impl IntoIterator<Item = (i64, &'a str)>,
) -> Result<i64> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    let lower = raw.to_lowercase();
    candidates
        .into_iter()
        .find(|(_, name)| name.to_lowercase() == lower)
        .map(|(id, _)| id)
        .ok_or_else(|| anyhow::anyhow!("{what} '{raw}' not found"))
}

fn account_id(raw: &str, ledger: &Ledger, user_id: i64) -> Result<i64> {
    let accounts = ledger.list_accounts(user_id)?;
    resolve_id(
        "Account",
        raw,
        accounts.iter().map(|s| (s.account.id, s.account.name.as_str())),
    )
}

fn category_id(raw: &str, ledger: &Ledger, user_id: i64) -> Result<i64> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    let categories = ledger.list_categories(user_id)?;
    Category::find_by_name(&categories, raw)
        .map(|c| c.id)
        .ok_or_else(|| anyhow::anyhow!("Category '{raw}' not found"))
}

fn tag_id(raw: &str, ledger: &Ledger, user_id: i64) -> Result<i64> {
    if let Ok(id) = raw.parse::<i64>() {
        return Ok(id);
    }
    let tags = ledger.list_tags(user_id)?;
    Tag::find_by_name(&tags, raw)
        .map(|t| t.id)
        .ok_or_else(|| anyhow::anyhow!("Tag '{raw}' not found"))
}

fn label_draft(args: &[String], usage: &str) -> Result<LabelDraft> {
    let mut draft = LabelDraft::new(first_arg(args, usage)?);
    if let Some(color) = flag(args, "--color") {
        draft.color = color.to_string();
    }
    if let Some(icon) = flag(args, "--icon") {
        draft.icon = icon.to_string();
    }
    Ok(draft)
}

fn window_from_args(args: &[String]) -> Result<DateWindow> {
    Ok(DateWindow {
        start: flag(args, "--start").map(|s| parse_day("startDate", s)).transpose()?,
        end: flag(args, "--end").map(|s| parse_day("endDate", s)).transpose()?,
    })
}

fn filter_from_args(args: &[String], ledger: &Ledger, user_id: i64) -> Result<EntryFilter> {
    let mut filter = EntryFilter::for_user(user_id);
    filter.window = window_from_args(args)?;
    if let Some(kind) = flag(args, "--kind") {
        filter.kind = Some(EntryKind::parse(kind).ok_or_else(|| anyhow::anyhow!("Unknown kind '{kind}'"))?);
    }
    if let Some(day) = flag(args, "--day") {
        filter.day = Some(parse_day("day", day)?);
    }
    if let Some(account) = flag(args, "--account") {
        filter.account_ids = vec![account_id(account, ledger, user_id)?];
    }
    if let Some(category) = flag(args, "--category") {
        filter.category_ids = vec![category_id(category, ledger, user_id)?];
    }
    if let Some(tag) = flag(args, "--tag") {
        filter.tag_ids = vec![tag_id(tag, ledger, user_id)?];
    }
    filter.description = flag(args, "--search").map(str::to_string);
    Ok(filter)
}

// ── Commands ──────────────────────────────────────────────────

fn cli_accounts(ledger: &Ledger, user_id: i64) -> Result<()> {
    let accounts = ledger.list_accounts(user_id)?;
    if accounts.is_empty() {
        println!("No accounts");
        return Ok(());
    }
    print_account_header();
    for summary in &accounts {
        print_account(summary);
    }
    println!("{}", "─".repeat(64));
    println!("Total: {:.2}", ledger.compute_user_balance(user_id)?);
    Ok(())
}

fn print_account_header() {
    println!(
        "{:<4} {:<20} {:<4} {:>14} {:>8} {:>9}",
        "ID", "Name", "Cur", "Balance", "Entries", "vs prev"
    );
    println!("{}", "─".repeat(64));
}

fn print_account(summary: &AccountSummary) {
    let account = &summary.account;
    println!(
        "{:<4} {:<20} {:<4} {:>14.2} {:>8} {:>8}%",
        account.id,
        account.name,
        account.currency,
        summary.balance,
        summary.entry_count,
        summary.rate_with_prev_month,
    );
}

fn cli_account_add(args: &[String], ledger: &mut Ledger, user_id: i64) -> Result<()> {
    let name = first_arg(args, "account-add <name> [--balance <amount>] [--currency XXX]")?;
    let mut draft = AccountDraft::new(name);
    if let Some(balance) = flag(args, "--balance") {
        draft.balance = parse_amount(balance)?;
    }
    apply_account_flags(args, &mut draft);
    let account = ledger.create_account(user_id, &draft)?;
    println!("Created account {} ({})", account.name, account.id);
    Ok(())
}

fn cli_account_edit(args: &[String], ledger: &mut Ledger, user_id: i64) -> Result<()> {
    let raw = first_arg(args, "account-edit <account> [--name N] [--balance <amount>]")?;
    let id = account_id(raw, ledger, user_id)?;
    let current = ledger.get_account(user_id, id)?.summary;

    // Unspecified fields keep their current values, including the balance.
    let mut draft = AccountDraft::new(flag(args, "--name").unwrap_or(current.account.name.as_str()));
    draft.currency = current.account.currency.clone();
    draft.color = current.account.color.clone();
    draft.icon = current.account.icon.clone();
    draft.balance = match flag(args, "--balance") {
        Some(b) => parse_amount(b)?,
        None => current.balance,
    };
    apply_account_flags(args, &mut draft);

    let account = ledger.update_account(user_id, id, &draft)?;
    let balance = ledger.account_balance(user_id, id)?;
    println!("Updated account {} ({}), balance {balance:.2}", account.name, account.id);
    Ok(())
}

fn apply_account_flags(args: &[String], draft: &mut AccountDraft) {
    if let Some(currency) = flag(args, "--currency") {
        draft.currency = currency.to_uppercase();
    }
    if let Some(color) = flag(args, "--color") {
        draft.color = color.to_string();
    }
    if let Some(icon) = flag(args, "--icon") {
        draft.icon = icon.to_string();
    }
}

fn cli_categories(ledger: &Ledger, user_id: i64) -> Result<()> {
    println!("{:<4} {:<24} Color", "ID", "Name");
    println!("{}", "─".repeat(40));
    for category in ledger.list_categories(user_id)? {
        let marker = if category.is_system() { " (reserved)" } else { "" };
        println!("{:<4} {:<24} {}{marker}", category.id, category.name, category.color);
    }
    Ok(())
}

fn cli_contacts(ledger: &Ledger, user_id: i64) -> Result<()> {
    let contacts = ledger.list_contacts(user_id)?;
    if contacts.is_empty() {
        println!("No contacts");
        return Ok(());
    }
    println!("{:<4} {:<24} {:<28} Phone", "ID", "Name", "Email");
    println!("{}", "─".repeat(70));
    for c in contacts {
        println!("{:<4} {:<24} {:<28} {}", c.id, c.name, c.email, c.phone);
    }
    Ok(())
}

fn cli_tags(ledger: &Ledger, user_id: i64) -> Result<()> {
    let tags = ledger.list_tags(user_id)?;
    if tags.is_empty() {
        println!("No tags");
        return Ok(());
    }
    println!("{:<4} {:<24} Color", "ID", "Name");
    println!("{}", "─".repeat(40));
    for tag in tags {
        println!("{:<4} {:<24} {}", tag.id, tag.name, tag.color);
    }
    Ok(())
}

fn cli_entry_add(args: &[String], ledger: &mut Ledger, user_id: i64) -> Result<()> {
    let usage = "Usage: fintrack entry-add <kind> <amount> --to <account> [--from <account>]";
    let (Some(kind), Some(amount)) = (args.first(), args.get(1)) else {
        anyhow::bail!("{usage}");
    };
    let kind = EntryKind::parse(kind).ok_or_else(|| anyhow::anyhow!("Unknown kind '{kind}'"))?;
    let amount = parse_amount(amount)?;
    let to = flag(args, "--to").ok_or_else(|| anyhow::anyhow!("{usage}"))?;

    let date = match flag(args, "--date") {
        Some(d) => parse_day("date", d)?.and_time(NaiveTime::MIN),
        None => Local::now().naive_local(),
    };
    let category = match flag(args, "--category") {
        Some(c) => category_id(c, ledger, user_id)?,
        None => SYSTEM_CATEGORY_ID,
    };

    let mut draft = EntryDraft::new(kind, account_id(to, ledger, user_id)?, amount, category, date);
    if let Some(from) = flag(args, "--from") {
        draft.from_account_id = Some(account_id(from, ledger, user_id)?);
    }
    if let Some(tags) = flag(args, "--tags") {
        draft.tag_ids = tags
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(|t| tag_id(t.trim(), ledger, user_id))
            .collect::<Result<_>>()?;
    }
    if let Some(description) = flag(args, "--description") {
        draft.description = description.to_string();
    }
    if let Some(location) = flag(args, "--location") {
        draft.location = location.to_string();
    }

    let entry = ledger.create_entry(user_id, &draft)?;
    println!("Recorded {} {:.2} (entry {})", entry.kind, entry.amount, entry.id);
    Ok(())
}

fn print_entries(entries: &[Entry]) {
    if entries.is_empty() {
        println!("No entries");
        return;
    }
    println!(
        "{:<6} {:<19} {:<9} {:>12} {:<16} Description",
        "ID", "Date", "Kind", "Amount", "Category"
    );
    println!("{}", "─".repeat(80));
    for e in entries {
        println!(
            "{:<6} {:<19} {:<9} {:>12.2} {:<16} {}",
            e.id,
            e.date.format("%Y-%m-%d %H:%M:%S"),
            e.kind,
            e.amount,
            e.category.name,
            e.description,
        );
    }
}

fn cli_balance(args: &[String], ledger: &Ledger, user_id: i64) -> Result<()> {
    let month = flag(args, "--month")
        .map(|m| parse_month("month", m))
        .transpose()
        .map_err(|v| LedgerError::Validation(vec![v]))?;

    match args.first().filter(|a| !a.starts_with("--")) {
        Some(raw) => {
            let id = account_id(raw, ledger, user_id)?;
            let all_time = ledger.account_balance(user_id, id)?;
            match month {
                Some(m) => {
                    let windowed = ledger.compute_balance(id, Some(m))?;
                    println!("{windowed:.2} in {} ({all_time:.2} overall)", m.format("%Y-%m"));
                }
                None => println!("{all_time:.2}"),
            }
        }
        None => println!("{:.2}", ledger.compute_user_balance(user_id)?),
    }
    Ok(())
}

fn cli_report(args: &[String], ledger: &Ledger, user_id: i64) -> Result<()> {
    let name = first_arg(args, "report <cash-flow|evolution|top|spending|income|counts>")?;
    let window = window_from_args(args)?;

    let json = match name {
        "cash-flow" => serde_json::to_string_pretty(&ledger.cash_flow(user_id, &window)?)?,
        "evolution" => {
            let params = EvolutionParams {
                window,
                account_id: flag(args, "--account")
                    .map(|a| account_id(a, ledger, user_id))
                    .transpose()?,
            };
            serde_json::to_string_pretty(&ledger.balance_evolution(user_id, &params)?)?
        }
        "top" => {
            let limit = flag(args, "--limit")
                .map(|l| l.parse::<u32>().with_context(|| format!("Invalid limit '{l}'")))
                .transpose()?
                .unwrap_or(10);
            let params = TopEntriesParams { window, limit };
            serde_json::to_string_pretty(&ledger.top_entries(user_id, &params)?)?
        }
        "spending" => serde_json::to_string_pretty(&ledger.categories_spending(user_id, &window)?)?,
        "income" => serde_json::to_string_pretty(&ledger.categories_income(user_id, &window)?)?,
        "counts" => {
            let year = flag(args, "--year")
                .map(|y| y.parse::<i32>().with_context(|| format!("Invalid year '{y}'")))
                .transpose()?;
            serde_json::to_string_pretty(&ledger.entries_count_by_day(user_id, year)?)?
        }
        other => anyhow::bail!("Unknown report: {other}"),
    };
    println!("{json}");
    Ok(())
}

fn cli_export(args: &[String], ledger: &Ledger, user_id: i64) -> Result<()> {
    let filter = filter_from_args(args, ledger, user_id)?;
    let output_path = args
        .first()
        .filter(|a| !a.starts_with('-'))
        .map(|a| PathBuf::from(shellexpand(a)))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            let stamp = Local::now().format("%Y-%m-%d");
            PathBuf::from(format!("{home}/fintrack-export-{stamp}.csv"))
        });

    let entries = ledger.filter_entries(&filter)?;
    let names: HashMap<i64, String> = ledger
        .list_accounts(user_id)?
        .into_iter()
        .map(|s| (s.account.id, s.account.name))
        .collect();
    let count = CsvExporter::new(names).export_to_path(&output_path, &entries)?;
    if count == 0 {
        println!("No entries matched; wrote header only to {}", output_path.display());
    } else {
        println!("Exported {count} entries to {}", output_path.display());
    }
    Ok(())
}

pub(crate) fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
        format!("{home}/{rest}")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
