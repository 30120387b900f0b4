use chrono::NaiveDate;
use rust_decimal::Decimal;
use rusqlite::Connection;

use super::reconcile::{reconcile, record_opening_balance};
use super::{entries::load, guard, month_key, now, previous_month, today, year_violation, Ledger};
use crate::balance::{month_over_month_rate, non_transfer_component, transfer_component};
use crate::db::{accounts, entries};
use crate::error::{LedgerError, LedgerResult, Violation};
use crate::models::{Account, AccountDetails, AccountDraft, AccountSummary, Entry};

/// Balance of one account from its live entries, optionally windowed to a
/// `YYYY-MM` month.
pub(super) fn derived_balance(
    conn: &Connection,
    account_id: i64,
    month_key: Option<&str>,
) -> LedgerResult<Decimal> {
    let plain = entries::non_transfer_lines(conn, account_id, month_key)?;
    let transfers = entries::transfer_lines(conn, account_id, month_key)?;
    Ok(non_transfer_component(account_id, &plain) + transfer_component(account_id, &transfers))
}

fn ensure_owned(conn: &Connection, user_id: i64, account_id: i64) -> LedgerResult<Account> {
    match accounts::get(conn, account_id)? {
        Some(account) if account.user_id == user_id => Ok(account),
        _ => Err(LedgerError::not_owned("account", account_id, user_id)),
    }
}

fn check_draft(
    conn: &Connection,
    user_id: i64,
    draft: &AccountDraft,
    exclude_id: Option<i64>,
) -> LedgerResult<()> {
    let mut violations = draft.validate();
    if violations.is_empty() && accounts::name_taken(conn, user_id, &draft.name, exclude_id)? {
        violations.push(Violation::new(
            "name",
            format!("an account named '{}' already exists", draft.name.trim()),
        ));
    }
    if violations.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::Validation(violations))
    }
}

fn summarize(conn: &Connection, account: Account) -> LedgerResult<AccountSummary> {
    let balance = derived_balance(conn, account.id, None)?;
    let entry_count = accounts::entry_count(conn, account.id)?;
    let today = today();
    let this_month = derived_balance(conn, account.id, Some(&month_key(today)))?;
    let last_month = derived_balance(conn, account.id, Some(&month_key(previous_month(today))))?;
    Ok(AccountSummary {
        account,
        balance,
        entry_count,
        rate_with_prev_month: month_over_month_rate(this_month, last_month),
    })
}

impl Ledger {
    /// Create the account and, for a nonzero stated balance, its
    /// "Initial balance" entry in the same transaction.
    pub fn create_account(&mut self, user_id: i64, draft: &AccountDraft) -> LedgerResult<Account> {
        check_draft(self.db.conn(), user_id, draft, None)?;

        let tx = self.db.transaction()?;
        let id = accounts::insert(&tx, user_id, draft)?;
        record_opening_balance(&tx, user_id, id, draft.balance, now())?;
        tx.commit()?;

        tracing::info!(user_id, account_id = id, name = %draft.name.trim(), "account created");
        ensure_owned(self.db.conn(), user_id, id)
    }

    /// Reconcile the stated balance, then update the display fields. Both
    /// commit together or not at all.
    pub fn update_account(
        &mut self,
        user_id: i64,
        account_id: i64,
        draft: &AccountDraft,
    ) -> LedgerResult<Account> {
        let tx = self.db.transaction()?;
        ensure_owned(&tx, user_id, account_id)?;
        check_draft(&tx, user_id, draft, Some(account_id))?;
        reconcile(&tx, user_id, account_id, draft.balance, now())?;
        accounts::update(&tx, account_id, draft)?;
        tx.commit()?;

        tracing::info!(user_id, account_id, "account updated");
        ensure_owned(self.db.conn(), user_id, account_id)
    }

    /// Append the entry that brings the derived balance to `new_balance`.
    /// Returns `None` when the balance already matches.
    pub fn reconcile_account_edit(
        &mut self,
        user_id: i64,
        account_id: i64,
        new_balance: Decimal,
    ) -> LedgerResult<Option<Entry>> {
        if new_balance < Decimal::ZERO {
            return Err(LedgerError::invalid("balance", "balance must not be negative"));
        }

        let tx = self.db.transaction()?;
        ensure_owned(&tx, user_id, account_id)?;
        let synthesized = reconcile(&tx, user_id, account_id, new_balance, now())?;
        tx.commit()?;

        match synthesized {
            Some(id) => {
                let entry = load(self.db.conn(), id)?;
                self.notify(user_id, "entry.created", &entry);
                Ok(Some(entry))
            }
            None => Ok(None),
        }
    }

    pub fn delete_account(&mut self, user_id: i64, account_id: i64) -> LedgerResult<()> {
        let tx = self.db.transaction()?;
        ensure_owned(&tx, user_id, account_id)?;
        guard::ensure_unreferenced("account", account_id, accounts::entry_count(&tx, account_id)?)?;
        accounts::soft_delete(&tx, account_id)?;
        tx.commit()?;

        tracing::info!(user_id, account_id, "account deleted");
        Ok(())
    }

    pub fn list_accounts(&self, user_id: i64) -> LedgerResult<Vec<AccountSummary>> {
        let conn = self.db.conn();
        accounts::list_for_user(conn, user_id)?
            .into_iter()
            .map(|account| summarize(conn, account))
            .collect()
    }

    /// The account summary plus the entries it took part in this month.
    pub fn get_account(&self, user_id: i64, account_id: i64) -> LedgerResult<AccountDetails> {
        let conn = self.db.conn();
        let account = ensure_owned(conn, user_id, account_id)?;
        let entries = entries::for_account_month(conn, account_id, &month_key(today()))?;
        Ok(AccountDetails {
            summary: summarize(conn, account)?,
            entries,
        })
    }

    pub fn account_entries_by_month(
        &self,
        user_id: i64,
        account_id: i64,
        year: i32,
        month: u32,
    ) -> LedgerResult<Vec<Entry>> {
        let mut violations: Vec<Violation> = year_violation(year).into_iter().collect();
        if !(1..=12).contains(&month) {
            violations.push(Violation::new("month", "month must be between 1 and 12"));
        }
        if !violations.is_empty() {
            return Err(LedgerError::Validation(violations));
        }

        let conn = self.db.conn();
        ensure_owned(conn, user_id, account_id)?;
        Ok(entries::for_account_month(
            conn,
            account_id,
            &format!("{year:04}-{month:02}"),
        )?)
    }

    /// Ownership-checked [`Ledger::compute_balance`] over all time.
    pub fn account_balance(&self, user_id: i64, account_id: i64) -> LedgerResult<Decimal> {
        ensure_owned(self.db.conn(), user_id, account_id)?;
        self.compute_balance(account_id, None)
    }

    /// Derived balance of the account. With `month`, only entries dated in
    /// the calendar month containing it count.
    pub fn compute_balance(&self, account_id: i64, month: Option<NaiveDate>) -> LedgerResult<Decimal> {
        let key = month.map(month_key);
        let balance = derived_balance(self.db.conn(), account_id, key.as_deref())?;
        tracing::debug!(account_id, month = key.as_deref(), %balance, "balance derived");
        Ok(balance)
    }

    /// Sum of the all-time balances of every live account the user owns.
    pub fn compute_user_balance(&self, user_id: i64) -> LedgerResult<Decimal> {
        let conn = self.db.conn();
        let mut total = Decimal::ZERO;
        for account in accounts::list_for_user(conn, user_id)? {
            total += derived_balance(conn, account.id, None)?;
        }
        Ok(total)
    }
}
