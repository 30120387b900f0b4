use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::{today, year_violation, Ledger};
use crate::balance::signed_amount;
use crate::db::analytics::{self, DayLine};
use crate::db::entries;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{
    CashFlowRow, DateValue, DateWindow, DayCount, Entry, EntryKind, EvolutionParams, LabelValue,
    Report, TopEntriesParams,
};

pub const CASH_FLOW: &str = "Cash flow";
pub const BALANCE_EVOLUTION: &str = "Balance evolution";
pub const TOP_ENTRIES: &str = "Top entries";
pub const CATEGORIES_SPENDING: &str = "Categories spending";
pub const CATEGORIES_INCOME: &str = "Categories income";
pub const ENTRIES_COUNT_BY_DAY: &str = "Entries count by day";

// ── Folds ─────────────────────────────────────────────────────

/// Income, expense and their difference per day. `lines` must be in date
/// order; a day with only transfers yields a zero row.
pub(super) fn cash_flow_rows(lines: &[DayLine]) -> Vec<CashFlowRow> {
    let mut rows: Vec<CashFlowRow> = Vec::new();
    for line in lines {
        if rows.last().map(|r| r.date) != Some(line.day) {
            rows.push(CashFlowRow {
                date: line.day,
                income: Decimal::ZERO,
                expense: Decimal::ZERO,
                cash_flow: Decimal::ZERO,
            });
        }
        let Some(row) = rows.last_mut() else {
            continue;
        };
        match line.kind {
            EntryKind::Income => row.income += line.amount,
            EntryKind::Expense => row.expense += line.amount,
            EntryKind::Transfer => {}
        }
        row.cash_flow += signed_amount(line.kind, line.amount);
    }
    rows
}

/// Running total of the per-day signed amounts. `lines` must be in date order.
pub(super) fn running_balance(lines: &[DayLine]) -> Vec<DateValue> {
    let mut rows: Vec<DateValue> = Vec::new();
    let mut total = Decimal::ZERO;
    for line in lines {
        total += signed_amount(line.kind, line.amount);
        match rows.last_mut() {
            Some(row) if row.date == line.day => row.value = total,
            _ => rows.push(DateValue {
                date: line.day,
                value: total,
            }),
        }
    }
    rows
}

pub(super) fn category_totals(lines: Vec<(String, Decimal)>) -> Vec<LabelValue> {
    let mut totals: BTreeMap<String, Decimal> = BTreeMap::new();
    for (label, amount) in lines {
        *totals.entry(label).or_default() += amount;
    }
    totals
        .into_iter()
        .map(|(label, value)| LabelValue { label, value })
        .collect()
}

fn check_window(window: &DateWindow) -> LedgerResult<()> {
    let violations = window.validate();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(LedgerError::Validation(violations))
    }
}

impl Ledger {
    pub fn cash_flow(&self, user_id: i64, window: &DateWindow) -> LedgerResult<Report<CashFlowRow>> {
        check_window(window)?;
        let lines = analytics::day_lines(self.db.conn(), user_id, window, None)?;
        Ok(Report::new(CASH_FLOW, cash_flow_rows(&lines)))
    }

    /// Cumulative balance per day. With an account, only entries whose `to`
    /// side is that account count, so its outgoing transfers are not
    /// subtracted.
    pub fn balance_evolution(
        &self,
        user_id: i64,
        params: &EvolutionParams,
    ) -> LedgerResult<Report<DateValue>> {
        check_window(&params.window)?;
        let lines = analytics::day_lines(self.db.conn(), user_id, &params.window, params.account_id)?;
        Ok(Report::new(BALANCE_EVOLUTION, running_balance(&lines)))
    }

    pub fn top_entries(
        &self,
        user_id: i64,
        params: &TopEntriesParams,
    ) -> LedgerResult<Report<Entry>> {
        check_window(&params.window)?;
        if params.limit == 0 {
            return Err(LedgerError::invalid("limit", "limit must be greater than 0"));
        }
        let top = entries::top(self.db.conn(), user_id, &params.window, params.limit)?;
        Ok(Report::new(TOP_ENTRIES, top))
    }

    pub fn categories_spending(
        &self,
        user_id: i64,
        window: &DateWindow,
    ) -> LedgerResult<Report<LabelValue>> {
        self.category_report(user_id, EntryKind::Expense, window, CATEGORIES_SPENDING)
    }

    pub fn categories_income(
        &self,
        user_id: i64,
        window: &DateWindow,
    ) -> LedgerResult<Report<LabelValue>> {
        self.category_report(user_id, EntryKind::Income, window, CATEGORIES_INCOME)
    }

    fn category_report(
        &self,
        user_id: i64,
        kind: EntryKind,
        window: &DateWindow,
        title: &'static str,
    ) -> LedgerResult<Report<LabelValue>> {
        check_window(window)?;
        let lines = analytics::category_lines(self.db.conn(), user_id, kind, window)?;
        Ok(Report::new(title, category_totals(lines)))
    }

    /// Entry counts for every day of `year` (default: this year) that has at
    /// least one entry.
    pub fn entries_count_by_day(
        &self,
        user_id: i64,
        year: Option<i32>,
    ) -> LedgerResult<Report<DayCount>> {
        let year = year.unwrap_or_else(|| today().year());
        if let Some(violation) = year_violation(year) {
            return Err(LedgerError::Validation(vec![violation]));
        }
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Err(LedgerError::invalid("year", format!("{year} is not a valid year")));
        };
        let counts = analytics::counts_by_day(self.db.conn(), user_id, start, end)?;
        Ok(Report::new(ENTRIES_COUNT_BY_DAY, counts))
    }
}
