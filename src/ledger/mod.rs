//! The ledger service: every operation a caller can run against the store,
//! scoped to one acting user at a time.
//!
//! Mutations follow the same path: shape checks, then the ownership guard,
//! then the entry classifier, then the store. Compound mutations run inside one
//! store transaction so they commit or roll back as a unit.

mod accounts;
mod contacts;
mod entries;
mod guard;
mod labels;
mod reconcile;
mod reports;
mod users;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::db::Database;
use crate::error::Violation;
use crate::notify::{Event, Notifier};

pub use reconcile::{ADJUSTED_BALANCE, INITIAL_BALANCE};
pub use reports::{
    BALANCE_EVOLUTION, CASH_FLOW, CATEGORIES_INCOME, CATEGORIES_SPENDING, ENTRIES_COUNT_BY_DAY,
    TOP_ENTRIES,
};

const MIN_YEAR: i32 = 1900;
const MAX_YEARS_AHEAD: i32 = 10;

pub struct Ledger {
    db: Database,
    notifier: Option<Box<dyn Notifier>>,
}

impl Ledger {
    pub fn new(db: Database) -> Self {
        Self { db, notifier: None }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    fn notify<T: Serialize>(&self, user_id: i64, event: &str, data: &T) {
        let Some(notifier) = &self.notifier else {
            return;
        };
        let message = match serde_json::to_string(&Event {
            event,
            user_id,
            data,
        }) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(user_id, event, error = %e, "failed to serialize notification");
                return;
            }
        };
        if let Err(e) = notifier.notify(user_id, &message) {
            tracing::warn!(user_id, event, error = %e, "notification delivery failed");
        }
    }
}

/// Local wall-clock time at the stored one-second resolution.
fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// `YYYY-MM` key of the month containing `date`.
fn month_key(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// First day of the month before the one containing `date`.
fn previous_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 1 {
        (date.year() - 1, 12)
    } else {
        (date.year(), date.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// Years outside `[1900, this year + 10]` are rejected.
fn year_violation(year: i32) -> Option<Violation> {
    let max_year = today().year() + MAX_YEARS_AHEAD;
    if (MIN_YEAR..=max_year).contains(&year) {
        None
    } else {
        Some(Violation::new(
            "year",
            format!("year must be between {MIN_YEAR} and {max_year}"),
        ))
    }
}
