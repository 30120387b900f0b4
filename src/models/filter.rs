use chrono::NaiveDate;

use super::entry::EntryKind;
use crate::error::Violation;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar-day window. Both ends present, or neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn is_bounded(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    pub fn validate(&self) -> Vec<Violation> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end < start => vec![Violation::new(
                "endDate",
                "end date must not be before start date",
            )],
            (Some(_), None) | (None, Some(_)) => vec![Violation::new(
                "endDate",
                "start date and end date must be given together",
            )],
            _ => Vec::new(),
        }
    }

    /// Lower and upper timestamp bounds in stored form, both inclusive.
    pub(crate) fn timestamp_bounds(&self) -> Option<(String, String)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some(day_bounds(start, end)),
            _ => None,
        }
    }
}

pub(crate) fn day_bounds(start: NaiveDate, end: NaiveDate) -> (String, String) {
    (
        format!("{} 00:00:00", start.format(DATE_FORMAT)),
        format!("{} 23:59:59", end.format(DATE_FORMAT)),
    )
}

/// Criteria for [`crate::Ledger::filter_entries`]. Every list field is an
/// any-of match; the fields themselves combine with AND.
#[derive(Debug, Clone, Default)]
pub struct EntryFilter {
    pub user_id: i64,
    pub kind: Option<EntryKind>,
    pub window: DateWindow,
    /// A single calendar day; cannot be combined with `window`.
    pub day: Option<NaiveDate>,
    pub account_ids: Vec<i64>,
    pub category_ids: Vec<i64>,
    pub tag_ids: Vec<i64>,
    /// Case-insensitive substring of the description.
    pub description: Option<String>,
}

impl EntryFilter {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = self.window.validate();
        if self.day.is_some() && (self.window.start.is_some() || self.window.end.is_some()) {
            violations.push(Violation::new(
                "day",
                "day cannot be combined with a date range",
            ));
        }
        violations
    }
}

/// Parse a `YYYY-MM-DD` filter parameter.
pub fn parse_date(field: &'static str, s: &str) -> Result<NaiveDate, Violation> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| Violation::new(field, format!("'{s}' is not a valid date (YYYY-MM-DD)")))
}

/// Parse a `YYYY-MM` parameter into the first day of that month.
pub fn parse_month(field: &'static str, s: &str) -> Result<NaiveDate, Violation> {
    NaiveDate::parse_from_str(&format!("{}-01", s.trim()), DATE_FORMAT)
        .map_err(|_| Violation::new(field, format!("'{s}' is not a valid month (YYYY-MM)")))
}
