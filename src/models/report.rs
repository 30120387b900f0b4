use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use super::filter::DateWindow;

/// Labeled report payload: `{ "title": ..., "data": [...] }`.
#[derive(Debug, Clone, Serialize)]
pub struct Report<T> {
    pub title: &'static str,
    pub data: Vec<T>,
}

impl<T> Report<T> {
    pub fn new(title: &'static str, data: Vec<T>) -> Self {
        Self { title, data }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRow {
    pub date: NaiveDate,
    pub income: Decimal,
    pub expense: Decimal,
    pub cash_flow: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateValue {
    pub date: NaiveDate,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayCount {
    pub date: NaiveDate,
    pub value: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelValue {
    pub label: String,
    pub value: Decimal,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EvolutionParams {
    pub window: DateWindow,
    /// Restricts rows to entries whose `to` side is this account.
    pub account_id: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub struct TopEntriesParams {
    pub window: DateWindow,
    pub limit: u32,
}
