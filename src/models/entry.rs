use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Violation;

pub const MAX_DESCRIPTION_LEN: usize = 256;
pub const MAX_LOCATION_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryKind {
    Income,
    Expense,
    Transfer,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "INCOME",
            Self::Expense => "EXPENSE",
            Self::Transfer => "TRANSFER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" => Some(Self::Expense),
            "transfer" => Some(Self::Transfer),
            _ => None,
        }
    }

    pub fn all() -> &'static [EntryKind] {
        &[Self::Income, Self::Expense, Self::Transfer]
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category or tag as resolved inline on an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LabelRef {
    pub id: i64,
    pub name: String,
    pub color: String,
    pub icon: String,
}

/// A ledger line item. User-submitted and system-synthesized entries share this
/// representation; the latter are only recognizable by category and description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    pub id: i64,
    pub from_account_id: Option<i64>,
    pub to_account_id: i64,
    pub date: NaiveDateTime,
    pub amount: Decimal,
    pub kind: EntryKind,
    pub description: String,
    pub location: String,
    pub category: LabelRef,
    pub tags: Vec<LabelRef>,
    pub created_at: String,
    pub updated_at: String,
}

/// A full replacement of an entry's user-editable fields.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub date: NaiveDateTime,
    pub amount: Decimal,
    pub description: String,
    pub location: String,
    pub category_id: i64,
    pub tag_ids: Vec<i64>,
    pub from_account_id: Option<i64>,
    pub to_account_id: i64,
    pub kind: EntryKind,
}

impl EntryDraft {
    pub fn new(
        kind: EntryKind,
        to_account_id: i64,
        amount: Decimal,
        category_id: i64,
        date: NaiveDateTime,
    ) -> Self {
        Self {
            date,
            amount,
            description: String::new(),
            location: String::new(),
            category_id,
            tag_ids: Vec::new(),
            from_account_id: None,
            to_account_id,
            kind,
        }
    }

    pub fn transfer(
        from_account_id: i64,
        to_account_id: i64,
        amount: Decimal,
        category_id: i64,
        date: NaiveDateTime,
    ) -> Self {
        let mut draft = Self::new(EntryKind::Transfer, to_account_id, amount, category_id, date);
        draft.from_account_id = Some(from_account_id);
        draft
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_tags(mut self, tag_ids: Vec<i64>) -> Self {
        self.tag_ids = tag_ids;
        self
    }

    /// Field-level checks that do not depend on the entry kind.
    pub fn validate_shape(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if self.amount < Decimal::ZERO {
            violations.push(Violation::new("amount", "amount must not be negative"));
        }
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            violations.push(Violation::new(
                "description",
                format!("description must be at most {MAX_DESCRIPTION_LEN} characters"),
            ));
        }
        if self.location.chars().count() > MAX_LOCATION_LEN {
            violations.push(Violation::new(
                "location",
                format!("location must be at most {MAX_LOCATION_LEN} characters"),
            ));
        }
        let mut seen = std::collections::HashSet::new();
        if !self.tag_ids.iter().all(|id| seen.insert(*id)) {
            violations.push(Violation::new("tagIds", "tag ids must be unique"));
        }
        violations
    }
}
