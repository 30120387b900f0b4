use rust_decimal::Decimal;
use serde::Serialize;

use super::entry::Entry;
use super::{is_hex_color, is_currency_code};
use crate::error::Violation;

/// A money container owned by one user. It never stores a balance; see
/// [`crate::balance`] for how the balance is derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Account {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub currency: String,
    pub color: String,
    pub icon: String,
    pub created_at: String,
    pub updated_at: String,
}

/// What a user submits when creating or editing an account. `balance` is the
/// stated balance; it is reconciled into ledger entries, not persisted.
#[derive(Debug, Clone)]
pub struct AccountDraft {
    pub name: String,
    pub currency: String,
    pub color: String,
    pub icon: String,
    pub balance: Decimal,
}

impl AccountDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            currency: "USD".to_string(),
            color: "#000000".to_string(),
            icon: "wallet".to_string(),
            balance: Decimal::ZERO,
        }
    }

    pub fn with_balance(mut self, balance: Decimal) -> Self {
        self.balance = balance;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        let name_len = self.name.trim().chars().count();
        if !(2..=256).contains(&name_len) {
            violations.push(Violation::new(
                "name",
                "name must be between 2 and 256 characters",
            ));
        }
        if !is_currency_code(&self.currency) {
            violations.push(Violation::new(
                "currency",
                format!("'{}' is not a currency code", self.currency),
            ));
        }
        if !is_hex_color(&self.color) {
            violations.push(Violation::new("color", "color must look like #RRGGBB"));
        }
        if self.icon.chars().count() > 128 {
            violations.push(Violation::new("icon", "icon must be at most 128 characters"));
        }
        if self.balance < Decimal::ZERO {
            violations.push(Violation::new("balance", "balance must not be negative"));
        }
        violations
    }
}

/// An account together with the values derived from its entries.
#[derive(Debug, Clone, Serialize)]
pub struct AccountSummary {
    #[serde(flatten)]
    pub account: Account,
    pub balance: Decimal,
    pub entry_count: i64,
    pub rate_with_prev_month: Decimal,
}

/// An account summary plus the entries it took part in this month.
#[derive(Debug, Clone, Serialize)]
pub struct AccountDetails {
    #[serde(flatten)]
    pub summary: AccountSummary,
    pub entries: Vec<Entry>,
}
