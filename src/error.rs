use serde::Serialize;
use thiserror::Error;

/// A single structural problem with a draft, reported against the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Violation {
    pub field: &'static str,
    pub message: String,
}

impl Violation {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;

/// Failures surfaced by the ledger core. Nothing here is retried internally.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("validation failed: {}", join_violations(.0))]
    Validation(Vec<Violation>),
    #[error("{0}")]
    Ownership(String),
    #[error("cannot delete {entity} {id}: used by {count} entries")]
    ReferentialConflict {
        entity: &'static str,
        id: i64,
        count: i64,
    },
    #[error("failed to reconcile balance of account {account_id}: {source}")]
    Reconciliation {
        account_id: i64,
        #[source]
        source: Box<LedgerError>,
    },
    #[error("store error: {0}")]
    Store(rusqlite::Error),
}

impl LedgerError {
    /// Short machine-checkable category.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Ownership(_) => "ownership",
            Self::ReferentialConflict { .. } => "referential_conflict",
            Self::Reconciliation { .. } => "reconciliation",
            Self::Store(_) => "store",
        }
    }

    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![Violation::new(field, message)])
    }

    pub(crate) fn not_owned(what: &str, id: i64, user_id: i64) -> Self {
        Self::Ownership(format!(
            "{what} with id {id} does not exist or does not belong to user {user_id}"
        ))
    }

    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Validation(v) => v,
            _ => &[],
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        tracing::error!(error = %err, "store failure");
        Self::Store(err)
    }
}

fn join_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_are_stable() {
        assert_eq!(LedgerError::invalid("amount", "bad").kind(), "validation");
        assert_eq!(LedgerError::not_owned("account", 1, 2).kind(), "ownership");
        let conflict = LedgerError::ReferentialConflict {
            entity: "category",
            id: 4,
            count: 1,
        };
        assert_eq!(conflict.kind(), "referential_conflict");
        assert_eq!(conflict.to_string(), "cannot delete category 4: used by 1 entries");
        let store = LedgerError::from(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(store.kind(), "store");
    }

    #[test]
    fn test_validation_message_joins_fields() {
        let err = LedgerError::Validation(vec![
            Violation::new("fromAccount", "from account required for transfer"),
            Violation::new("amount", "amount must not be negative"),
        ]);
        assert_eq!(
            err.to_string(),
            "validation failed: fromAccount: from account required for transfer; amount: amount must not be negative"
        );
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_not_owned_message() {
        let err = LedgerError::not_owned("account", 7, 3);
        assert_eq!(
            err.to_string(),
            "account with id 7 does not exist or does not belong to user 3"
        );
    }

    #[test]
    fn test_reconciliation_wraps_cause() {
        let err = LedgerError::Reconciliation {
            account_id: 9,
            source: Box::new(LedgerError::not_owned("category", 1, 2)),
        };
        assert_eq!(err.kind(), "reconciliation");
        assert!(err.to_string().starts_with("failed to reconcile balance of account 9"));
    }
}
