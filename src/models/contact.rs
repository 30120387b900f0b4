use serde::Serialize;

use crate::error::Violation;

/// Someone the user pays or gets paid by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contact {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct ContactDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: String::new(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        if !(2..=256).contains(&self.name.trim().chars().count()) {
            violations.push(Violation::new(
                "name",
                "name must be between 2 and 256 characters",
            ));
        }
        if !(3..=256).contains(&self.email.trim().chars().count()) {
            violations.push(Violation::new(
                "email",
                "email must be between 3 and 256 characters",
            ));
        }
        if self.phone.trim().chars().count() > 16 {
            violations.push(Violation::new("phone", "phone must be at most 16 characters"));
        }
        violations
    }
}
