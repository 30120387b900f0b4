use serde::Serialize;

use super::is_hex_color;
use crate::error::Violation;

/// Reserved category for synthesized entries (opening balances, adjustments).
pub const SYSTEM_CATEGORY_ID: i64 = 1;
pub const SYSTEM_CATEGORY_NAME: &str = "System";

/// Names users may not give their own categories.
pub const CATEGORY_BLACKLIST: &[&str] = &[SYSTEM_CATEGORY_NAME];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: i64,
    /// `None` only for the system category.
    pub user_id: Option<i64>,
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl Category {
    pub fn is_system(&self) -> bool {
        self.id == SYSTEM_CATEGORY_ID
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub fn find_by_name<'a>(categories: &'a [Category], name: &str) -> Option<&'a Category> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl Tag {
    pub fn find_by_name<'a>(tags: &'a [Tag], name: &str) -> Option<&'a Tag> {
        let lower = name.to_lowercase();
        tags.iter().find(|t| t.name.to_lowercase() == lower)
    }
}

/// Create/update payload shared by categories and tags.
#[derive(Debug, Clone)]
pub struct LabelDraft {
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl LabelDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: "#808080".to_string(),
            icon: "label".to_string(),
        }
    }

    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        let len = self.name.trim().chars().count();
        if !(2..=64).contains(&len) {
            violations.push(Violation::new(
                "name",
                "name must be between 2 and 64 characters",
            ));
        }
        if !is_hex_color(&self.color) {
            violations.push(Violation::new("color", "color must look like #RRGGBB"));
        }
        if self.icon.chars().count() > 128 {
            violations.push(Violation::new("icon", "icon must be at most 128 characters"));
        }
        violations
    }

    /// Category names additionally may not shadow reserved names.
    pub fn validate_category(&self) -> Vec<Violation> {
        let mut violations = self.validate();
        if CATEGORY_BLACKLIST
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(self.name.trim()))
        {
            violations.push(Violation::new(
                "name",
                format!("category name {} is not allowed", self.name),
            ));
        }
        violations
    }
}
