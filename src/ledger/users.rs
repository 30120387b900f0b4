use super::Ledger;
use crate::db::users;
use crate::error::{LedgerError, LedgerResult, Violation};
use crate::models::User;

impl Ledger {
    pub fn create_user(&mut self, name: &str, username: &str) -> LedgerResult<User> {
        let conn = self.db.conn();
        let username = username.trim();
        let mut violations = Vec::new();
        if name.trim().is_empty() {
            violations.push(Violation::new("name", "name must not be empty"));
        }
        if username.is_empty() {
            violations.push(Violation::new("username", "username must not be empty"));
        } else if users::username_taken(conn, username)? {
            violations.push(Violation::new(
                "username",
                format!("username '{username}' is already taken"),
            ));
        }
        if !violations.is_empty() {
            return Err(LedgerError::Validation(violations));
        }

        let id = users::insert(conn, name.trim(), username)?;
        tracing::info!(user_id = id, username, "user created");
        users::get(conn, id)?.ok_or_else(|| LedgerError::Store(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn find_user(&self, username: &str) -> LedgerResult<Option<User>> {
        Ok(users::find_by_username(self.db.conn(), username.trim())?)
    }
}
