//! Push-notification sink. Delivery is fire-and-forget: the ledger logs a
//! failed delivery and carries on.

use anyhow::Result;
use serde::Serialize;

pub trait Notifier {
    /// Deliver a serialized event to every channel of `user_id`.
    fn notify(&self, user_id: i64, message: &str) -> Result<()>;
}

/// Wire shape of a notification.
#[derive(Debug, Serialize)]
pub struct Event<'a, T: Serialize> {
    pub event: &'a str,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub data: &'a T,
}

/// Writes events to the log instead of a live channel. Used by the CLI,
/// which has no connected clients.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, user_id: i64, message: &str) -> Result<()> {
        tracing::debug!(user_id, %message, "notification");
        Ok(())
    }
}
