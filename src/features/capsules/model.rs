//! Capsule value type and delivery rendering
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use chrono::{DateTime, Utc};

/// Display format for capsule timestamps
pub const DUE_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// A stored (recipient, payload, due time) triple awaiting delivery.
///
/// Immutable once created; the only transition is removal from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Capsule {
    /// Store-assigned identifier
    pub id: i64,

    /// Opaque chat identifier to deliver to
    pub recipient: String,

    /// Message text
    pub payload: String,

    /// Earliest moment the capsule may be delivered
    pub due_at: DateTime<Utc>,
}

impl Capsule {
    /// Whether the capsule is deliverable at `now` (inclusive boundary)
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.due_at <= now
    }

    /// Text sent to the recipient on delivery
    pub fn render(&self) -> String {
        format!(
            "📬 Your time capsule from {}:\n{}",
            format_due_at(self.due_at),
            self.payload
        )
    }
}

pub fn format_due_at(due_at: DateTime<Utc>) -> String {
    due_at.format(DUE_AT_FORMAT).to_string()
}
