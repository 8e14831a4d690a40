//! Error taxonomy for the capsule engine.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use thiserror::Error;

/// Result type alias using CapsuleError.
pub type Result<T> = std::result::Result<T, CapsuleError>;

#[derive(Error, Debug)]
pub enum CapsuleError {
    /// Bad offset or malformed submission. Never persisted, never retried.
    #[error("Invalid submission: {0}")]
    Validation(String),

    /// Storage-layer failure on insert, query or delete.
    #[error("Storage error: {0}")]
    Storage(#[from] sqlite::Error),

    /// A stored row could not be decoded into a capsule.
    #[error("Corrupt capsule row: {0}")]
    CorruptRow(String),

    /// Transport failed to deliver a single capsule.
    #[error("Notification failed: {0}")]
    Notification(String),
}

impl CapsuleError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CapsuleError::Validation(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        CapsuleError::Notification(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, CapsuleError::Validation(_))
    }
}
