//! Storage contract for pending capsules
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::Result;
use crate::features::capsules::Capsule;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable persistence of pending capsules.
///
/// Each call is atomic with respect to the others. There is no cross-call
/// transaction: deletes are keyed by id, so an insert that lands between a
/// `query_due` and its deletes cannot be removed by mistake.
#[async_trait]
pub trait CapsuleStore: Send + Sync {
    /// Persist a new capsule and return its assigned id
    async fn insert(&self, recipient: &str, payload: &str, due_at: DateTime<Utc>) -> Result<i64>;

    /// Snapshot of every capsule with `due_at <= now`, in no particular order
    async fn query_due(&self, now: DateTime<Utc>) -> Result<Vec<Capsule>>;

    /// Remove a capsule. Deleting an unknown id is not an error.
    async fn delete(&self, id: i64) -> Result<()>;
}
