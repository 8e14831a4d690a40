//! Capsule creation: validate a submission and enqueue it
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::{CapsuleError, Result};
use crate::features::capsules::CapsuleStore;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use log::info;
use std::sync::Arc;

/// Longest payload accepted, so the rendered delivery fits a single chat message
pub const MAX_PAYLOAD_CHARS: usize = 1800;

/// A validated, non-negative delivery offset in whole days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OffsetDays(u32);

impl OffsetDays {
    /// Parse user text like `"365"` into an offset
    pub fn parse(raw: &str) -> Result<Self> {
        let days: i64 = raw
            .trim()
            .parse()
            .map_err(|_| CapsuleError::validation(format!("'{}' is not a number of days", raw.trim())))?;
        Self::try_from(days)
    }

    pub fn days(self) -> u32 {
        self.0
    }
}

impl TryFrom<i64> for OffsetDays {
    type Error = CapsuleError;

    fn try_from(days: i64) -> Result<Self> {
        if days < 0 {
            return Err(CapsuleError::validation("offset must not be negative"));
        }
        u32::try_from(days)
            .map(OffsetDays)
            .map_err(|_| CapsuleError::validation("offset is too large"))
    }
}

/// The only mutation entry point for capsules
#[derive(Clone)]
pub struct CapsuleService {
    store: Arc<dyn CapsuleStore>,
}

impl CapsuleService {
    pub fn new(store: Arc<dyn CapsuleStore>) -> Self {
        Self { store }
    }

    /// Store a capsule due `offset_days` from now and return its due time
    pub async fn submit(
        &self,
        recipient: &str,
        payload: &str,
        offset_days: i64,
    ) -> Result<DateTime<Utc>> {
        self.submit_at(recipient, payload, offset_days, Utc::now())
            .await
    }

    /// Same as [`submit`](Self::submit) with an explicit creation time
    pub async fn submit_at(
        &self,
        recipient: &str,
        payload: &str,
        offset_days: i64,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let offset = OffsetDays::try_from(offset_days)?;

        let payload = payload.trim();
        if payload.is_empty() {
            return Err(CapsuleError::validation("message is empty"));
        }
        if payload.chars().count() > MAX_PAYLOAD_CHARS {
            return Err(CapsuleError::validation(format!(
                "message is longer than {MAX_PAYLOAD_CHARS} characters"
            )));
        }

        // Stored with millisecond resolution; truncate so the returned value
        // matches what a later query_due will observe.
        let due_at = now
            .trunc_subsecs(3)
            .checked_add_signed(Duration::days(i64::from(offset.days())))
            .ok_or_else(|| CapsuleError::validation("offset is too large"))?;

        let id = self.store.insert(recipient, payload, due_at).await?;

        info!(
            "Created capsule {id} for {recipient}, due in {} day(s) at {}",
            offset.days(),
            due_at
        );

        Ok(due_at)
    }
}
