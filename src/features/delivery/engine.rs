//! Sweep: query due capsules, notify each recipient, delete on success
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::core::Result;
use crate::features::capsules::CapsuleStore;
use crate::features::delivery::Notifier;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Outcome counts for a single sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Capsules returned by `query_due`
    pub due: usize,
    /// Notified and deleted
    pub delivered: usize,
    /// Notification failed; left in the store for the next sweep
    pub failed: usize,
    /// Notified, but the delete failed; will be delivered again
    pub delete_failed: usize,
    /// Not attempted because shutdown was requested mid-sweep
    pub skipped: usize,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.due == 0
    }
}

impl std::fmt::Display for SweepReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} due, {} delivered, {} failed, {} delete failed, {} skipped",
            self.due, self.delivered, self.failed, self.delete_failed, self.skipped
        )
    }
}

/// Delivers due capsules with at-least-once semantics.
///
/// A capsule is deleted only after its notification succeeded, so a crash
/// between the two causes a repeat delivery rather than a lost one.
pub struct DeliveryEngine {
    store: Arc<dyn CapsuleStore>,
    notifier: Arc<dyn Notifier>,
    shutdown: CancellationToken,
}

impl DeliveryEngine {
    pub fn new(store: Arc<dyn CapsuleStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            shutdown: CancellationToken::new(),
        }
    }

    /// Stop between candidates once `shutdown` is cancelled
    pub fn with_shutdown(mut self, shutdown: CancellationToken) -> Self {
        self.shutdown = shutdown;
        self
    }

    /// Run one sweep against the current wall clock
    pub async fn sweep(&self) -> Result<SweepReport> {
        self.sweep_at(Utc::now()).await
    }

    /// Run one sweep treating `now` as the current time.
    ///
    /// Only a failed `query_due` is returned as an error; per-capsule
    /// failures are logged and counted in the report.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport> {
        let candidates = self.store.query_due(now).await?;

        let mut report = SweepReport {
            due: candidates.len(),
            ..SweepReport::default()
        };

        if candidates.is_empty() {
            debug!("Sweep at {now}: nothing due");
            return Ok(report);
        }

        for (index, capsule) in candidates.iter().enumerate() {
            if self.shutdown.is_cancelled() {
                report.skipped = candidates.len() - index;
                info!(
                    "Shutdown requested, leaving {} capsule(s) for the next run",
                    report.skipped
                );
                break;
            }
            debug_assert!(
                capsule.is_due(now),
                "query_due returned capsule {} due at {}",
                capsule.id,
                capsule.due_at
            );

            if let Err(e) = self
                .notifier
                .notify(&capsule.recipient, &capsule.render())
                .await
            {
                warn!(
                    "Failed to deliver capsule {} to {}: {e}",
                    capsule.id, capsule.recipient
                );
                report.failed += 1;
                continue;
            }

            match self.store.delete(capsule.id).await {
                Ok(()) => {
                    info!(
                        "Delivered capsule {} to {}",
                        capsule.id, capsule.recipient
                    );
                    report.delivered += 1;
                }
                Err(e) => {
                    warn!(
                        "Delivered capsule {} but failed to delete it, it will be sent again: {e}",
                        capsule.id
                    );
                    report.delete_failed += 1;
                }
            }
        }

        Ok(report)
    }
}
