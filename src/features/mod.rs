//! # Features
//!
//! - **capsules**: capsule model, storage contract, submission API
//! - **delivery**: sweep engine, notifier seam, periodic scheduler
//! - **rate_limiting**: per-recipient submission throttle

pub mod capsules;
pub mod delivery;
pub mod rate_limiting;

pub use capsules::{Capsule, CapsuleService, CapsuleStore, OffsetDays};
pub use delivery::{
    CapsuleScheduler, DeliveryEngine, DiscordNotifier, Notifier, SchedulerHandle, SweepReport,
};
pub use rate_limiting::SubmissionLimiter;
