// Core layer - configuration and error types
pub mod core;

// Features layer - capsules, delivery, rate limiting
pub mod features;

// Infrastructure
pub mod database;

// Application layer
pub mod commands;

pub use core::{CapsuleError, Config};
pub use database::Database;

pub use features::{
    // Capsules
    Capsule, CapsuleService, CapsuleStore, OffsetDays,
    // Delivery
    CapsuleScheduler, DeliveryEngine, DiscordNotifier, Notifier, SchedulerHandle, SweepReport,
    // Rate limiting
    SubmissionLimiter,
};
