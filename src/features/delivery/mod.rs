//! # Delivery Feature
//!
//! Periodic sweep that hands due capsules to the chat transport and removes
//! them once delivered.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod engine;
pub mod notifier;
pub mod scheduler;

pub use engine::{DeliveryEngine, SweepReport};
pub use notifier::{DiscordNotifier, Notifier};
pub use scheduler::{CapsuleScheduler, SchedulerHandle};
