//! # Capsules Feature
//!
//! Capsule model, storage contract and the submission API.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod lifecycle;
pub mod model;
pub mod store;

pub use lifecycle::{CapsuleService, OffsetDays, MAX_PAYLOAD_CHARS};
pub use model::{format_due_at, Capsule};
pub use store::CapsuleStore;
