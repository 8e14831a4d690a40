//! # Rate Limiting Feature
//!
//! Throttles capsule submissions per recipient.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod limiter;

pub use limiter::SubmissionLimiter;
