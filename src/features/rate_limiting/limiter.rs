//! # Feature: Submission Rate Limiting
//!
//! Caps how many capsules a single recipient may create inside a sliding
//! window. Backed by DashMap so concurrent message handlers never block each
//! other on unrelated recipients. Only stored capsules count against the
//! limit: callers check with `would_allow` and `record` after a successful
//! insert.
//!
//! - **Version**: 1.1.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Split check from record so rejected submissions are free; prune idle recipients
//! - 1.0.0: Initial per-recipient sliding window

use dashmap::DashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// Full sweep of idle recipients every this many recorded submissions
const PRUNE_EVERY: usize = 256;

pub struct SubmissionLimiter {
    requests: DashMap<String, Vec<Instant>>,
    max_requests: usize,
    time_window: Duration,
    recorded: AtomicUsize,
}

impl SubmissionLimiter {
    pub fn new(max_requests: usize, time_window: Duration) -> Self {
        SubmissionLimiter {
            requests: DashMap::new(),
            max_requests,
            time_window,
            recorded: AtomicUsize::new(0),
        }
    }

    /// Whether the recipient may submit now. Does not consume a slot.
    pub fn would_allow(&self, recipient: &str) -> bool {
        let now = Instant::now();
        let Some(mut entry) = self.requests.get_mut(recipient) else {
            return true;
        };

        entry.retain(|&time| now.duration_since(time) < self.time_window);
        let allowed = entry.len() < self.max_requests;
        let idle = entry.is_empty();
        drop(entry);

        if idle {
            self.requests.remove_if(recipient, |_, times| times.is_empty());
        }

        allowed
    }

    /// Count a stored submission against the recipient's window
    pub fn record(&self, recipient: &str) {
        self.requests
            .entry(recipient.to_string())
            .or_default()
            .push(Instant::now());

        if self.recorded.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }
    }

    /// Drop expired timestamps and forget recipients with none left
    pub fn prune(&self) {
        let now = Instant::now();
        self.requests.retain(|_, times| {
            times.retain(|&time| now.duration_since(time) < self.time_window);
            !times.is_empty()
        });
    }

    /// Number of recipients currently tracked
    pub fn tracked(&self) -> usize {
        self.requests.len()
    }

    /// How long until the recipient may submit again, if currently throttled
    pub fn retry_after(&self, recipient: &str) -> Option<Duration> {
        let entry = self.requests.get(recipient)?;
        if entry.len() < self.max_requests {
            return None;
        }

        let oldest = entry.first()?;
        let wait = self.time_window.saturating_sub(oldest.elapsed());
        (wait > Duration::ZERO).then_some(wait)
    }
}
