//! # Capsule Scheduler
//!
//! Fixed-interval background task that runs one delivery sweep per tick.
//! Sweeps run inline in the task, so two sweeps can never overlap; a sweep
//! that outlasts the interval delays the next tick instead of stacking it.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use crate::features::delivery::DeliveryEngine;
use log::{debug, error, info};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub struct CapsuleScheduler {
    engine: DeliveryEngine,
    interval: Duration,
}

/// Handle to a running scheduler. Dropping it does not stop the task.
pub struct SchedulerHandle {
    shutdown: CancellationToken,
    task: JoinHandle<()>,
}

impl CapsuleScheduler {
    pub fn new(engine: DeliveryEngine, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Spawn the sweep loop onto the current tokio runtime
    pub fn spawn(self) -> SchedulerHandle {
        let shutdown = CancellationToken::new();
        let engine = self.engine.with_shutdown(shutdown.clone());
        let interval = self.interval;
        let token = shutdown.clone();

        let task = tokio::spawn(async move {
            run(engine, interval, token).await;
        });

        SchedulerHandle { shutdown, task }
    }
}

async fn run(engine: DeliveryEngine, period: Duration, shutdown: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        "Capsule scheduler started (interval: {}s)",
        period.as_secs()
    );

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = interval.tick() => {}
        }

        match engine.sweep().await {
            Ok(report) if report.is_empty() => debug!("Sweep finished: nothing due"),
            Ok(report) => info!("Sweep finished: {report}"),
            Err(e) => error!("Sweep aborted, retrying next tick: {e}"),
        }
    }

    info!("Capsule scheduler stopped");
}

impl SchedulerHandle {
    pub fn is_running(&self) -> bool {
        !self.shutdown.is_cancelled() && !self.task.is_finished()
    }

    /// Cancel future ticks and wait for an in-flight sweep to wind down
    pub async fn stop(self) {
        self.shutdown.cancel();
        if let Err(e) = self.task.await {
            error!("Capsule scheduler task ended abnormally: {e}");
        }
    }
}
