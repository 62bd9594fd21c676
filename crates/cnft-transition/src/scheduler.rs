//! Delay source for the submission engine's backoff.
//!
//! The engine never sleeps directly; it asks a [`Scheduler`]. Production code
//! uses [`TokioScheduler`]. Tests use [`ManualScheduler`], which records the
//! requested delays and returns immediately.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

/// Cooperative suspension between submission attempts.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Suspend the calling task for `delay`.
    async fn sleep(&self, delay: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn sleep(&self, delay: Duration) {
        tokio::time::sleep(delay).await;
    }
}

/// Records every requested delay and returns without waiting.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    delays: Mutex<Vec<Duration>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delays requested so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        match self.delays.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Sum of all requested delays.
    pub fn total(&self) -> Duration {
        self.delays().iter().sum()
    }
}

#[async_trait]
impl Scheduler for ManualScheduler {
    async fn sleep(&self, delay: Duration) {
        match self.delays.lock() {
            Ok(mut guard) => guard.push(delay),
            Err(poisoned) => poisoned.into_inner().push(delay),
        }
    }
}
