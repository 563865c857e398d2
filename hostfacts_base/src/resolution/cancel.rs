//! Cooperative cancellation of a resolution run

use super::error::ResolutionError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared cancellation flag with an optional deadline
///
/// Clones share the flag, so a token handed to another thread can stop the
/// run. The evaluator checks it on every resolve entry and after every value
/// source evaluation.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token that trips once `timeout` has elapsed from now
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }

    pub fn check(&self, fact: &str) -> Result<(), ResolutionError> {
        if self.is_cancelled() {
            return Err(ResolutionError::Cancelled {
                fact: fact.to_string(),
            });
        }
        Ok(())
    }
}
