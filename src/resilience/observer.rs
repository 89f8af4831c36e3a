//! Hooks for watching an invocation without changing its retry semantics.

use std::error::Error;
use std::time::Duration;

use crate::resilience::error::ClassifiedError;

/// A failed attempt that will be retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryEvent<'a> {
    /// Attempt that just failed (1-based).
    pub attempt: u32,
    pub max_attempts: u32,
    /// Wait before the next attempt.
    pub delay: Duration,
    /// Time since the invocation started.
    pub elapsed: Duration,
    pub error: &'a (dyn Error + Send + Sync + 'static),
}

/// Receives executor events. Every method defaults to doing nothing.
///
/// Closures taking `&RetryEvent` are observers of retries only.
pub trait RetryObserver: Send + Sync {
    /// An attempt is about to start.
    fn on_attempt(&self, _attempt: u32) {}

    /// An attempt failed and the executor is about to back off.
    fn on_retry(&self, _event: &RetryEvent<'_>) {}

    fn on_success(&self, _attempts: u32) {}

    fn on_failure(&self, _error: &ClassifiedError) {}
}

impl<F> RetryObserver for F
where
    F: Fn(&RetryEvent<'_>) + Send + Sync,
{
    fn on_retry(&self, event: &RetryEvent<'_>) {
        self(event)
    }
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RetryObserver for NoopObserver {}
