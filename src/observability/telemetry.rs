//! Executor observer that logs and counts.

use crate::observability::metrics;
use crate::resilience::{ClassifiedError, RetryEvent, RetryObserver};

/// Logs retries and terminal failures through `tracing` and records them as
/// metrics labelled with `operation`. Metrics are on unless turned off.
#[derive(Debug, Clone, Copy)]
pub struct TelemetryObserver {
    operation: &'static str,
    metrics_enabled: bool,
}

impl TelemetryObserver {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            metrics_enabled: true,
        }
    }

    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }

    pub fn operation(&self) -> &'static str {
        self.operation
    }
}

impl RetryObserver for TelemetryObserver {
    fn on_attempt(&self, attempt: u32) {
        tracing::trace!(operation = self.operation, attempt, "Starting attempt");
        if self.metrics_enabled {
            metrics::record_attempt(self.operation);
        }
    }

    fn on_retry(&self, event: &RetryEvent<'_>) {
        tracing::warn!(
            operation = self.operation,
            attempt = event.attempt,
            max_attempts = event.max_attempts,
            delay = ?event.delay,
            elapsed = ?event.elapsed,
            error = %event.error,
            "Attempt failed, retrying"
        );
        if self.metrics_enabled {
            metrics::record_retry(self.operation, event.delay);
        }
    }

    fn on_success(&self, attempts: u32) {
        tracing::debug!(operation = self.operation, attempts, "Operation succeeded");
        if self.metrics_enabled {
            metrics::record_success(self.operation);
        }
    }

    fn on_failure(&self, error: &ClassifiedError) {
        tracing::warn!(
            operation = self.operation,
            kind = %error.kind(),
            attempts = error.attempts(),
            error = %error,
            "Operation failed"
        );
        if self.metrics_enabled {
            metrics::record_failure(self.operation, error.kind());
        }
    }
}
