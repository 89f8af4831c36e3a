//! Metrics collection.
//!
//! # Metrics
//! - `resilient_call_attempts_total` (counter): attempts started, by operation
//! - `resilient_call_retries_total` (counter): failed attempts that were retried
//! - `resilient_call_outcomes_total` (counter): terminal outcomes, by operation and outcome
//! - `resilient_call_backoff_seconds` (histogram): backoff waits
//!
//! # Design Decisions
//! - Emits through the `metrics` facade; the host installs the recorder
//! - Labels are static strings only

use std::time::Duration;

use crate::resilience::ErrorKind;

pub const ATTEMPTS_TOTAL: &str = "resilient_call_attempts_total";
pub const RETRIES_TOTAL: &str = "resilient_call_retries_total";
pub const OUTCOMES_TOTAL: &str = "resilient_call_outcomes_total";
pub const BACKOFF_SECONDS: &str = "resilient_call_backoff_seconds";

pub fn record_attempt(operation: &'static str) {
    ::metrics::counter!(ATTEMPTS_TOTAL, "operation" => operation).increment(1);
}

pub fn record_retry(operation: &'static str, delay: Duration) {
    ::metrics::counter!(RETRIES_TOTAL, "operation" => operation).increment(1);
    ::metrics::histogram!(BACKOFF_SECONDS, "operation" => operation).record(delay.as_secs_f64());
}

pub fn record_success(operation: &'static str) {
    ::metrics::counter!(OUTCOMES_TOTAL, "operation" => operation, "outcome" => "success").increment(1);
}

pub fn record_failure(operation: &'static str, kind: ErrorKind) {
    ::metrics::counter!(OUTCOMES_TOTAL, "operation" => operation, "outcome" => kind.as_str()).increment(1);
}
