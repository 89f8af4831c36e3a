//! Resilient call executor.
//!
//! # State Machine
//! ```text
//! Attempting(n) → Succeeded       operation returned Ok
//! Attempting(n) → Attempting(n+1) operation failed, n < max_attempts, after backoff
//! Attempting(n) → Exhausted       operation failed, n == max_attempts
//! Attempting(n) → Exhausted       cancelled or past the deadline (optional)
//! ```
//!
//! Attempts within one invocation are strictly sequential. Waits use
//! `tokio::time::sleep`, so only the awaiting task is suspended.

use std::future::Future;
use std::time::Duration;

use tokio::time::{sleep, sleep_until, Instant};
use tokio_util::sync::CancellationToken;

use crate::resilience::error::{BoxError, ClassifiedError};
use crate::resilience::observer::{NoopObserver, RetryEvent, RetryObserver};
use crate::resilience::policy::RetryPolicy;

enum State<T> {
    Attempting { attempt: u32 },
    Succeeded { value: T, attempts: u32 },
    Exhausted(ClassifiedError),
}

enum Interrupted {
    Cancelled,
    DeadlineExpired,
}

/// Run `operation` until it succeeds or `policy` runs out of attempts.
///
/// Intermediate failures are retried silently. Returns the first success, or
/// a [`ClassifiedError`] wrapping the last failure once every attempt failed.
pub async fn execute_with_retry<F, Fut, T, E>(operation: F, policy: &RetryPolicy) -> Result<T, ClassifiedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
{
    run(operation, policy, &NoopObserver, None).await
}

/// Same as [`execute_with_retry`], reporting attempts and retries to `observer`.
pub async fn execute_with_retry_observed<F, Fut, T, E, O>(
    operation: F,
    policy: &RetryPolicy,
    observer: &O,
) -> Result<T, ClassifiedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
    O: RetryObserver + ?Sized,
{
    run(operation, policy, observer, None).await
}

/// Same as [`execute_with_retry_observed`], stopping early once `cancel` fires.
///
/// Cancellation is checked before each attempt and races both the in-flight
/// attempt and the backoff wait. The in-flight attempt is dropped.
pub async fn execute_with_retry_cancellable<F, Fut, T, E, O>(
    operation: F,
    policy: &RetryPolicy,
    observer: &O,
    cancel: &CancellationToken,
) -> Result<T, ClassifiedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
    O: RetryObserver + ?Sized,
{
    run(operation, policy, observer, Some(cancel)).await
}

async fn run<F, Fut, T, E, O>(
    mut operation: F,
    policy: &RetryPolicy,
    observer: &O,
    cancel: Option<&CancellationToken>,
) -> Result<T, ClassifiedError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Into<BoxError>,
    O: RetryObserver + ?Sized,
{
    let started = Instant::now();
    // A budget too large to represent is no budget at all.
    let deadline = policy.deadline().and_then(|budget| started.checked_add(budget));
    let max_attempts = policy.max_attempts();
    let mut last_error: Option<BoxError> = None;
    let mut state = State::Attempting { attempt: 1 };

    loop {
        state = match state {
            State::Succeeded { value, attempts } => {
                observer.on_success(attempts);
                return Ok(value);
            }
            State::Exhausted(error) => {
                observer.on_failure(&error);
                return Err(error);
            }
            State::Attempting { attempt } if cancel.is_some_and(CancellationToken::is_cancelled) => {
                State::Exhausted(ClassifiedError::cancelled(attempt - 1, last_error.take()))
            }
            State::Attempting { attempt } => {
                observer.on_attempt(attempt);
                match guarded(operation(), cancel, deadline).await {
                    Err(interrupted) => State::Exhausted(interrupt(interrupted, attempt, policy, last_error.take())),
                    Ok(Ok(value)) => State::Succeeded { value, attempts: attempt },
                    Ok(Err(error)) if attempt >= max_attempts => {
                        State::Exhausted(ClassifiedError::exhausted(attempt, error.into()))
                    }
                    Ok(Err(error)) => {
                        let error: BoxError = error.into();
                        let delay = policy.delay_before_retry(attempt - 1);
                        observer.on_retry(&RetryEvent {
                            attempt,
                            max_attempts,
                            delay,
                            elapsed: started.elapsed(),
                            error: &*error,
                        });
                        last_error = Some(error);

                        if deadline.is_some_and(|deadline| ends_past(delay, deadline)) {
                            State::Exhausted(interrupt(Interrupted::DeadlineExpired, attempt, policy, last_error.take()))
                        } else {
                            match guarded(sleep(delay), cancel, deadline).await {
                                Ok(()) => State::Attempting { attempt: attempt + 1 },
                                Err(interrupted) => {
                                    State::Exhausted(interrupt(interrupted, attempt, policy, last_error.take()))
                                }
                            }
                        }
                    }
                }
            }
        };
    }
}

/// Whether a wait of `delay` starting now would end at or past `deadline`.
fn ends_past(delay: Duration, deadline: Instant) -> bool {
    Instant::now().checked_add(delay).map_or(true, |end| end >= deadline)
}

fn interrupt(
    interrupted: Interrupted,
    attempts: u32,
    policy: &RetryPolicy,
    last_error: Option<BoxError>,
) -> ClassifiedError {
    match interrupted {
        Interrupted::Cancelled => ClassifiedError::cancelled(attempts, last_error),
        Interrupted::DeadlineExpired => {
            ClassifiedError::deadline_exceeded(attempts, policy.deadline().unwrap_or_default(), last_error)
        }
    }
}

/// Races `fut` against the cancellation token and the deadline, when present.
async fn guarded<Fut: Future>(
    fut: Fut,
    cancel: Option<&CancellationToken>,
    deadline: Option<Instant>,
) -> Result<Fut::Output, Interrupted> {
    tokio::select! {
        biased;
        _ = cancelled(cancel) => Err(Interrupted::Cancelled),
        _ = expired(deadline) => Err(Interrupted::DeadlineExpired),
        output = fut => Ok(output),
    }
}

async fn cancelled(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

async fn expired(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
