//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Remote operation:
//!     → executor.rs (attempt, back off, retry; optional cancel/deadline)
//!     → backoff.rs (base * 2^i, optional cap and jitter)
//!     → observer.rs (intermediate failures, for logging/metrics)
//!     → error.rs (terminal ClassifiedError)
//!     → classify.rs (user-facing message)
//! ```
//!
//! # Design Decisions
//! - Each invocation owns its attempt counter and schedule; no shared state
//! - Intermediate failures never reach the caller, only observers
//! - Defaults reproduce the plain formula: no cap, no jitter, no deadline

pub mod backoff;
pub mod classify;
pub mod error;
pub mod executor;
pub mod observer;
pub mod policy;

pub use classify::{classify_error, ErrorMessage, Failure};
pub use error::{BoxError, ClassifiedError, ErrorKind};
pub use executor::{execute_with_retry, execute_with_retry_cancellable, execute_with_retry_observed};
pub use observer::{NoopObserver, RetryEvent, RetryObserver};
pub use policy::RetryPolicy;
