//! Resilient calls to unreliable remote services.
//!
//! Wraps asynchronous remote operations with bounded retry, exponential
//! backoff and classification of the terminal failure into a message a UI
//! can show.

pub mod client;
pub mod config;
pub mod observability;
pub mod resilience;

pub use client::{RemoteBackend, ResilientClient};
pub use config::ResilienceConfig;
pub use resilience::{
    classify_error, execute_with_retry, execute_with_retry_cancellable, execute_with_retry_observed, ClassifiedError,
    ErrorKind, ErrorMessage, Failure, RetryPolicy,
};
