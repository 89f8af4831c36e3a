//! Terminal error produced by the executor.

use std::time::Duration;

use serde::Serialize;
use thiserror::Error;

/// Boxed underlying failure of an operation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Category of a failure, stable enough to pick a user-facing message from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Every permitted attempt failed.
    RetryExhausted,
    /// Connection or fetch level failure.
    TransportFailure,
    /// Time budget overrun.
    TimeoutFailure,
    /// Structured error raised by the operation itself.
    OperationError,
    /// Not a structured error at all.
    UnknownFailure,
    /// Invocation stopped by its cancellation token.
    Cancelled,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::RetryExhausted => "retry_exhausted",
            ErrorKind::TransportFailure => "transport_failure",
            ErrorKind::TimeoutFailure => "timeout_failure",
            ErrorKind::OperationError => "operation_error",
            ErrorKind::UnknownFailure => "unknown_failure",
            ErrorKind::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of an invocation that did not succeed.
///
/// `Display` carries the diagnostic message (attempt count and last failure);
/// [`ClassifiedError::user_message`] gives the text meant for end users.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClassifiedError {
    kind: ErrorKind,
    attempts: u32,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ClassifiedError {
    pub(crate) fn exhausted(attempts: u32, last: BoxError) -> Self {
        Self {
            kind: ErrorKind::RetryExhausted,
            attempts,
            message: format!("Failed after {attempts} attempts: {last}"),
            source: Some(last),
        }
    }

    pub(crate) fn deadline_exceeded(attempts: u32, deadline: Duration, last: Option<BoxError>) -> Self {
        let message = match &last {
            Some(last) => format!("Timed out after {deadline:?} and {attempts} attempts: {last}"),
            None => format!("Timed out after {deadline:?} and {attempts} attempts"),
        };
        Self {
            kind: ErrorKind::TimeoutFailure,
            attempts,
            message,
            source: last,
        }
    }

    pub(crate) fn cancelled(attempts: u32, last: Option<BoxError>) -> Self {
        let message = match &last {
            Some(last) => format!("Cancelled after {attempts} attempts: {last}"),
            None => format!("Cancelled after {attempts} attempts"),
        };
        Self {
            kind: ErrorKind::Cancelled,
            attempts,
            message,
            source: last,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Attempts started before the invocation ended.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Last failure reported by the operation, if any attempt completed.
    pub fn last_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Last failure downcast to the operation's concrete error type.
    pub fn last_error_as<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_deref()?.downcast_ref::<E>()
    }

    pub fn into_last_error(self) -> Option<BoxError> {
        self.source
    }

    /// Short, non-technical message for end users.
    pub fn user_message(&self) -> crate::resilience::classify::ErrorMessage {
        crate::resilience::classify::classify_error(crate::resilience::classify::Failure::Error(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;
    use std::io;

    #[test]
    fn test_exhausted_message_and_source() {
        let err = ClassifiedError::exhausted(4, Box::new(io::Error::other("boom")));
        assert_eq!(err.kind(), ErrorKind::RetryExhausted);
        assert_eq!(err.attempts(), 4);
        assert_eq!(err.to_string(), "Failed after 4 attempts: boom");
        assert_eq!(err.source().map(|e| e.to_string()), Some("boom".to_string()));
        assert!(err.last_error_as::<io::Error>().is_some());
        assert!(err.last_error_as::<std::fmt::Error>().is_none());
    }

    #[test]
    fn test_cancelled_without_failure() {
        let err = ClassifiedError::cancelled(0, None);
        assert_eq!(err.kind(), ErrorKind::Cancelled);
        assert_eq!(err.message(), "Cancelled after 0 attempts");
        assert!(err.source().is_none());
        assert!(err.into_last_error().is_none());
    }

    #[test]
    fn test_deadline_message() {
        let err = ClassifiedError::deadline_exceeded(2, Duration::from_millis(250), Some("slow".into()));
        assert_eq!(err.kind(), ErrorKind::TimeoutFailure);
        assert_eq!(err.to_string(), "Timed out after 250ms and 2 attempts: slow");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ErrorKind::RetryExhausted).unwrap(), "\"retry_exhausted\"");
        assert_eq!(ErrorKind::TransportFailure.to_string(), "transport_failure");
    }
}
