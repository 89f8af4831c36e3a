//! Error classification into user-facing messages.
//!
//! Pure and total: the same failure always maps to the same message and no
//! input makes it fail. Rules, first match wins:
//!
//! ```text
//! ClassifiedError (retry exhaustion)      → connectivity issue
//! text mentions "fetch" / connection io   → connection failed
//! text mentions "timeout" / TimedOut io   → request timed out
//! any other structured error              → its own message
//! anything else                           → unexpected error
//! ```

use std::any::Any;
use std::borrow::Cow;
use std::error::Error;
use std::io;

use serde::Serialize;

use crate::resilience::error::{ClassifiedError, ErrorKind};

pub const CONNECTIVITY_MESSAGE: &str =
    "Network connection issue. Please check your internet connection and try again.";
pub const TRANSPORT_MESSAGE: &str = "Connection failed. Please try again in a moment.";
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please try again.";
pub const CANCELLED_MESSAGE: &str = "The request was cancelled.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again.";

// Markers are matched against the lowercased text, so "Fetch" and
// "Timeout exceeded" are caught too. "timed out" covers io and hyper wording.
const TRANSPORT_MARKERS: &[&str] = &["fetch"];
const TIMEOUT_MARKERS: &[&str] = &["timeout", "timed out"];

/// A failure value as seen by the classifier.
#[derive(Debug, Clone, Copy)]
pub enum Failure<'a> {
    /// A structured error.
    Error(&'a (dyn Error + 'static)),
    /// Anything else, such as a panic payload.
    Opaque(&'a (dyn Any + Send)),
}

/// User-facing message chosen for a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMessage {
    kind: ErrorKind,
    text: Cow<'static, str>,
}

impl ErrorMessage {
    fn fixed(kind: ErrorKind, text: &'static str) -> Self {
        Self {
            kind,
            text: Cow::Borrowed(text),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl std::fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Pick the user-facing message for `failure`.
pub fn classify_error(failure: Failure<'_>) -> ErrorMessage {
    match failure {
        Failure::Opaque(_) => ErrorMessage::fixed(ErrorKind::UnknownFailure, UNEXPECTED_MESSAGE),
        Failure::Error(error) => classify_structured(error),
    }
}

fn classify_structured(error: &(dyn Error + 'static)) -> ErrorMessage {
    if let Some(classified) = error.downcast_ref::<ClassifiedError>() {
        return match classified.kind() {
            ErrorKind::Cancelled => ErrorMessage::fixed(ErrorKind::Cancelled, CANCELLED_MESSAGE),
            ErrorKind::TimeoutFailure => ErrorMessage::fixed(ErrorKind::TimeoutFailure, TIMEOUT_MESSAGE),
            _ => ErrorMessage::fixed(ErrorKind::RetryExhausted, CONNECTIVITY_MESSAGE),
        };
    }

    let text = error.to_string();
    let lowered = text.to_lowercase();

    if contains_any(&lowered, TRANSPORT_MARKERS) || io_kind_matches(error, is_connection_kind) {
        return ErrorMessage::fixed(ErrorKind::TransportFailure, TRANSPORT_MESSAGE);
    }
    if contains_any(&lowered, TIMEOUT_MARKERS) || io_kind_matches(error, |kind| kind == io::ErrorKind::TimedOut) {
        return ErrorMessage::fixed(ErrorKind::TimeoutFailure, TIMEOUT_MESSAGE);
    }

    ErrorMessage {
        kind: ErrorKind::OperationError,
        text: Cow::Owned(text),
    }
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

/// Walks the source chain looking for an `io::Error` whose kind matches.
fn io_kind_matches(error: &(dyn Error + 'static), predicate: impl Fn(io::ErrorKind) -> bool) -> bool {
    std::iter::successors(Some(error), |&e| e.source())
        .filter_map(|e| e.downcast_ref::<io::Error>())
        .any(|io_error| predicate(io_error.kind()))
}

fn is_connection_kind(kind: io::ErrorKind) -> bool {
    matches!(
        kind,
        io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
    )
}
