//! # Default Error Classifier
//!
//! Fixed rules deciding which failures are transient. Anything not matched is
//! terminal: it fails fast, though it still counts against the breaker.

use crate::domain::error::FailureShape;
use crate::domain::traits::ErrorClassifier;

/// Case-sensitive substrings that mark a message as transient.
pub const RETRYABLE_MESSAGE_FRAGMENTS: [&str; 7] = [
    "ECONNRESET",
    "ENOTFOUND",
    "ECONNREFUSED",
    "ETIMEDOUT",
    "socket hang up",
    "timeout",
    "Network Error",
];

pub const RETRYABLE_HTTP_STATUSES: [u16; 7] = [408, 417, 429, 500, 502, 503, 504];

pub const RETRYABLE_CODES: [&str; 4] = ["ECONNRESET", "ENOTFOUND", "ECONNREFUSED", "ETIMEDOUT"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClassifier;

impl ErrorClassifier for DefaultClassifier {
    fn is_retryable(&self, failure: &FailureShape) -> bool {
        if RETRYABLE_MESSAGE_FRAGMENTS
            .iter()
            .any(|fragment| failure.message.contains(fragment))
        {
            return true;
        }

        if let Some(status) = failure.http_status
            && RETRYABLE_HTTP_STATUSES.contains(&status)
        {
            return true;
        }

        failure
            .code
            .as_deref()
            .is_some_and(|code| RETRYABLE_CODES.contains(&code))
    }
}
