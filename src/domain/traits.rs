//! # Domain Traits
//!
//! Seams between the resilience core and its surroundings: how errors are
//! normalized and judged, and where time comes from.

use crate::domain::error::FailureShape;

/// Adapts a caller's error type into the normalized `FailureShape`.
///
/// Each calling module implements this for its own transport errors so the
/// core never has to know about them.
pub trait Classify {
    fn failure_shape(&self) -> FailureShape;
}

/// Decides whether a failure is worth another attempt.
pub trait ErrorClassifier: Send + Sync {
    fn is_retryable(&self, failure: &FailureShape) -> bool;
}

impl<F> ErrorClassifier for F
where
    F: Fn(&FailureShape) -> bool + Send + Sync,
{
    fn is_retryable(&self, failure: &FailureShape) -> bool {
        self(failure)
    }
}

/// Wall-clock source for breaker timestamps, in milliseconds since the Unix epoch.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

impl Classify for FailureShape {
    fn failure_shape(&self) -> FailureShape {
        self.clone()
    }
}

impl Classify for String {
    fn failure_shape(&self) -> FailureShape {
        FailureShape::new(self.as_str())
    }
}

impl Classify for &str {
    fn failure_shape(&self) -> FailureShape {
        FailureShape::new(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_errors_are_message_only() {
        let shape = "socket hang up".to_string().failure_shape();
        assert_eq!(shape.message, "socket hang up");
        assert_eq!(shape.code, None);
        assert_eq!(shape.http_status, None);
    }

    #[test]
    fn test_closure_classifier() {
        let only_teapots = |f: &FailureShape| f.http_status == Some(418);
        assert!(only_teapots.is_retryable(&FailureShape::new("x").with_status(418)));
        assert!(!only_teapots.is_retryable(&FailureShape::new("x")));
    }
}
