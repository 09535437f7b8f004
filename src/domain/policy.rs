//! # Retry Policy
//!
//! The value object that governs a single `execute_with_retry` call: how many
//! attempts, how the backoff grows, and when the endpoint's breaker trips.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY_MS: u64 = 1000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 8000;
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;
pub const DEFAULT_CIRCUIT_BREAKER_THRESHOLD: u32 = 5;
pub const DEFAULT_CIRCUIT_BREAKER_TIMEOUT_MS: u64 = 30_000;

/// Fully resolved policy for one call. Immutable once merged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
    pub circuit_breaker_threshold: u32,
    pub circuit_breaker_timeout_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay_ms: DEFAULT_BASE_DELAY_MS,
            max_delay_ms: DEFAULT_MAX_DELAY_MS,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            circuit_breaker_threshold: DEFAULT_CIRCUIT_BREAKER_THRESHOLD,
            circuit_breaker_timeout_ms: DEFAULT_CIRCUIT_BREAKER_TIMEOUT_MS,
        }
    }
}

impl RetryPolicy {
    /// Apply caller overrides on top of this policy.
    pub fn merged(&self, overrides: &PolicyOverrides) -> Self {
        Self {
            max_retries: overrides.max_retries.unwrap_or(self.max_retries),
            base_delay_ms: overrides.base_delay_ms.unwrap_or(self.base_delay_ms),
            max_delay_ms: overrides.max_delay_ms.unwrap_or(self.max_delay_ms),
            backoff_multiplier: overrides
                .backoff_multiplier
                .unwrap_or(self.backoff_multiplier),
            circuit_breaker_threshold: overrides
                .circuit_breaker_threshold
                .unwrap_or(self.circuit_breaker_threshold),
            circuit_breaker_timeout_ms: overrides
                .circuit_breaker_timeout_ms
                .unwrap_or(self.circuit_breaker_timeout_ms),
        }
    }

    /// Total number of times the operation may be invoked.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay to wait after the `attempt`-th failed attempt (1-based):
    /// `min(base * multiplier^(attempt-1), max)`.
    pub fn delay_ms(&self, attempt: u32) -> u64 {
        let exponent = attempt.saturating_sub(1);
        let exponent = i32::try_from(exponent).unwrap_or(i32::MAX);
        let raw = self.base_delay_ms as f64 * self.backoff_multiplier.powi(exponent);
        let cap = self.max_delay_ms as f64;

        // NaN (e.g. 0 * inf) and negatives collapse to zero; overflow to the cap.
        if raw.is_nan() || raw <= 0.0 {
            0
        } else if raw >= cap {
            self.max_delay_ms
        } else {
            raw.round() as u64
        }
    }

    pub fn delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.delay_ms(attempt))
    }

    /// The sleeps a call would take if every attempt failed with a retryable error.
    pub fn delay_schedule(&self) -> Vec<u64> {
        (1..=self.max_retries).map(|n| self.delay_ms(n)).collect()
    }
}

/// Partial policy. Every field left as `None` falls back to the defaults it is
/// merged over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PolicyOverrides {
    pub max_retries: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub backoff_multiplier: Option<f64>,
    pub circuit_breaker_threshold: Option<u32>,
    pub circuit_breaker_timeout_ms: Option<u64>,
}

impl PolicyOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_retries(mut self, value: u32) -> Self {
        self.max_retries = Some(value);
        self
    }

    pub fn base_delay_ms(mut self, value: u64) -> Self {
        self.base_delay_ms = Some(value);
        self
    }

    pub fn max_delay_ms(mut self, value: u64) -> Self {
        self.max_delay_ms = Some(value);
        self
    }

    pub fn backoff_multiplier(mut self, value: f64) -> Self {
        self.backoff_multiplier = Some(value);
        self
    }

    pub fn circuit_breaker_threshold(mut self, value: u32) -> Self {
        self.circuit_breaker_threshold = Some(value);
        self
    }

    pub fn circuit_breaker_timeout_ms(mut self, value: u64) -> Self {
        self.circuit_breaker_timeout_ms = Some(value);
        self
    }

    /// Layer `other` on top of `self`; fields set in `other` win.
    pub fn overlay(&self, other: &PolicyOverrides) -> Self {
        Self {
            max_retries: other.max_retries.or(self.max_retries),
            base_delay_ms: other.base_delay_ms.or(self.base_delay_ms),
            max_delay_ms: other.max_delay_ms.or(self.max_delay_ms),
            backoff_multiplier: other.backoff_multiplier.or(self.backoff_multiplier),
            circuit_breaker_threshold: other
                .circuit_breaker_threshold
                .or(self.circuit_breaker_threshold),
            circuit_breaker_timeout_ms: other
                .circuit_breaker_timeout_ms
                .or(self.circuit_breaker_timeout_ms),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl From<RetryPolicy> for PolicyOverrides {
    fn from(policy: RetryPolicy) -> Self {
        Self {
            max_retries: Some(policy.max_retries),
            base_delay_ms: Some(policy.base_delay_ms),
            max_delay_ms: Some(policy.max_delay_ms),
            backoff_multiplier: Some(policy.backoff_multiplier),
            circuit_breaker_threshold: Some(policy.circuit_breaker_threshold),
            circuit_breaker_timeout_ms: Some(policy.circuit_breaker_timeout_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_documented_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.base_delay_ms, 1000);
        assert_eq!(policy.max_delay_ms, 8000);
        assert_eq!(policy.backoff_multiplier, 2.0);
        assert_eq!(policy.circuit_breaker_threshold, 5);
        assert_eq!(policy.circuit_breaker_timeout_ms, 30_000);
        assert_eq!(policy.max_attempts(), 4);
    }

    #[test]
    fn test_merge_only_touches_present_fields() {
        let merged = RetryPolicy::default().merged(
            &PolicyOverrides::new()
                .max_retries(1)
                .circuit_breaker_timeout_ms(500),
        );
        assert_eq!(merged.max_retries, 1);
        assert_eq!(merged.circuit_breaker_timeout_ms, 500);
        assert_eq!(merged.base_delay_ms, 1000);
        assert_eq!(merged.circuit_breaker_threshold, 5);
    }

    #[test]
    fn test_delay_schedule_default() {
        // 1000 * 2^0, 2^1, 2^2
        assert_eq!(RetryPolicy::default().delay_schedule(), vec![1000, 2000, 4000]);
    }

    #[test]
    fn test_delay_capped_at_max() {
        let policy = RetryPolicy::default().merged(&PolicyOverrides::new().max_retries(6));
        assert_eq!(
            policy.delay_schedule(),
            vec![1000, 2000, 4000, 8000, 8000, 8000]
        );
        assert_eq!(policy.delay_ms(200), 8000);
    }

    #[test]
    fn test_delay_with_fractional_multiplier() {
        let policy = RetryPolicy::default().merged(
            &PolicyOverrides::new()
                .base_delay_ms(100)
                .backoff_multiplier(1.5),
        );
        assert_eq!(policy.delay_ms(1), 100);
        assert_eq!(policy.delay_ms(2), 150);
        assert_eq!(policy.delay_ms(3), 225);
    }

    #[test]
    fn test_zero_max_retries_has_no_delays() {
        let policy = RetryPolicy::default().merged(&PolicyOverrides::new().max_retries(0));
        assert_eq!(policy.max_attempts(), 1);
        assert!(policy.delay_schedule().is_empty());
    }

    #[test]
    fn test_overlay_prefers_later_layer() {
        let base = PolicyOverrides::new().max_retries(2).base_delay_ms(10);
        let top = PolicyOverrides::new().max_retries(7);
        let layered = base.overlay(&top);
        assert_eq!(layered.max_retries, Some(7));
        assert_eq!(layered.base_delay_ms, Some(10));
        assert!(PolicyOverrides::new().is_empty());
        assert!(!layered.is_empty());
    }
}
