//! # Circuit Breaker Types
//!
//! State kept per endpoint key by the registry, and the settings that drive its
//! transitions.
//!
//! ```text
//! CLOSED    -> OPEN       failure_count >= threshold
//! OPEN      -> HALF_OPEN  cooldown elapsed, observed by the admission check
//! HALF_OPEN -> CLOSED     probe succeeds
//! HALF_OPEN -> OPEN       probe fails
//! ```

use serde::{Deserialize, Serialize};

use crate::domain::policy::RetryPolicy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    #[default]
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &str {
        match self {
            CircuitState::Closed => "CLOSED",
            CircuitState::Open => "OPEN",
            CircuitState::HalfOpen => "HALF_OPEN",
        }
    }
}

impl std::fmt::Display for CircuitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Breaker record for one endpoint key. The default value is what an absent
/// entry means: closed, no failures, never failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CircuitBreakerState {
    pub failure_count: u32,
    /// Milliseconds since the Unix epoch, per the registry's clock.
    pub last_failure_time_ms: Option<u64>,
    pub state: CircuitState,
}

impl CircuitBreakerState {
    /// Milliseconds of cooldown left at `now_ms`, or `None` if the cooldown is over
    /// (or there never was a failure).
    pub fn cooldown_remaining_ms(&self, now_ms: u64, timeout_ms: u64) -> Option<u64> {
        let last = self.last_failure_time_ms?;
        let elapsed = now_ms.saturating_sub(last);
        if elapsed <= timeout_ms {
            Some(timeout_ms - elapsed)
        } else {
            None
        }
    }
}

/// The two policy fields the registry needs for its transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSettings {
    pub threshold: u32,
    pub timeout_ms: u64,
}

impl Default for BreakerSettings {
    fn default() -> Self {
        Self::from(&RetryPolicy::default())
    }
}

impl From<&RetryPolicy> for BreakerSettings {
    fn from(policy: &RetryPolicy) -> Self {
        Self {
            threshold: policy.circuit_breaker_threshold,
            timeout_ms: policy.circuit_breaker_timeout_ms,
        }
    }
}
