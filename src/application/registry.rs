//! # Circuit Breaker Registry
//!
//! One independent breaker per endpoint key, created lazily on the first
//! recorded failure. A key with no entry behaves exactly like a default
//! (closed, clean) breaker.
//!
//! Every operation is a short synchronous critical section; the lock is never
//! held across an `.await`. Concurrent callers sharing a key may both pass the
//! admission check and both record a failure, so `failure_count` can overshoot
//! the threshold. That only affects what operators see.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::circuit::{BreakerSettings, CircuitBreakerState, CircuitState};
use crate::domain::traits::Clock;
use crate::infrastructure::clock::SystemClock;
use crate::strings::logs;

pub struct CircuitBreakerRegistry {
    breakers: Mutex<HashMap<String, CircuitBreakerState>>,
    settings: BreakerSettings,
    clock: Arc<dyn Clock>,
}

impl Default for CircuitBreakerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CircuitBreakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreakerRegistry")
            .field("settings", &self.settings)
            .field("breakers", &*self.lock())
            .finish()
    }
}

impl CircuitBreakerRegistry {
    /// Registry with the documented default threshold/timeout and wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(BreakerSettings::default(), Arc::new(SystemClock))
    }

    pub fn with_settings(settings: BreakerSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: BreakerSettings, clock: Arc<dyn Clock>) -> Self {
        Self {
            breakers: Mutex::new(HashMap::new()),
            settings,
            clock,
        }
    }

    /// Settings used by the operations that don't take their own.
    pub fn settings(&self) -> BreakerSettings {
        self.settings
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CircuitBreakerState>> {
        // Every critical section leaves the map consistent, so a poisoned lock is still usable.
        self.breakers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reset the failure count; a half-open breaker closes.
    pub fn record_success(&self, key: &str) {
        let mut breakers = self.lock();
        if let Some(breaker) = breakers.get_mut(key) {
            breaker.failure_count = 0;
            if breaker.state == CircuitState::HalfOpen {
                breaker.state = CircuitState::Closed;
                tracing::info!(
                    endpoint = key,
                    state = %breaker.state,
                    "{}",
                    logs::circuit_closed(key)
                );
            }
        }
    }

    pub fn record_failure(&self, key: &str) {
        self.record_failure_with(key, &self.settings);
    }

    /// Count one failed call, opening the breaker when the threshold is reached
    /// or when a half-open probe fails.
    pub fn record_failure_with(&self, key: &str, settings: &BreakerSettings) {
        let now = self.clock.now_ms();
        let mut breakers = self.lock();
        let breaker = breakers.entry(key.to_string()).or_default();

        breaker.failure_count = breaker.failure_count.saturating_add(1);
        breaker.last_failure_time_ms = Some(now);

        match breaker.state {
            CircuitState::Closed if breaker.failure_count >= settings.threshold => {
                breaker.state = CircuitState::Open;
                tracing::warn!(
                    endpoint = key,
                    failures = breaker.failure_count,
                    state = %breaker.state,
                    "{}",
                    logs::circuit_opened(key, breaker.failure_count)
                );
            }
            CircuitState::HalfOpen => {
                breaker.state = CircuitState::Open;
                tracing::warn!(
                    endpoint = key,
                    failures = breaker.failure_count,
                    state = %breaker.state,
                    "{}",
                    logs::circuit_reopened(key)
                );
            }
            // Open stays open; the fresh failure time extends the cooldown.
            _ => {}
        }
    }

    /// Admission check. `Err(retry_after_ms)` while open and cooling down; once
    /// the cooldown has elapsed the breaker moves to half-open and the call is
    /// admitted.
    pub fn admit(&self, key: &str, settings: &BreakerSettings) -> Result<(), u64> {
        let now = self.clock.now_ms();
        let mut breakers = self.lock();
        let Some(breaker) = breakers.get_mut(key) else {
            return Ok(());
        };

        if breaker.state != CircuitState::Open {
            return Ok(());
        }

        match breaker.cooldown_remaining_ms(now, settings.timeout_ms) {
            Some(remaining) => Err(remaining),
            None => {
                breaker.state = CircuitState::HalfOpen;
                tracing::info!(
                    endpoint = key,
                    state = %breaker.state,
                    "{}",
                    logs::circuit_half_open(key)
                );
                Ok(())
            }
        }
    }

    pub fn is_circuit_open(&self, key: &str) -> bool {
        self.is_circuit_open_with(key, &self.settings)
    }

    /// True while open and cooling down. Like `admit`, a check made after the
    /// cooldown moves the breaker to half-open.
    pub fn is_circuit_open_with(&self, key: &str, settings: &BreakerSettings) -> bool {
        self.admit(key, settings).is_err()
    }

    /// Snapshot for one key. Never mutates; unknown keys read as closed.
    pub fn get_circuit_status(&self, key: &str) -> CircuitBreakerState {
        self.lock().get(key).copied().unwrap_or_default()
    }

    /// Snapshot of every recorded breaker, ordered by key.
    pub fn get_all_circuit_statuses(&self) -> BTreeMap<String, CircuitBreakerState> {
        self.lock()
            .iter()
            .map(|(key, state)| (key.clone(), *state))
            .collect()
    }

    /// Operator override: clean and closed.
    pub fn reset_circuit_breaker(&self, key: &str) {
        let mut breakers = self.lock();
        if let Some(breaker) = breakers.get_mut(key) {
            breaker.failure_count = 0;
            breaker.state = CircuitState::Closed;
            tracing::info!(endpoint = key, "{}", logs::CIRCUIT_RESET);
        }
    }

    pub fn reset_all(&self) {
        let mut breakers = self.lock();
        for breaker in breakers.values_mut() {
            breaker.failure_count = 0;
            breaker.state = CircuitState::Closed;
        }
        tracing::info!(count = breakers.len(), "{}", logs::ALL_CIRCUITS_RESET);
    }
}
