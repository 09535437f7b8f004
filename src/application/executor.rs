//! # Retry Executor
//!
//! Wraps a remote call with bounded retry-with-backoff and the endpoint's
//! circuit breaker.
//!
//! - Rejects up front while the endpoint's breaker is open
//! - Retries only failures the classifier calls transient
//! - Counts one breaker failure per failed *call*, not per attempt
//! - Never swallows an error: the caller gets the value or the original failure

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::time::sleep;

use crate::application::classifier::DefaultClassifier;
use crate::application::registry::CircuitBreakerRegistry;
use crate::domain::circuit::{BreakerSettings, CircuitBreakerState};
use crate::domain::config::AppConfig;
use crate::domain::error::ExecuteError;
use crate::domain::policy::{PolicyOverrides, RetryPolicy};
use crate::domain::traits::{Classify, ErrorClassifier};
use crate::strings::logs;

/// Endpoint key used when the caller doesn't name one.
pub const DEFAULT_ENDPOINT: &str = "default";

pub struct RetryExecutor {
    registry: Arc<CircuitBreakerRegistry>,
    defaults: RetryPolicy,
    endpoints: HashMap<String, PolicyOverrides>,
    classifier: Arc<dyn ErrorClassifier>,
}

impl std::fmt::Debug for RetryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryExecutor")
            .field("defaults", &self.defaults)
            .field("endpoints", &self.endpoints)
            .field("registry", &self.registry)
            .finish()
    }
}

impl RetryExecutor {
    /// Executor with the documented default policy and the default classifier.
    pub fn new(registry: Arc<CircuitBreakerRegistry>) -> Self {
        Self {
            registry,
            defaults: RetryPolicy::default(),
            endpoints: HashMap::new(),
            classifier: Arc::new(DefaultClassifier),
        }
    }

    /// Executor whose defaults and per-endpoint overrides come from configuration.
    pub fn from_config(config: &AppConfig, registry: Arc<CircuitBreakerRegistry>) -> Self {
        Self::new(registry)
            .with_defaults(config.default_policy())
            .with_endpoint_overrides(config.endpoints.clone())
    }

    pub fn with_defaults(mut self, defaults: RetryPolicy) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_endpoint_overrides(mut self, endpoints: HashMap<String, PolicyOverrides>) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn registry(&self) -> &Arc<CircuitBreakerRegistry> {
        &self.registry
    }

    pub fn defaults(&self) -> RetryPolicy {
        self.defaults
    }

    /// Policy a call to `endpoint_key` with `overrides` would run under:
    /// defaults, then configured endpoint overrides, then the call's own.
    pub fn resolve_policy(&self, endpoint_key: &str, overrides: &PolicyOverrides) -> RetryPolicy {
        let key = normalize_key(endpoint_key);
        let configured = self.endpoints.get(key).copied().unwrap_or_default();
        self.defaults.merged(&configured.overlay(overrides))
    }

    /// Run `operation` under the default endpoint with no overrides.
    pub async fn execute<T, E, F, Fut>(&self, operation: F) -> Result<T, ExecuteError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify,
    {
        self.execute_with_retry(operation, &PolicyOverrides::default(), DEFAULT_ENDPOINT)
            .await
    }

    /// Execute an operation with retry logic and circuit breaking.
    ///
    /// # Arguments
    /// * `operation` - Invoked once per attempt; must enforce its own timeout
    /// * `overrides` - Partial policy for this call only
    /// * `endpoint_key` - Logical dependency, e.g. "send-message" (empty means "default")
    ///
    /// # Example
    /// ```ignore
    /// let reply = executor
    ///     .execute_with_retry(
    ///         || async { chat.send_message("hello").await },
    ///         &PolicyOverrides::new().max_retries(2),
    ///         "send-message",
    ///     )
    ///     .await?;
    /// ```
    pub async fn execute_with_retry<T, E, F, Fut>(
        &self,
        mut operation: F,
        overrides: &PolicyOverrides,
        endpoint_key: &str,
    ) -> Result<T, ExecuteError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Classify,
    {
        let key = normalize_key(endpoint_key);
        let policy = self.resolve_policy(key, overrides);
        let settings = BreakerSettings::from(&policy);
        let max_attempts = policy.max_attempts();

        if let Err(retry_after_ms) = self.registry.admit(key, &settings) {
            tracing::warn!(endpoint = key, retry_after_ms, "{}", logs::CIRCUIT_REJECTED);
            return Err(ExecuteError::CircuitOpen {
                endpoint: key.to_string(),
                retry_after_ms,
            });
        }

        let mut attempt = 1;
        loop {
            tracing::debug!(
                endpoint = key,
                attempt,
                max_attempts,
                "{}",
                logs::attempt_started(key, attempt, max_attempts)
            );

            let error = match operation().await {
                Ok(value) => {
                    self.registry.record_success(key);
                    if attempt > 1 {
                        tracing::info!(
                            endpoint = key,
                            attempt,
                            "{}",
                            logs::attempt_succeeded(key, attempt)
                        );
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            let failure = error.failure_shape();

            if !self.classifier.is_retryable(&failure) {
                self.registry.record_failure_with(key, &settings);
                tracing::warn!(
                    endpoint = key,
                    attempt,
                    code = failure.code.as_deref(),
                    http_status = failure.http_status,
                    "{}",
                    logs::terminal_failure(key, attempt, &failure.message)
                );
                return Err(ExecuteError::Terminal {
                    attempts: attempt,
                    source: error,
                });
            }

            if attempt >= max_attempts {
                self.registry.record_failure_with(key, &settings);
                tracing::error!(
                    endpoint = key,
                    attempts = attempt,
                    code = failure.code.as_deref(),
                    http_status = failure.http_status,
                    "{}",
                    logs::retries_exhausted(key, attempt, &failure.message)
                );
                return Err(ExecuteError::Exhausted {
                    attempts: attempt,
                    source: error,
                });
            }

            let delay_ms = policy.delay_ms(attempt);
            tracing::warn!(
                endpoint = key,
                attempt,
                max_attempts,
                delay_ms,
                code = failure.code.as_deref(),
                http_status = failure.http_status,
                "{}",
                logs::attempt_failed_retrying(
                    key,
                    attempt,
                    max_attempts,
                    &failure.message,
                    delay_ms
                )
            );
            sleep(policy.delay(attempt)).await;
            attempt += 1;
        }
    }

    /// Admission check for `endpoint_key` under the executor's defaults.
    pub fn is_circuit_open(&self, endpoint_key: &str) -> bool {
        let key = normalize_key(endpoint_key);
        let policy = self.resolve_policy(key, &PolicyOverrides::default());
        self.registry
            .is_circuit_open_with(key, &BreakerSettings::from(&policy))
    }

    pub fn get_circuit_status(&self, endpoint_key: &str) -> CircuitBreakerState {
        self.registry.get_circuit_status(normalize_key(endpoint_key))
    }

    pub fn get_all_circuit_statuses(
        &self,
    ) -> std::collections::BTreeMap<String, CircuitBreakerState> {
        self.registry.get_all_circuit_statuses()
    }

    pub fn reset_circuit_breaker(&self, endpoint_key: &str) {
        self.registry.reset_circuit_breaker(normalize_key(endpoint_key));
    }
}

fn normalize_key(endpoint_key: &str) -> &str {
    if endpoint_key.is_empty() {
        DEFAULT_ENDPOINT
    } else {
        endpoint_key
    }
}
