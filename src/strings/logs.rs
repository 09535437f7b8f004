//! # Log Lines
//!
//! Message text for the tracing events emitted by the executor and registry.
//! Structured fields are attached at the call site; these are the human part.

pub const CIRCUIT_REJECTED: &str = "Circuit open, rejecting call without attempting";
pub const CIRCUIT_RESET: &str = "Circuit breaker reset by operator";
pub const ALL_CIRCUITS_RESET: &str = "All circuit breakers reset by operator";

pub fn attempt_started(endpoint: &str, attempt: u32, max_attempts: u32) -> String {
    format!("[{endpoint}] Attempt {attempt}/{max_attempts}")
}

pub fn attempt_succeeded(endpoint: &str, attempt: u32) -> String {
    format!("[{endpoint}] Request succeeded on attempt {attempt}")
}

pub fn attempt_failed_retrying(
    endpoint: &str,
    attempt: u32,
    max_attempts: u32,
    err: &str,
    delay_ms: u64,
) -> String {
    format!(
        "[{endpoint}] Request failed (Attempt {attempt}/{max_attempts}): {err}. \
         Retrying in {delay_ms}ms"
    )
}

pub fn terminal_failure(endpoint: &str, attempt: u32, err: &str) -> String {
    format!("[{endpoint}] Non-retryable failure on attempt {attempt}: {err}")
}

pub fn retries_exhausted(endpoint: &str, attempts: u32, err: &str) -> String {
    format!("[{endpoint}] Failed after {attempts} attempts: {err}")
}

pub fn circuit_opened(endpoint: &str, failures: u32) -> String {
    format!("[{endpoint}] Circuit opened after {failures} consecutive failures")
}

pub fn circuit_reopened(endpoint: &str) -> String {
    format!("[{endpoint}] Half-open probe failed, circuit re-opened")
}

pub fn circuit_half_open(endpoint: &str) -> String {
    format!("[{endpoint}] Cooldown elapsed, circuit half-open")
}

pub fn circuit_closed(endpoint: &str) -> String {
    format!("[{endpoint}] Probe succeeded, circuit closed")
}
