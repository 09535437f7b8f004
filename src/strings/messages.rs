//! # Messages
//!
//! Operator-facing text for the circuit status commands.

pub const NO_CIRCUITS: &str = "No circuit breakers recorded yet. Every endpoint is CLOSED.";
pub const CIRCUIT_USAGE: &str =
    "Usage: `.circuit <key>` | `.circuit reset <key>` | `.circuit reset-all`";
pub const ALL_RESET: &str = "🔄 All circuit breakers reset to CLOSED.";

pub fn circuit_list_header(count: usize) -> String {
    format!("**Circuit Breakers** ({count})")
}

pub fn circuit_line(
    icon: &str,
    key: &str,
    state: &str,
    failures: u32,
    last_failure: &str,
) -> String {
    format!("{icon} `{key}`: {state}, {failures} failure(s), last failure {last_failure}")
}

pub fn circuit_reset_done(key: &str) -> String {
    format!("🔄 Circuit `{key}` reset to CLOSED.")
}

pub const NEVER: &str = "never";
