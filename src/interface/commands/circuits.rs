//! # Circuit Commands
//!
//! Handles `.circuits` and `.circuit`.
//! Lets operators inspect breaker state and force a breaker closed.

use chrono::{DateTime, Local, Utc};

use crate::application::registry::CircuitBreakerRegistry;
use crate::domain::circuit::{CircuitBreakerState, CircuitState};
use crate::strings::messages;

/// `.circuits`: one line per recorded breaker.
pub fn handle_list(registry: &CircuitBreakerRegistry) -> String {
    let statuses = registry.get_all_circuit_statuses();
    if statuses.is_empty() {
        return messages::NO_CIRCUITS.to_string();
    }

    let mut out = messages::circuit_list_header(statuses.len());
    for (key, status) in &statuses {
        out.push('\n');
        out.push_str(&render_line(key, status));
    }
    out
}

/// `.circuit <key>`, `.circuit reset <key>`, `.circuit reset-all`.
pub fn handle_circuit(registry: &CircuitBreakerRegistry, args: &str) -> String {
    let mut parts = args.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("reset-all"), None, None) => {
            registry.reset_all();
            messages::ALL_RESET.to_string()
        }
        (Some("reset"), Some(key), None) => {
            registry.reset_circuit_breaker(key);
            messages::circuit_reset_done(key)
        }
        (Some(key), None, None) if key != "reset" => {
            render_line(key, &registry.get_circuit_status(key))
        }
        _ => messages::CIRCUIT_USAGE.to_string(),
    }
}

pub fn render_line(key: &str, status: &CircuitBreakerState) -> String {
    let icon = match status.state {
        CircuitState::Closed => "🟢",
        CircuitState::HalfOpen => "🟡",
        CircuitState::Open => "🔴",
    };
    let last_failure = status
        .last_failure_time_ms
        .map(format_timestamp)
        .unwrap_or_else(|| messages::NEVER.to_string());
    messages::circuit_line(
        icon,
        key,
        status.state.as_str(),
        status.failure_count,
        &last_failure,
    )
}

pub fn format_timestamp(ms: u64) -> String {
    i64::try_from(ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ms.to_string())
}

/// All statuses as a JSON object keyed by endpoint.
pub fn render_json(registry: &CircuitBreakerRegistry) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&registry.get_all_circuit_statuses())
}
