//! # Command Handlers
//!
//! Operator commands over the circuit breaker status surface. `dispatch` is the
//! entry point a chat bot's router hands raw messages to.

pub mod circuits;

use crate::application::registry::CircuitBreakerRegistry;

/// Route a raw message. Returns the reply for circuit commands, `None` for
/// anything else so the caller can keep routing.
pub fn dispatch(registry: &CircuitBreakerRegistry, message: &str) -> Option<String> {
    let msg = message.trim();
    let (cmd, args) = match msg.find(' ') {
        Some(idx) => (&msg[..idx], msg[idx + 1..].trim()),
        None => (msg, ""),
    };

    tracing::debug!("Dispatching cmd='{}' args='{}'", cmd, args);

    match cmd {
        ".circuits" => Some(circuits::handle_list(registry)),
        ".circuit" => Some(circuits::handle_circuit(registry, args)),
        _ => None,
    }
}
