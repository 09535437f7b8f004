//! # Infrastructure Layer
//!
//! Handles interactions with external systems: wall time, transport errors,
//! and the logging backend.
//! Implements the traits defined in the Domain layer (e.g., Clock, Classify).

pub mod clock;
pub mod logging;
pub mod transport;
