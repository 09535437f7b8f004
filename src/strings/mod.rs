//! # Strings Module
//!
//! Centralizes log lines and operator-facing messages.

pub mod logs;
pub mod messages;
