//! # Interface Layer
//!
//! Operator-facing entry points over the resilience core's status surface.

pub mod commands;
