//! # Domain Layer
//!
//! Core definitions, types, and traits of the resilience layer.
//! Independent of any transport, serving as the contract for the other layers.

pub mod circuit;
pub mod config;
pub mod error;
pub mod policy;
pub mod traits;
