//! # Application Layer
//!
//! The resilience core: the per-endpoint breaker registry, the failure
//! classifier, and the retry executor that ties them together.

pub mod classifier;
pub mod executor;
pub mod registry;
