//! # bulwark
//!
//! Resilient remote-call execution for bots that lean on third-party chat
//! platforms and AI providers: bounded retry with exponential backoff, plus a
//! circuit breaker per logical endpoint so one failing dependency can't drag
//! every caller down with it.
//!
//! ```rust,no_run
//! use bulwark::{CircuitBreakerRegistry, PolicyOverrides, RetryExecutor, TransportError};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let executor = RetryExecutor::new(Arc::new(CircuitBreakerRegistry::new()));
//! let body = executor
//!     .execute_with_retry(
//!         || async {
//!             let resp = reqwest::get("https://example.com/api/messages").await?;
//!             let resp = TransportError::from_response(resp).await?;
//!             Ok::<_, TransportError>(resp.text().await?)
//!         },
//!         &PolicyOverrides::new().max_retries(2),
//!         "fetch-messages",
//!     )
//!     .await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;
pub mod strings;

pub use application::classifier::DefaultClassifier;
pub use application::executor::{DEFAULT_ENDPOINT, RetryExecutor};
pub use application::registry::CircuitBreakerRegistry;
pub use domain::circuit::{BreakerSettings, CircuitBreakerState, CircuitState};
pub use domain::config::AppConfig;
pub use domain::error::{ExecuteError, FailureShape};
pub use domain::policy::{PolicyOverrides, RetryPolicy};
pub use domain::traits::{Classify, Clock, ErrorClassifier};
pub use infrastructure::clock::{ManualClock, SystemClock};
pub use infrastructure::transport::TransportError;
