//! # Errors
//!
//! `FailureShape` is the transport-agnostic view of a failure that the classifier
//! inspects. `ExecuteError` is what `execute_with_retry` rejects with.

use serde::{Deserialize, Serialize};

/// Normalized failure: the three fields classification looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureShape {
    pub message: String,
    pub code: Option<String>,
    pub http_status: Option<u16>,
}

impl FailureShape {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.http_status = Some(status);
        self
    }
}

impl std::fmt::Display for FailureShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code {})", code)?;
        }
        if let Some(status) = self.http_status {
            write!(f, " (status {})", status)?;
        }
        Ok(())
    }
}

impl std::error::Error for FailureShape {}

/// Rejection from the retry executor.
#[derive(Debug)]
pub enum ExecuteError<E> {
    /// The endpoint's breaker is open; the operation was not invoked.
    CircuitOpen {
        endpoint: String,
        retry_after_ms: u64,
    },
    /// The operation failed with a non-retryable error.
    Terminal { attempts: u32, source: E },
    /// Every allowed attempt failed with a retryable error; `source` is the last one.
    Exhausted { attempts: u32, source: E },
}

impl<E> ExecuteError<E> {
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, ExecuteError::CircuitOpen { .. })
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecuteError::Terminal { .. })
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self, ExecuteError::Exhausted { .. })
    }

    /// Number of times the operation was invoked before this error.
    pub fn attempts(&self) -> u32 {
        match self {
            ExecuteError::CircuitOpen { .. } => 0,
            ExecuteError::Terminal { attempts, .. } | ExecuteError::Exhausted { attempts, .. } => {
                *attempts
            }
        }
    }

    /// The operation's own error, unchanged.
    pub fn source_error(&self) -> Option<&E> {
        match self {
            ExecuteError::CircuitOpen { .. } => None,
            ExecuteError::Terminal { source, .. } | ExecuteError::Exhausted { source, .. } => {
                Some(source)
            }
        }
    }

    pub fn into_source(self) -> Option<E> {
        match self {
            ExecuteError::CircuitOpen { .. } => None,
            ExecuteError::Terminal { source, .. } | ExecuteError::Exhausted { source, .. } => {
                Some(source)
            }
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for ExecuteError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecuteError::CircuitOpen {
                endpoint,
                retry_after_ms,
            } => write!(
                f,
                "Circuit breaker is open for '{}', retry in {}ms",
                endpoint, retry_after_ms
            ),
            ExecuteError::Terminal { source, .. } | ExecuteError::Exhausted { source, .. } => {
                write!(f, "{}", source)
            }
        }
    }
}

impl<E> std::error::Error for ExecuteError<E>
where
    E: std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source_error().map(|e| e as &(dyn std::error::Error + 'static))
    }
}
