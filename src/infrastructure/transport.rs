//! # Transport Error Adapters
//!
//! Turns `reqwest`, `std::io` and `anyhow` failures into the normalized shape
//! the classifier reads. Callers that talk HTTP through reqwest can use
//! `TransportError` directly as their operation's error type.

use std::error::Error as StdError;
use std::io::ErrorKind;

use crate::domain::error::FailureShape;
use crate::domain::traits::Classify;

pub const ECONNRESET: &str = "ECONNRESET";
pub const ECONNREFUSED: &str = "ECONNREFUSED";
pub const ETIMEDOUT: &str = "ETIMEDOUT";
pub const ENOTFOUND: &str = "ENOTFOUND";

/// An HTTP or socket failure, already reduced to message/code/status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(FailureShape);

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(FailureShape::new(message))
    }

    pub fn with_code(self, code: impl Into<String>) -> Self {
        Self(self.0.with_code(code))
    }

    pub fn with_status(self, status: u16) -> Self {
        Self(self.0.with_status(status))
    }

    pub fn message(&self) -> &str {
        &self.0.message
    }

    pub fn code(&self) -> Option<&str> {
        self.0.code.as_deref()
    }

    pub fn http_status(&self) -> Option<u16> {
        self.0.http_status
    }

    pub fn into_shape(self) -> FailureShape {
        self.0
    }

    /// Pass a successful response through; turn anything else into an error
    /// carrying its status and (truncated) body.
    pub async fn from_response(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(200).collect();
        let message = if snippet.is_empty() {
            format!("Request to {} failed with status {}", url, status)
        } else {
            format!("Request to {} failed with status {}: {}", url, status, snippet)
        };
        Err(TransportError::new(message).with_status(status.as_u16()))
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.message)
    }
}

impl StdError for TransportError {}

impl Classify for TransportError {
    fn failure_shape(&self) -> FailureShape {
        self.0.clone()
    }
}

impl From<FailureShape> for TransportError {
    fn from(shape: FailureShape) -> Self {
        Self(shape)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self(err.failure_shape())
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self(err.failure_shape())
    }
}

/// Machine code for the socket-level io kinds the classifier knows about.
pub fn io_kind_code(kind: ErrorKind) -> Option<&'static str> {
    match kind {
        ErrorKind::ConnectionReset => Some(ECONNRESET),
        ErrorKind::ConnectionRefused => Some(ECONNREFUSED),
        ErrorKind::TimedOut => Some(ETIMEDOUT),
        _ => None,
    }
}

impl Classify for std::io::Error {
    fn failure_shape(&self) -> FailureShape {
        let shape = FailureShape::new(self.to_string());
        match io_kind_code(self.kind()) {
            Some(code) => shape.with_code(code),
            None => shape,
        }
    }
}

impl Classify for reqwest::Error {
    fn failure_shape(&self) -> FailureShape {
        let message = error_chain_message(self);
        let mut shape = FailureShape::new(message.clone());

        if let Some(status) = self.status() {
            shape = shape.with_status(status.as_u16());
        }

        if self.is_timeout() {
            return shape.with_code(ETIMEDOUT);
        }

        // The io error (if any) sits a few levels down under hyper.
        let mut cause = self.source();
        while let Some(err) = cause {
            if let Some(io) = err.downcast_ref::<std::io::Error>()
                && let Some(code) = io_kind_code(io.kind())
            {
                return shape.with_code(code);
            }
            cause = err.source();
        }

        if self.is_connect() && message.contains("failed to lookup address") {
            return shape.with_code(ENOTFOUND);
        }
        shape
    }
}

impl Classify for anyhow::Error {
    fn failure_shape(&self) -> FailureShape {
        // First cause with a known shape wins. The message keeps the context.
        let message = format!("{:#}", self);
        for cause in self.chain() {
            if let Some(mut shape) = known_shape(cause) {
                shape.message = message;
                return shape;
            }
        }
        FailureShape::new(message)
    }
}

fn known_shape(err: &(dyn StdError + 'static)) -> Option<FailureShape> {
    if let Some(e) = err.downcast_ref::<TransportError>() {
        return Some(e.failure_shape());
    }
    if let Some(e) = err.downcast_ref::<FailureShape>() {
        return Some(e.failure_shape());
    }
    if let Some(e) = err.downcast_ref::<std::io::Error>() {
        return Some(e.failure_shape());
    }
    if let Some(e) = err.downcast_ref::<reqwest::Error>() {
        return Some(e.failure_shape());
    }
    None
}

/// `Display` of an error followed by each of its sources, colon separated.
fn error_chain_message(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut cause = err.source();
    while let Some(inner) = cause {
        let text = inner.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        cause = inner.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::classifier::DefaultClassifier;
    use crate::domain::traits::ErrorClassifier;
    use anyhow::Context;
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one canned HTTP response on a local port and return its URL.
    async fn serve_once(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        });
        format!("http://{}/messages", addr)
    }

    #[test]
    fn test_io_kinds_map_to_codes() {
        let reset = std::io::Error::new(ErrorKind::ConnectionReset, "reset by peer");
        assert_eq!(reset.failure_shape().code.as_deref(), Some(ECONNRESET));

        let refused = std::io::Error::new(ErrorKind::ConnectionRefused, "refused");
        assert_eq!(refused.failure_shape().code.as_deref(), Some(ECONNREFUSED));

        let timed_out = std::io::Error::new(ErrorKind::TimedOut, "took too long");
        assert_eq!(timed_out.failure_shape().code.as_deref(), Some(ETIMEDOUT));

        let denied = std::io::Error::new(ErrorKind::PermissionDenied, "nope");
        assert_eq!(denied.failure_shape().code, None);
    }

    #[test]
    fn test_transport_error_from_io_keeps_code() {
        let err: TransportError =
            std::io::Error::new(ErrorKind::ConnectionReset, "reset by peer").into();
        assert_eq!(err.code(), Some(ECONNRESET));
        assert_eq!(err.message(), "reset by peer");
    }

    #[test]
    fn test_transport_error_shape() {
        let err = TransportError::new("Bad gateway").with_status(502);
        let shape = err.failure_shape();
        assert_eq!(shape.http_status, Some(502));
        assert_eq!(shape.code, None);
        assert_eq!(err.to_string(), "Bad gateway");
        assert_eq!(TransportError::from(shape.clone()).into_shape(), shape);
    }

    #[test]
    fn test_anyhow_keeps_context_and_io_code() {
        let io = std::io::Error::new(ErrorKind::ConnectionReset, "peer went away");
        let err = Err::<(), _>(io)
            .context("Failed to send message")
            .unwrap_err();
        let shape = err.failure_shape();
        assert!(shape.message.starts_with("Failed to send message"));
        assert!(shape.message.contains("peer went away"));
        assert_eq!(shape.code.as_deref(), Some(ECONNRESET));
    }

    #[test]
    fn test_anyhow_keeps_transport_status() {
        let bare = anyhow::Error::from(TransportError::new("Bad gateway").with_status(503));
        let shape = bare.failure_shape();
        assert_eq!(shape.message, "Bad gateway");
        assert_eq!(shape.http_status, Some(503));

        let wrapped = Err::<(), _>(TransportError::new("reset").with_code(ECONNRESET))
            .context("Failed to join group")
            .unwrap_err();
        let shape = wrapped.failure_shape();
        assert_eq!(shape.message, "Failed to join group: reset");
        assert_eq!(shape.code.as_deref(), Some(ECONNRESET));
        assert!(DefaultClassifier.is_retryable(&shape));
    }

    #[test]
    fn test_anyhow_keeps_failure_shape() {
        let err = anyhow::Error::from(FailureShape::new("slow down").with_status(429))
            .context("Failed to fetch messages");
        let shape = err.failure_shape();
        assert_eq!(shape.http_status, Some(429));
        assert!(shape.message.starts_with("Failed to fetch messages"));
    }

    #[test]
    fn test_anyhow_without_known_cause_is_message_only() {
        let shape = anyhow::anyhow!("Missing Permissions").failure_shape();
        assert_eq!(shape, FailureShape::new("Missing Permissions"));
    }

    #[tokio::test]
    async fn test_from_response_carries_status() {
        let url = serve_once(concat!(
            "HTTP/1.1 503 Service Unavailable\r\n",
            "Content-Length: 4\r\nConnection: close\r\n\r\n",
            "busy",
        ))
        .await;

        let response = reqwest::get(&url).await.unwrap();
        let err = TransportError::from_response(response).await.unwrap_err();
        assert_eq!(err.http_status(), Some(503));
        assert!(err.message().contains("503"));
        assert!(err.message().ends_with("busy"));
        assert!(DefaultClassifier.is_retryable(&err.failure_shape()));
    }

    #[tokio::test]
    async fn test_from_response_passes_success_through() {
        let url = serve_once(concat!(
            "HTTP/1.1 200 OK\r\n",
            "Content-Length: 2\r\nConnection: close\r\n\r\n",
            "ok",
        ))
        .await;

        let response = reqwest::get(&url).await.unwrap();
        let response = TransportError::from_response(response).await.unwrap();
        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn test_client_timeout_is_coded() {
        // Accepts the connection and never answers.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let silent = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();
        let err = client
            .get(format!("http://{}/", addr))
            .send()
            .await
            .unwrap_err();
        assert!(err.is_timeout());

        let err = TransportError::from(err);
        assert_eq!(err.code(), Some(ETIMEDOUT));
        assert!(DefaultClassifier.is_retryable(&err.failure_shape()));
        silent.abort();
    }

    #[tokio::test]
    async fn test_connection_refused_is_coded() {
        // Grab a free port, then close it so the connect is refused.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = reqwest::get(format!("http://127.0.0.1:{}/", port))
            .await
            .unwrap_err();
        let shape = err.failure_shape();
        assert_eq!(shape.code.as_deref(), Some(ECONNREFUSED));
        assert_eq!(shape.http_status, None);
    }
}
