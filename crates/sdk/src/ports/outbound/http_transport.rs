//! HTTP Transport Port - Object-safe network boundary
//!
//! The consent client only needs two primitives: GET a URL and POST a JSON
//! body to a URL, both yielding the raw response body. Everything above
//! bytes (encoding, decoding, error classification) happens in the client.

use url::Url;

/// Failures reported by a transport implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or no response was received
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The server answered without a body
    #[error("Response had no body")]
    EmptyBody,
}

impl TransportError {
    pub fn request(message: impl ToString) -> Self {
        Self::Request(message.to_string())
    }
}

#[async_trait::async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError>;

    /// POST `body` with `Content-Type: application/json`.
    async fn post(&self, url: &Url, body: Vec<u8>) -> Result<Vec<u8>, TransportError>;
}
