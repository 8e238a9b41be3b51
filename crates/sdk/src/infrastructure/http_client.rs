//! reqwest-backed [`HttpTransport`]

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};
use url::Url;

use crate::config::DEFAULT_REQUEST_TIMEOUT_SECS;
use crate::ports::outbound::{HttpTransport, TransportError};

const JSON: &str = "application/json";

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to build HTTP client, using defaults");
                Client::new()
            });
        Self { client }
    }

    /// Wrap an existing client, e.g. one sharing a connection pool with the host.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn send(
        &self,
        method: &'static str,
        url: &Url,
        request: RequestBuilder,
    ) -> Result<Vec<u8>, TransportError> {
        let response = request
            .header(ACCEPT, JSON)
            .send()
            .await
            .map_err(TransportError::request)?;

        let status = response.status();
        let body = response.bytes().await.map_err(TransportError::request)?;
        tracing::trace!(
            method,
            url = %url,
            status = status.as_u16(),
            body = %String::from_utf8_lossy(&body),
            "HTTP response"
        );

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body.to_vec())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<Vec<u8>, TransportError> {
        tracing::trace!(url = %url, "HTTP GET");
        self.send("GET", url, self.client.get(url.clone())).await
    }

    async fn post(&self, url: &Url, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        tracing::trace!(url = %url, body = %String::from_utf8_lossy(&body), "HTTP POST");
        let request = self
            .client
            .post(url.clone())
            .header(CONTENT_TYPE, JSON)
            .body(body);
        self.send("POST", url, request).await
    }
}
