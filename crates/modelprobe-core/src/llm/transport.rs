//! HTTP transport seam.
//!
//! The prober talks to the network only through [`Transport`], so tests can
//! substitute a scripted implementation.

use super::request::{Method, ProbeRequest};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Status and body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// Failure to obtain any HTTP response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The call exceeded its timeout
    #[error("request timed out")]
    Timeout,

    /// DNS failure, refused or reset connection, TLS error...
    #[error("{0}")]
    Connection(String),
}

/// Sends rendered requests.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Arc<dyn Transport>` for dynamic dispatch).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(
        &self,
        request: &ProbeRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

fn map_reqwest_error(e: reqwest::Error) -> TransportError {
    if e.is_timeout() {
        TransportError::Timeout
    } else {
        // Drop the URL: Gemini carries its key in the query string
        TransportError::Connection(e.without_url().to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &ProbeRequest,
        timeout: Duration,
    ) -> Result<RawResponse, TransportError> {
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let resp = builder
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = resp.status().as_u16();
        let body = resp.text().await.map_err(map_reqwest_error)?;

        Ok(RawResponse { status, body })
    }
}
