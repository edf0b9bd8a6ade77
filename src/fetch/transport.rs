use std::future::Future;

use reqwest::Client;
use thiserror::Error;

use crate::config::Config;
use crate::error::Context;

use super::FetchResult;

/// Failure to obtain a response body for one request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out: {0}")]
    Timeout(String),
    #[error("connection failed: {0}")]
    Connect(String),
    /// Non-2xx reply; the body is kept so callers can inspect it.
    #[error("unexpected HTTP status {status}")]
    Status { status: u16, body: String },
    #[error("failed to read response body: {0}")]
    Body(String),
    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout(err.to_string())
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(err.to_string())
        } else {
            TransportError::Other(err.to_string())
        }
    }
}

/// Capability to issue `GET url` and return the raw body.
///
/// Implementations are shared by every in-flight request of a batch, so they
/// must tolerate concurrent calls through `&self`.
pub trait HttpGet: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

/// Pooled reqwest client used for a single batch.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &Config) -> FetchResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Failed to construct chart HTTP client")?;
        Ok(Self { client })
    }
}

impl HttpGet for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<Vec<u8>, TransportError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        Ok(body.to_vec())
    }
}
