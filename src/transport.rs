//! Outbound HTTP exchange.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use serde_json::Value;
use tracing::debug;

use crate::error::AnalyzerError;

/// Status and body of one HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends one JSON POST and returns the raw response.
///
/// This abstraction allows replacing the network in tests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// POST `payload` to `url`. `timeout` bounds both connecting and reading.
    async fn post_json(
        &self,
        url: &str,
        headers: &HeaderMap,
        payload: &Value,
        timeout: Duration,
    ) -> Result<HttpResponse, AnalyzerError>;
}

/// Transport backed by reqwest.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        headers: &HeaderMap,
        payload: &Value,
        timeout: Duration,
    ) -> Result<HttpResponse, AnalyzerError> {
        // Timeouts are per call, so the client is too.
        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .build()
            .map_err(AnalyzerError::ClientBuild)?;

        debug!("POST {} ({} header(s))", url, headers.len());

        // `json` keeps a Content-Type already present in `headers`.
        let response = client
            .post(url)
            .headers(headers.clone())
            .json(payload)
            .send()
            .await
            .map_err(|e| AnalyzerError::from_send(url, timeout, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                AnalyzerError::Timeout {
                    url: url.to_string(),
                    timeout,
                }
            } else {
                AnalyzerError::ReadBody(e)
            }
        })?;

        Ok(HttpResponse { status, body })
    }
}
