//! Error types for error-assistant modules using thiserror.

use std::time::Duration;

use thiserror::Error;

/// Failures inside the analysis pipeline.
///
/// None of these reach the host: [`crate::analyze`] logs them and returns
/// `None`, since a missing suggestion must never take the host down.
#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid API URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("Request to {url} timed out after {}s", timeout.as_secs_f64())]
    Timeout { url: String, timeout: Duration },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read response body: {0}")]
    ReadBody(#[source] reqwest::Error),
}

impl AnalyzerError {
    /// Classify a reqwest send error, separating timeouts from other failures.
    pub fn from_send(url: &str, timeout: Duration, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            AnalyzerError::Timeout {
                url: url.to_string(),
                timeout,
            }
        } else {
            AnalyzerError::Request {
                url: url.to_string(),
                source,
            }
        }
    }
}
