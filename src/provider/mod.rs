//! Provider adapters: request URL, payload shape and answer extraction.
//!
//! Each [`ProviderMode`] maps to one adapter. Adding a backend format means
//! adding one adapter here, nothing in the client changes.

pub mod anthropic;
pub mod generic;

use reqwest::Url;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};

use crate::config::{Config, ProviderMode};
use crate::error::AnalyzerError;

pub use anthropic::AnthropicMessagesAdapter;
pub use generic::GenericAdapter;

/// Response fields checked for an answer, in priority order.
pub const ANSWER_FIELDS: [&str; 4] = ["answer", "suggestion", "output", "text"];

/// Everything an adapter needs to shape one request.
#[derive(Debug, Clone, Copy)]
pub struct PayloadInput<'a> {
    pub prompt: &'a str,
    pub exception_message: &'a str,
    pub app_stack: &'a [String],
    pub config: &'a Config,
}

/// Wire-format knowledge for one backend family.
pub trait ProviderAdapter: Send + Sync {
    fn mode(&self) -> ProviderMode;

    /// Name of a required setting that is missing, if any. A missing
    /// requirement stops the analysis before any network call.
    fn missing_requirement(&self, _config: &Config) -> Option<&'static str> {
        None
    }

    /// Derive the request URL from the configured API URL.
    fn request_url(&self, api_url: &str) -> Result<Url, AnalyzerError>;

    /// Headers the backend expects regardless of auth.
    fn default_headers(&self) -> HeaderMap {
        HeaderMap::new()
    }

    fn build_payload(&self, input: PayloadInput<'_>) -> Value;

    /// Pull the answer out of a parsed response object.
    fn extract_answer(&self, response: &Map<String, Value>) -> Option<String>;
}

static GENERIC: GenericAdapter = GenericAdapter;
static ANTHROPIC_MESSAGES: AnthropicMessagesAdapter = AnthropicMessagesAdapter;

/// The adapter for a provider mode.
pub fn adapter_for(mode: ProviderMode) -> &'static dyn ProviderAdapter {
    match mode {
        ProviderMode::Generic => &GENERIC,
        ProviderMode::AnthropicMessages => &ANTHROPIC_MESSAGES,
    }
}

/// Parse the configured URL, accepting only http and https.
pub(crate) fn parse_api_url(api_url: &str) -> Result<Url, AnalyzerError> {
    let url = Url::parse(api_url.trim()).map_err(|e| AnalyzerError::InvalidUrl {
        url: api_url.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AnalyzerError::InvalidUrl {
            url: api_url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// First field among [`ANSWER_FIELDS`] holding something other than `null`
/// or `false`.
///
/// Other non-string values are rendered as JSON text.
pub fn first_answer_field(response: &Map<String, Value>) -> Option<String> {
    ANSWER_FIELDS
        .iter()
        .filter_map(|field| response.get(*field))
        .find(|value| !matches!(value, Value::Null | Value::Bool(false)))
        .map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
}
