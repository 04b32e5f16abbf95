//! Anthropic-style Messages API.

use reqwest::Url;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value, json};

use super::{PayloadInput, ProviderAdapter, first_answer_field, parse_api_url};
use crate::config::{Config, ProviderMode};
use crate::error::AnalyzerError;

/// Path of the Messages endpoint.
pub const MESSAGES_PATH: &str = "/v1/messages";

/// API version sent in the `anthropic-version` header.
pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Adapter for the Messages API. Requires a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnthropicMessagesAdapter;

impl ProviderAdapter for AnthropicMessagesAdapter {
    fn mode(&self) -> ProviderMode {
        ProviderMode::AnthropicMessages
    }

    fn missing_requirement(&self, config: &Config) -> Option<&'static str> {
        config.model.is_none().then_some("model")
    }

    /// Point the URL at `/v1/messages` unless it already ends there.
    fn request_url(&self, api_url: &str) -> Result<Url, AnalyzerError> {
        let mut url = parse_api_url(api_url)?;

        let path = url.path().to_string();
        if path.is_empty() || path == "/" {
            url.set_path(MESSAGES_PATH);
        } else if !path.ends_with(MESSAGES_PATH) {
            let base = path.strip_suffix('/').unwrap_or(&path);
            url.set_path(&format!("{base}{MESSAGES_PATH}"));
        }

        Ok(url)
    }

    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            HeaderName::from_static("anthropic-version"),
            HeaderValue::from_static(ANTHROPIC_VERSION),
        );
        headers
    }

    fn build_payload(&self, input: PayloadInput<'_>) -> Value {
        let config = input.config;
        json!({
            "model": config.model,
            "max_tokens": config.max_tokens,
            "temperature": config.temperature,
            "messages": [
                {"role": "user", "content": input.prompt}
            ]
        })
    }

    /// Join the `text` blocks of `content`; fall back to the generic fields.
    fn extract_answer(&self, response: &Map<String, Value>) -> Option<String> {
        if let Some(Value::Array(blocks)) = response.get("content") {
            let text = blocks
                .iter()
                .filter_map(Value::as_object)
                .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
                .map(|block| match block.get("text") {
                    Some(Value::String(s)) => s.clone(),
                    None | Some(Value::Null) => String::new(),
                    Some(other) => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join("\n");

            let text = text.trim();
            if !text.is_empty() {
                return Some(text.to_string());
            }
        }

        first_answer_field(response)
    }
}
