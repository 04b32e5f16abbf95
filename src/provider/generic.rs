//! Generic `{question, context}` JSON API.

use reqwest::Url;
use serde_json::{Map, Value, json};

use super::{PayloadInput, ProviderAdapter, first_answer_field, parse_api_url};
use crate::config::{PromptMode, ProviderMode};
use crate::error::AnalyzerError;

/// Adapter for backends that take a question plus structured context.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenericAdapter;

impl ProviderAdapter for GenericAdapter {
    fn mode(&self) -> ProviderMode {
        ProviderMode::Generic
    }

    fn request_url(&self, api_url: &str) -> Result<Url, AnalyzerError> {
        parse_api_url(api_url)
    }

    fn build_payload(&self, input: PayloadInput<'_>) -> Value {
        let config = input.config;
        let mut payload = Map::new();
        payload.insert("question".to_string(), json!(input.prompt));
        payload.insert(
            "context".to_string(),
            json!({
                "exception_message": input.exception_message,
                "application_stack": input.app_stack,
            }),
        );

        if let Some(model) = &config.model {
            payload.insert("model".to_string(), json!(model));
        }

        if config.prompt_mode == PromptMode::BackendProfile
            && let Some(profile) = &config.backend_profile
        {
            payload.insert("profile_id".to_string(), json!(profile));
            if !config.backend_context.is_empty() {
                payload.insert(
                    "backend_context".to_string(),
                    Value::Object(config.backend_context.clone()),
                );
            }
        }

        Value::Object(payload)
    }

    fn extract_answer(&self, response: &Map<String, Value>) -> Option<String> {
        first_answer_field(response)
    }
}
