//! Configuration from `ERROR_ASSISTANT_*` environment variables.

use std::env;

use serde_json::Value;
use tracing::warn;

use super::RawConfig;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "ERROR_ASSISTANT_";

impl RawConfig {
    /// Read configuration from the process environment.
    ///
    /// Unset or empty variables stay `None`. `EXTRA_HEADERS` and
    /// `BACKEND_CONTEXT` hold JSON objects; invalid JSON is logged and ignored.
    pub fn from_env() -> Self {
        Self {
            api_url: var("API_URL"),
            provider_mode: var("PROVIDER_MODE"),
            model: var("MODEL"),
            max_tokens: var("MAX_TOKENS").map(Value::String),
            temperature: var("TEMPERATURE").map(Value::String),
            timeout_seconds: var("TIMEOUT_SECONDS").map(Value::String),
            api_key_env: var("API_KEY_ENV"),
            auth_mode: var("AUTH_MODE"),
            auth_header_name: var("AUTH_HEADER_NAME"),
            // Presence matters for the prefix, so an empty value is kept.
            auth_prefix: env::var(format!("{ENV_PREFIX}AUTH_PREFIX")).ok(),
            extra_headers: json_var("EXTRA_HEADERS"),
            prompt_mode: var("PROMPT_MODE"),
            prompt_template: var("PROMPT_TEMPLATE"),
            backend_profile: var("BACKEND_PROFILE"),
            backend_context: json_var("BACKEND_CONTEXT"),
        }
    }
}

fn var(suffix: &str) -> Option<String> {
    match env::var(format!("{ENV_PREFIX}{suffix}")) {
        Ok(v) if !v.is_empty() => Some(v),
        _ => None,
    }
}

fn json_var(suffix: &str) -> Option<Value> {
    let raw = var(suffix)?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => {
            warn!("{}{} must be a JSON object, ignoring it", ENV_PREFIX, suffix);
            None
        }
        Err(e) => {
            warn!("Invalid JSON in {}{}: {}, ignoring it", ENV_PREFIX, suffix, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use serial_test::serial;

    use super::*;

    #[test]
    #[serial]
    fn test_from_env_reads_prefixed_variables() {
        temp_env::with_vars(
            [
                ("ERROR_ASSISTANT_API_URL", Some("https://llm.example.com/ask")),
                ("ERROR_ASSISTANT_MAX_TOKENS", Some("512")),
                ("ERROR_ASSISTANT_AUTH_MODE", Some("bearer")),
                ("ERROR_ASSISTANT_EXTRA_HEADERS", Some(r#"{"X-Team": "core"}"#)),
            ],
            || {
                let raw = RawConfig::from_env();
                assert_eq!(raw.api_url.as_deref(), Some("https://llm.example.com/ask"));
                assert_eq!(raw.max_tokens, Some(json!("512")));
                assert_eq!(raw.auth_mode.as_deref(), Some("bearer"));
                assert_eq!(raw.extra_headers, Some(json!({"X-Team": "core"})));
            },
        );
    }

    #[test]
    #[serial]
    fn test_from_env_empty_values_are_unset() {
        temp_env::with_vars(
            [
                ("ERROR_ASSISTANT_API_URL", Some("")),
                ("ERROR_ASSISTANT_MODEL", None),
            ],
            || {
                let raw = RawConfig::from_env();
                assert!(raw.api_url.is_none());
                assert!(raw.model.is_none());
            },
        );
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_json_is_ignored() {
        temp_env::with_vars(
            [
                ("ERROR_ASSISTANT_EXTRA_HEADERS", Some("{not json")),
                ("ERROR_ASSISTANT_BACKEND_CONTEXT", Some("[1, 2]")),
            ],
            || {
                let raw = RawConfig::from_env();
                assert!(raw.extra_headers.is_none());
                assert!(raw.backend_context.is_none());
            },
        );
    }

    #[test]
    #[serial]
    fn test_from_env_keeps_empty_auth_prefix() {
        temp_env::with_var("ERROR_ASSISTANT_AUTH_PREFIX", Some(""), || {
            let raw = RawConfig::from_env();
            assert_eq!(raw.auth_prefix.as_deref(), Some(""));
        });
    }
}
