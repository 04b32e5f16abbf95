//! Analyzer configuration.
//!
//! Hosts hand over a loosely typed [`RawConfig`]; [`Config::from_raw`] is the
//! single place where blank strings, unknown enum values and unparsable numbers
//! are normalized. Everything downstream works on the validated [`Config`].

pub mod env;
pub mod raw;

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde_json::{Map, Value};
use tracing::warn;

pub use raw::RawConfig;

/// Default `max_tokens` for the Anthropic Messages payload.
pub const DEFAULT_MAX_TOKENS: u32 = 200;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.2;

/// Default timeout for connect and read, in seconds.
pub const DEFAULT_TIMEOUT_SECS: f64 = 3.0;

/// Which wire format the backend speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderMode {
    /// `{question, context}` JSON API.
    #[default]
    Generic,
    /// Anthropic-style Messages API.
    AnthropicMessages,
}

impl ProviderMode {
    /// Parse a configured value. Anything unrecognized is treated as generic.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match normalized(value).as_deref() {
            Some("anthropic_messages") => ProviderMode::AnthropicMessages,
            _ => ProviderMode::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderMode::Generic => "generic",
            ProviderMode::AnthropicMessages => "anthropic_messages",
        }
    }
}

impl fmt::Display for ProviderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the secret is attached to the outbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    None,
    #[default]
    XApiKey,
    Bearer,
    OcpApimSubscriptionKey,
}

impl AuthMode {
    /// Parse a configured value.
    ///
    /// Unknown values behave like `x_api_key`. Authentication then fails at the
    /// backend and the call yields no answer, instead of rejecting the config.
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match normalized(value).as_deref() {
            None | Some("x_api_key") => AuthMode::XApiKey,
            Some("none") => AuthMode::None,
            Some("bearer") => AuthMode::Bearer,
            Some("ocp_apim_subscription_key") => AuthMode::OcpApimSubscriptionKey,
            Some(other) => {
                warn!("Unknown auth mode '{}', using x_api_key", other);
                AuthMode::XApiKey
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMode::None => "none",
            AuthMode::XApiKey => "x_api_key",
            AuthMode::Bearer => "bearer",
            AuthMode::OcpApimSubscriptionKey => "ocp_apim_subscription_key",
        }
    }

    /// Header name used when no override is configured.
    pub fn default_header_name(&self) -> Option<&'static str> {
        match self {
            AuthMode::None => None,
            AuthMode::XApiKey => Some("X-API-Key"),
            AuthMode::Bearer => Some("Authorization"),
            AuthMode::OcpApimSubscriptionKey => Some("Ocp-Apim-Subscription-Key"),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the prompt comes from, and whether the generic payload carries a
/// backend profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PromptMode {
    #[default]
    Default,
    SiteTemplate,
    BackendProfile,
}

impl PromptMode {
    pub fn parse_lenient(value: Option<&str>) -> Self {
        match normalized(value).as_deref() {
            Some("site_template") => PromptMode::SiteTemplate,
            Some("backend_profile") => PromptMode::BackendProfile,
            _ => PromptMode::Default,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptMode::Default => "default",
            PromptMode::SiteTemplate => "site_template",
            PromptMode::BackendProfile => "backend_profile",
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated, immutable analyzer configuration.
///
/// Optional string fields are `None` when the configured value was missing or
/// blank; present values keep their original text.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_url: Option<String>,
    pub provider: ProviderMode,
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    pub timeout: Duration,
    /// Name of the secret to look up, not the secret itself.
    pub api_key_env: Option<String>,
    pub auth_mode: AuthMode,
    pub auth_header_name: Option<String>,
    /// Only used in bearer mode. `None` means `"Bearer "`; an empty string is honoured.
    pub auth_prefix: Option<String>,
    pub extra_headers: BTreeMap<String, String>,
    pub prompt_mode: PromptMode,
    pub site_template: Option<String>,
    pub backend_profile: Option<String>,
    pub backend_context: Map<String, Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            provider: ProviderMode::default(),
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
            api_key_env: None,
            auth_mode: AuthMode::default(),
            auth_header_name: None,
            auth_prefix: None,
            extra_headers: BTreeMap::new(),
            prompt_mode: PromptMode::default(),
            site_template: None,
            backend_profile: None,
            backend_context: Map::new(),
        }
    }
}

impl Config {
    /// Normalize a raw configuration bag. Never fails.
    pub fn from_raw(raw: RawConfig) -> Self {
        let max_tokens = raw::coerce_u32(raw.max_tokens.as_ref()).unwrap_or_else(|| {
            warn_fallback("max_tokens", raw.max_tokens.as_ref(), DEFAULT_MAX_TOKENS);
            DEFAULT_MAX_TOKENS
        });
        let temperature = raw::coerce_f64(raw.temperature.as_ref()).unwrap_or_else(|| {
            warn_fallback("temperature", raw.temperature.as_ref(), DEFAULT_TEMPERATURE);
            DEFAULT_TEMPERATURE
        });
        let timeout_secs = raw::coerce_f64(raw.timeout_seconds.as_ref())
            .filter(|secs| *secs > 0.0)
            .unwrap_or_else(|| {
                warn_fallback(
                    "timeout_seconds",
                    raw.timeout_seconds.as_ref(),
                    DEFAULT_TIMEOUT_SECS,
                );
                DEFAULT_TIMEOUT_SECS
            });

        Self {
            api_url: non_blank(raw.api_url),
            provider: ProviderMode::parse_lenient(raw.provider_mode.as_deref()),
            model: non_blank(raw.model),
            max_tokens,
            temperature,
            timeout: Duration::try_from_secs_f64(timeout_secs)
                .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS)),
            api_key_env: non_blank(raw.api_key_env),
            auth_mode: AuthMode::parse_lenient(raw.auth_mode.as_deref()),
            auth_header_name: non_blank(raw.auth_header_name),
            auth_prefix: raw.auth_prefix,
            extra_headers: raw::stringify_headers(raw.extra_headers),
            prompt_mode: PromptMode::parse_lenient(raw.prompt_mode.as_deref()),
            site_template: non_blank(raw.prompt_template),
            backend_profile: non_blank(raw.backend_profile),
            backend_context: match raw.backend_context {
                Some(Value::Object(map)) => map,
                _ => Map::new(),
            },
        }
    }

    #[must_use]
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = non_blank(Some(url.into()));
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: ProviderMode) -> Self {
        self.provider = provider;
        self
    }

    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = non_blank(Some(model.into()));
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_api_key_env(mut self, name: impl Into<String>) -> Self {
        self.api_key_env = non_blank(Some(name.into()));
        self
    }

    #[must_use]
    pub fn with_auth_mode(mut self, mode: AuthMode) -> Self {
        self.auth_mode = mode;
        self
    }

    #[must_use]
    pub fn with_auth_header_name(mut self, name: impl Into<String>) -> Self {
        self.auth_header_name = non_blank(Some(name.into()));
        self
    }

    #[must_use]
    pub fn with_auth_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.auth_prefix = Some(prefix.into());
        self
    }

    #[must_use]
    pub fn with_extra_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_prompt_mode(mut self, mode: PromptMode) -> Self {
        self.prompt_mode = mode;
        self
    }

    #[must_use]
    pub fn with_site_template(mut self, template: impl Into<String>) -> Self {
        self.site_template = non_blank(Some(template.into()));
        self
    }

    #[must_use]
    pub fn with_backend_profile(mut self, profile: impl Into<String>) -> Self {
        self.backend_profile = non_blank(Some(profile.into()));
        self
    }

    #[must_use]
    pub fn with_backend_context(mut self, context: Map<String, Value>) -> Self {
        self.backend_context = context;
        self
    }
}

impl From<RawConfig> for Config {
    fn from(raw: RawConfig) -> Self {
        Config::from_raw(raw)
    }
}

/// `None` for missing or whitespace-only values, otherwise the value untouched.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty())
}

fn warn_fallback<D: fmt::Display>(field: &str, value: Option<&Value>, default: D) {
    // Absent values fall back silently.
    if let Some(value) = value.filter(|v| !v.is_null()) {
        warn!("Invalid {} value {}, using default {}", field, value, default);
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.api_url, None);
        assert_eq!(config.provider, ProviderMode::Generic);
        assert_eq!(config.max_tokens, 200);
        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.auth_mode, AuthMode::XApiKey);
        assert_eq!(config.prompt_mode, PromptMode::Default);
    }

    #[test]
    fn test_from_raw_empty_matches_default() {
        assert_eq!(Config::from_raw(RawConfig::default()), Config::default());
    }

    #[test]
    fn test_invalid_numeric_values_fall_back_to_defaults() {
        let raw = RawConfig {
            max_tokens: Some(json!("invalid")),
            temperature: Some(json!("not_a_number")),
            timeout_seconds: Some(Value::Null),
            ..RawConfig::default()
        };

        let config = Config::from_raw(raw);

        assert_eq!(config.max_tokens, DEFAULT_MAX_TOKENS);
        assert_eq!(config.temperature, DEFAULT_TEMPERATURE);
        assert_eq!(config.timeout, Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_numeric_strings_are_parsed() {
        let raw = RawConfig {
            max_tokens: Some(json!("500")),
            temperature: Some(json!("0.7")),
            timeout_seconds: Some(json!("1.5")),
            ..RawConfig::default()
        };

        let config = Config::from_raw(raw);

        assert_eq!(config.max_tokens, 500);
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.timeout, Duration::from_millis(1500));
    }

    #[test]
    fn test_non_positive_timeout_falls_back() {
        let raw = RawConfig {
            timeout_seconds: Some(json!(0)),
            ..RawConfig::default()
        };
        assert_eq!(Config::from_raw(raw).timeout, Duration::from_secs(3));

        let raw = RawConfig {
            timeout_seconds: Some(json!(-2.0)),
            ..RawConfig::default()
        };
        assert_eq!(Config::from_raw(raw).timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_blank_strings_become_none() {
        let raw = RawConfig {
            api_url: Some("   ".to_string()),
            model: Some("".to_string()),
            api_key_env: Some(" ".to_string()),
            prompt_template: Some("\n".to_string()),
            ..RawConfig::default()
        };

        let config = Config::from_raw(raw);

        assert_eq!(config.api_url, None);
        assert_eq!(config.model, None);
        assert_eq!(config.api_key_env, None);
        assert_eq!(config.site_template, None);
    }

    #[test]
    fn test_provider_mode_parsing() {
        assert_eq!(
            ProviderMode::parse_lenient(Some("anthropic_messages")),
            ProviderMode::AnthropicMessages
        );
        assert_eq!(
            ProviderMode::parse_lenient(Some(" Anthropic_Messages ")),
            ProviderMode::AnthropicMessages
        );
        assert_eq!(ProviderMode::parse_lenient(Some("openai")), ProviderMode::Generic);
        assert_eq!(ProviderMode::parse_lenient(None), ProviderMode::Generic);
    }

    #[test]
    fn test_unknown_auth_mode_behaves_like_x_api_key() {
        assert_eq!(AuthMode::parse_lenient(Some("basic")), AuthMode::XApiKey);
        assert_eq!(AuthMode::parse_lenient(None), AuthMode::XApiKey);
        assert_eq!(AuthMode::parse_lenient(Some("none")), AuthMode::None);
        assert_eq!(AuthMode::parse_lenient(Some("bearer")), AuthMode::Bearer);
        assert_eq!(
            AuthMode::parse_lenient(Some("ocp_apim_subscription_key")),
            AuthMode::OcpApimSubscriptionKey
        );
    }

    #[test]
    fn test_prompt_mode_parsing() {
        assert_eq!(
            PromptMode::parse_lenient(Some("site_template")),
            PromptMode::SiteTemplate
        );
        assert_eq!(
            PromptMode::parse_lenient(Some("backend_profile")),
            PromptMode::BackendProfile
        );
        assert_eq!(PromptMode::parse_lenient(Some("fancy")), PromptMode::Default);
    }

    #[test]
    fn test_backend_context_requires_object() {
        let raw = RawConfig {
            backend_context: Some(json!(["not", "an", "object"])),
            ..RawConfig::default()
        };
        assert!(Config::from_raw(raw).backend_context.is_empty());

        let raw = RawConfig {
            backend_context: Some(json!({"team": "platform"})),
            ..RawConfig::default()
        };
        assert_eq!(
            Config::from_raw(raw).backend_context.get("team"),
            Some(&json!("platform"))
        );
    }

    #[test]
    fn test_auth_prefix_empty_string_is_kept() {
        let raw = RawConfig {
            auth_prefix: Some(String::new()),
            ..RawConfig::default()
        };
        assert_eq!(Config::from_raw(raw).auth_prefix, Some(String::new()));
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::default()
            .with_api_url("https://llm.example.com/ask")
            .with_provider(ProviderMode::AnthropicMessages)
            .with_model("claude-3")
            .with_extra_header("X-Team", "core")
            .with_model("  ");

        assert_eq!(config.api_url.as_deref(), Some("https://llm.example.com/ask"));
        assert_eq!(config.provider, ProviderMode::AnthropicMessages);
        assert_eq!(config.model, None);
        assert_eq!(config.extra_headers.get("X-Team").map(String::as_str), Some("core"));
    }
}
