//! Analysis pipeline: validate, prompt, shape, authenticate, transmit,
//! interpret, extract, normalize.
//!
//! Every stage can end the call early with `Ok(None)`. Failures are
//! `AnalyzerError`s that [`AnalyzerClient::analyze`] logs and turns into `None`.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::auth::{EnvSecretResolver, SecretResolver, headers_for};
use crate::config::Config;
use crate::error::AnalyzerError;
use crate::prompt::build_prompt;
use crate::provider::{PayloadInput, ProviderAdapter, adapter_for};
use crate::transport::{HttpTransport, ReqwestTransport};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A fully shaped request, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub url: String,
    pub headers: HeaderMap,
    pub payload: Value,
}

/// Sends an exception to the configured backend and returns its diagnosis.
pub struct AnalyzerClient<T = ReqwestTransport, S = EnvSecretResolver> {
    config: Config,
    transport: T,
    secrets: S,
}

impl AnalyzerClient {
    /// Client using reqwest and environment-variable secrets.
    pub fn new(config: Config) -> Self {
        Self::with_parts(config, ReqwestTransport, EnvSecretResolver)
    }
}

impl<T: HttpTransport, S: SecretResolver> AnalyzerClient<T, S> {
    pub fn with_parts(config: Config, transport: T, secrets: S) -> Self {
        Self {
            config,
            transport,
            secrets,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Analyze one failure. Returns `None` when analysis is skipped, fails,
    /// or yields no usable text.
    pub async fn analyze(&self, exception_message: &str, app_stack: &[String]) -> Option<String> {
        match self.try_analyze(exception_message, app_stack).await {
            Ok(answer) => answer,
            Err(e) => {
                warn!("Error analysis failed: {}", e);
                None
            }
        }
    }

    /// Like [`analyze`](Self::analyze) but surfaces failures.
    pub async fn try_analyze(
        &self,
        exception_message: &str,
        app_stack: &[String],
    ) -> Result<Option<String>, AnalyzerError> {
        let Some(request) = self.prepare(exception_message, app_stack)? else {
            return Ok(None);
        };

        let response = self
            .transport
            .post_json(
                &request.url,
                &request.headers,
                &request.payload,
                self.config.timeout,
            )
            .await?;

        if !response.is_success() {
            debug!("Backend returned HTTP {}, no suggestion", response.status);
            return Ok(None);
        }

        let parsed = parse_response_body(&response.body);
        let answer = self.adapter().extract_answer(&parsed);
        if answer.is_none() {
            debug!("No answer field in {} response", self.config.provider);
        }

        Ok(normalize_response(answer.as_deref()))
    }

    /// Run the stages before transmission. `Ok(None)` means the configuration
    /// rules out a request.
    pub fn prepare(
        &self,
        exception_message: &str,
        app_stack: &[String],
    ) -> Result<Option<PreparedRequest>, AnalyzerError> {
        let config = &self.config;

        let Some(api_url) = config.api_url.as_deref() else {
            debug!("No API URL configured, skipping analysis");
            return Ok(None);
        };

        let adapter = self.adapter();
        if let Some(missing) = adapter.missing_requirement(config) {
            debug!("{} provider requires {}, skipping analysis", config.provider, missing);
            return Ok(None);
        }

        let prompt = build_prompt(
            exception_message,
            app_stack,
            config.prompt_mode,
            config.site_template.as_deref(),
        );

        let url = adapter.request_url(api_url)?;
        let payload = adapter.build_payload(PayloadInput {
            prompt: &prompt,
            exception_message,
            app_stack,
            config,
        });

        // Later layers replace same-named headers from earlier ones.
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE));
        headers.extend(adapter.default_headers());
        headers.extend(headers_for(config, &self.secrets)?);

        Ok(Some(PreparedRequest {
            url: url.to_string(),
            headers,
            payload,
        }))
    }

    fn adapter(&self) -> &'static dyn ProviderAdapter {
        adapter_for(self.config.provider)
    }
}

/// Parse a response body as a JSON object; anything else is an empty object.
pub fn parse_response_body(body: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            debug!("Response body is JSON but not an object, treating as empty");
            Map::new()
        }
        Err(e) => {
            debug!("Response body is not valid JSON ({}), treating as empty", e);
            Map::new()
        }
    }
}

/// Trim the answer; empty or whitespace-only text is no answer.
pub fn normalize_response(response: Option<&str>) -> Option<String> {
    let text = response?.trim();
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}
