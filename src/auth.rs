//! Secret lookup and authentication headers.
//!
//! Header resolution:
//! 1. The auth mode picks a header name (overridable) and a value formula
//! 2. No secret, or an empty one, means no auth header
//! 3. Extra headers are applied last and replace same-named headers

use std::collections::{BTreeMap, HashMap};
use std::env;
use std::fmt;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::config::{AuthMode, Config};
use crate::error::AnalyzerError;

/// Prefix used in bearer mode when none is configured.
pub const DEFAULT_BEARER_PREFIX: &str = "Bearer ";

/// Source of secret material, keyed by a configured name.
///
/// This abstraction allows swapping the environment for a test double or
/// another secret store.
#[cfg_attr(test, mockall::automock)]
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, key: &str) -> Option<String>;
}

/// Resolves secrets from process environment variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecretResolver;

impl SecretResolver for EnvSecretResolver {
    fn resolve(&self, key: &str) -> Option<String> {
        env::var(key).ok()
    }
}

/// Fixed in-memory secrets.
#[derive(Clone, Default)]
pub struct StaticSecrets(HashMap<String, String>);

impl StaticSecrets {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }
}

impl SecretResolver for StaticSecrets {
    fn resolve(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }
}

impl fmt::Debug for StaticSecrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// Insert a header whose value is redacted in debug output.
///
/// Names match case-insensitively, so an existing header of the same name
/// is replaced.
pub fn insert_sensitive(
    headers: &mut HeaderMap,
    name: &str,
    value: &str,
) -> Result<(), AnalyzerError> {
    let invalid = || AnalyzerError::InvalidHeader {
        name: name.to_string(),
    };
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| invalid())?;
    let mut header_value = HeaderValue::from_str(value).map_err(|_| invalid())?;
    header_value.set_sensitive(true);
    headers.insert(header_name, header_value);
    Ok(())
}

/// Look up the configured secret. A blank key name means no secret.
pub fn resolve_secret<S: SecretResolver + ?Sized>(
    resolver: &S,
    key_name: Option<&str>,
) -> Option<String> {
    let key_name = key_name.filter(|k| !k.trim().is_empty())?;
    resolver.resolve(key_name).filter(|s| !s.is_empty())
}

/// Build the auth header for `mode` followed by the extra headers.
///
/// Fails with [`AnalyzerError::InvalidHeader`] when a name or value cannot be
/// sent over HTTP.
pub fn auth_headers(
    mode: AuthMode,
    header_name: Option<&str>,
    prefix: Option<&str>,
    secret: Option<&str>,
    extra_headers: &BTreeMap<String, String>,
) -> Result<HeaderMap, AnalyzerError> {
    let mut headers = HeaderMap::new();

    if let (Some(default_name), Some(secret)) = (mode.default_header_name(), secret)
        && !secret.is_empty()
    {
        let name = header_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(default_name);
        let value = match mode {
            AuthMode::Bearer => {
                format!("{}{}", prefix.unwrap_or(DEFAULT_BEARER_PREFIX), secret)
            }
            _ => secret.to_string(),
        };
        insert_sensitive(&mut headers, name, &value)?;
    }

    for (name, value) in extra_headers {
        insert_sensitive(&mut headers, name, value)?;
    }

    Ok(headers)
}

/// Resolve the secret for `config` and build its auth and extra headers.
pub fn headers_for<S: SecretResolver + ?Sized>(
    config: &Config,
    resolver: &S,
) -> Result<HeaderMap, AnalyzerError> {
    let secret = resolve_secret(resolver, config.api_key_env.as_deref());
    auth_headers(
        config.auth_mode,
        config.auth_header_name.as_deref(),
        config.auth_prefix.as_deref(),
        secret.as_deref(),
        &config.extra_headers,
    )
}
