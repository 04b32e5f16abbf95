//! error-assistant - Turns a captured application failure into a suggested diagnosis.
//!
//! # Overview
//!
//! An exception message and its stack are turned into a prompt, shaped into
//! the payload a configured LLM backend expects (a generic question/context API
//! or an Anthropic-style Messages API), sent with the configured auth headers,
//! and the answer text is pulled back out of the response.
//!
//! Analysis is best-effort: every failure (missing configuration, network
//! errors, timeouts, non-success statuses, unusable responses) yields `None`.

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod prompt;
pub mod provider;
pub mod transport;

use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::warn;

// Re-export commonly used types
pub use auth::{EnvSecretResolver, SecretResolver, StaticSecrets};
pub use client::{AnalyzerClient, PreparedRequest, normalize_response};
pub use config::{AuthMode, Config, PromptMode, ProviderMode, RawConfig};
pub use error::AnalyzerError;
pub use prompt::build_prompt;
pub use provider::{ProviderAdapter, adapter_for};
pub use transport::{HttpResponse, HttpTransport, ReqwestTransport};

/// Analyze a failure with the given configuration.
///
/// Secrets are read from the environment and the request goes out over reqwest.
pub async fn analyze(
    exception_message: &str,
    app_stack: &[String],
    config: &Config,
) -> Option<String> {
    AnalyzerClient::new(config.clone())
        .analyze(exception_message, app_stack)
        .await
}

/// Synchronous form of [`analyze`].
///
/// Without an ambient tokio runtime the call runs on a private current-thread
/// runtime. Inside a multi-threaded runtime it blocks the calling worker in
/// place. Inside a current-thread runtime it cannot block without stalling
/// that runtime, so it logs a warning and returns `None`.
pub fn analyze_blocking(
    exception_message: &str,
    app_stack: &[String],
    config: &Config,
) -> Option<String> {
    if config.api_url.is_none() {
        return None;
    }

    if let Ok(handle) = Handle::try_current() {
        return match handle.runtime_flavor() {
            RuntimeFlavor::MultiThread => tokio::task::block_in_place(|| {
                handle.block_on(analyze(exception_message, app_stack, config))
            }),
            flavor => {
                warn!("No blocking analysis inside a {:?} runtime", flavor);
                None
            }
        };
    }

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            warn!("Failed to start runtime for error analysis: {}", e);
            return None;
        }
    };

    runtime.block_on(analyze(exception_message, app_stack, config))
}
