//! error-assistant - CLI entry point.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::Parser;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

use error_assistant::{AnalyzerClient, Config, PreparedRequest, RawConfig};

/// Ask an LLM backend to diagnose an application failure.
///
/// Configuration comes from ERROR_ASSISTANT_* environment variables; flags
/// override them.
#[derive(Parser, Debug)]
#[command(name = "error-assistant")]
#[command(version)]
struct Cli {
    /// Exception message to diagnose
    message: String,

    /// Stack frame (repeat for each frame, outermost last)
    #[arg(long = "frame", value_name = "FRAME")]
    frames: Vec<String>,

    /// Read stack frames from a file, one per line ("-" for stdin)
    #[arg(long, value_name = "PATH", conflicts_with = "frames")]
    stack_file: Option<PathBuf>,

    /// Backend URL
    #[arg(long)]
    api_url: Option<String>,

    /// Provider mode: generic or anthropic_messages
    #[arg(long)]
    provider: Option<String>,

    /// Model name (required for anthropic_messages)
    #[arg(long)]
    model: Option<String>,

    /// Maximum tokens for anthropic_messages
    #[arg(long)]
    max_tokens: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<String>,

    /// Connect and read timeout in seconds
    #[arg(long)]
    timeout: Option<String>,

    /// Name of the environment variable holding the API key
    #[arg(long)]
    api_key_env: Option<String>,

    /// Auth mode: none, x_api_key, bearer, ocp_apim_subscription_key
    #[arg(long)]
    auth_mode: Option<String>,

    /// Override the auth header name
    #[arg(long)]
    auth_header: Option<String>,

    /// Prefix for bearer tokens
    #[arg(long)]
    auth_prefix: Option<String>,

    /// Extra header as NAME=VALUE (repeatable, applied last)
    #[arg(long = "header", value_name = "NAME=VALUE")]
    headers: Vec<String>,

    /// Prompt mode: default, site_template, backend_profile
    #[arg(long)]
    prompt_mode: Option<String>,

    /// File holding the site prompt template
    #[arg(long, value_name = "PATH")]
    template_file: Option<PathBuf>,

    /// Backend profile id (generic provider, backend_profile mode)
    #[arg(long)]
    profile: Option<String>,

    /// Print the request that would be sent, without sending it
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let app_stack = read_stack(&cli)?;
    let raw = apply_overrides(RawConfig::from_env(), &cli)?;
    let client = AnalyzerClient::new(Config::from_raw(raw));

    if cli.dry_run {
        match client.prepare(&cli.message, &app_stack)? {
            Some(request) => print_request(&request)?,
            None => println!("No request would be sent (missing API URL or model)."),
        }
        return Ok(ExitCode::SUCCESS);
    }

    match client.analyze(&cli.message, &app_stack).await {
        Some(suggestion) => {
            println!("{}", suggestion);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("No suggestion available");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Collect stack frames from flags, a file, or stdin.
fn read_stack(cli: &Cli) -> Result<Vec<String>> {
    let Some(path) = &cli.stack_file else {
        return Ok(cli.frames.clone());
    };

    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stack from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read stack file {}", path.display()))?
    };

    Ok(content
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Layer CLI flags over the environment configuration.
fn apply_overrides(mut raw: RawConfig, cli: &Cli) -> Result<RawConfig> {
    fn set(target: &mut Option<String>, value: &Option<String>) {
        if value.is_some() {
            target.clone_from(value);
        }
    }
    fn set_value(target: &mut Option<Value>, value: &Option<String>) {
        if let Some(v) = value {
            *target = Some(Value::String(v.clone()));
        }
    }

    set(&mut raw.api_url, &cli.api_url);
    set(&mut raw.provider_mode, &cli.provider);
    set(&mut raw.model, &cli.model);
    set_value(&mut raw.max_tokens, &cli.max_tokens);
    set_value(&mut raw.temperature, &cli.temperature);
    set_value(&mut raw.timeout_seconds, &cli.timeout);
    set(&mut raw.api_key_env, &cli.api_key_env);
    set(&mut raw.auth_mode, &cli.auth_mode);
    set(&mut raw.auth_header_name, &cli.auth_header);
    set(&mut raw.auth_prefix, &cli.auth_prefix);
    set(&mut raw.prompt_mode, &cli.prompt_mode);
    set(&mut raw.backend_profile, &cli.profile);

    if let Some(path) = &cli.template_file {
        let template = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template file {}", path.display()))?;
        raw.prompt_template = Some(template);
    }

    if !cli.headers.is_empty() {
        let mut headers = match raw.extra_headers.take() {
            Some(Value::Object(map)) => map,
            _ => Map::new(),
        };
        for header in &cli.headers {
            let Some((name, value)) = header.split_once('=') else {
                bail!("Invalid header '{}', expected NAME=VALUE", header);
            };
            headers.insert(name.trim().to_string(), Value::String(value.trim().to_string()));
        }
        raw.extra_headers = Some(Value::Object(headers));
    }

    Ok(raw)
}

/// Print a prepared request with sensitive header values redacted.
fn print_request(request: &PreparedRequest) -> Result<()> {
    println!("POST {}", request.url);
    for (name, value) in &request.headers {
        let shown = if value.is_sensitive() {
            "[redacted]"
        } else {
            value.to_str().unwrap_or("[non-ascii]")
        };
        println!("{}: {}", name, shown);
    }
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&request.payload).context("Failed to render payload")?
    );
    Ok(())
}
