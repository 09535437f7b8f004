//! # Main Entry Point
//!
//! `bulwark` operator CLI:
//! - `probe`: call a URL through the retry executor and report breaker state
//! - `policy`: show the merged policy and backoff schedule for an endpoint
//! - `classify`: show how a failure would be classified

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bulwark::interface::commands::circuits;
use bulwark::{
    AppConfig, BreakerSettings, CircuitBreakerRegistry, DEFAULT_ENDPOINT, DefaultClassifier,
    ErrorClassifier, FailureShape, PolicyOverrides, RetryExecutor, TransportError,
};

#[derive(Parser, Debug)]
#[command(name = "bulwark", version, about = "Retry and circuit-breaking for remote calls")]
struct Cli {
    /// Config file (defaults to data/config.yaml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// GET a URL through the executor, then print the breaker status
    Probe {
        url: String,
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
        /// Number of consecutive calls to make
        #[arg(long, default_value_t = 1)]
        calls: u32,
        /// Per-request timeout enforced by the HTTP client
        #[arg(long, default_value_t = 10_000)]
        timeout_ms: u64,
        #[arg(long)]
        max_retries: Option<u32>,
        #[arg(long)]
        json: bool,
    },
    /// Print the merged policy for an endpoint
    Policy {
        #[arg(long, default_value = DEFAULT_ENDPOINT)]
        endpoint: String,
    },
    /// Classify a failure as retryable or terminal
    Classify {
        message: String,
        #[arg(long)]
        status: Option<u16>,
        #[arg(long)]
        code: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Load Configuration
    let config = match cli.config.clone().or_else(AppConfig::locate) {
        Some(path) => AppConfig::load(&path)?,
        None => AppConfig::default(),
    };

    // 2. Logging Setup
    let _guard = bulwark::infrastructure::logging::init(&config.logging)?;

    match cli.command {
        Command::Probe {
            url,
            endpoint,
            calls,
            timeout_ms,
            max_retries,
            json,
        } => probe(&config, &url, &endpoint, calls, timeout_ms, max_retries, json).await,
        Command::Policy { endpoint } => {
            let policy = config.policy_for(&endpoint);
            println!("{}", serde_json::to_string_pretty(&policy)?);
            println!("delays (ms): {:?}", policy.delay_schedule());
            Ok(())
        }
        Command::Classify {
            message,
            status,
            code,
        } => {
            let failure = FailureShape {
                message,
                code,
                http_status: status,
            };
            let verdict = if DefaultClassifier.is_retryable(&failure) {
                "retryable"
            } else {
                "terminal"
            };
            println!("{}: {}", failure, verdict);
            Ok(())
        }
    }
}

async fn probe(
    config: &AppConfig,
    url: &str,
    endpoint: &str,
    calls: u32,
    timeout_ms: u64,
    max_retries: Option<u32>,
    json: bool,
) -> Result<()> {
    let settings = BreakerSettings::from(&config.default_policy());
    let registry = Arc::new(CircuitBreakerRegistry::with_settings(settings));
    let executor = RetryExecutor::from_config(config, registry.clone());

    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .context("Failed to build HTTP client")?;

    let mut overrides = PolicyOverrides::new();
    overrides.max_retries = max_retries;

    tracing::info!("Probing {} as '{}' ({} call(s))", url, endpoint, calls);

    for call in 1..=calls {
        let result = executor
            .execute_with_retry(
                || {
                    let client = client.clone();
                    async move {
                        let response = client.get(url).send().await?;
                        let response = TransportError::from_response(response).await?;
                        Ok::<_, TransportError>(response.status().as_u16())
                    }
                },
                &overrides,
                endpoint,
            )
            .await;

        match result {
            Ok(status) => println!("call {}: ok ({})", call, status),
            Err(e) => println!("call {}: failed after {} attempt(s): {}", call, e.attempts(), e),
        }
    }

    if json {
        println!("{}", circuits::render_json(&registry)?);
    } else {
        println!("{}", circuits::handle_list(&registry));
    }
    Ok(())
}
