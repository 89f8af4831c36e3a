//! resilient-call CLI.
//!
//! ```text
//! resilient-call [--config FILE] probe <URL> [--profile NAME] [--max-retries N] [--base-delay-ms N]
//! resilient-call [--config FILE] profiles
//! ```
//!
//! `probe` issues a GET through the executor and prints a JSON report;
//! Ctrl+C cancels it. `profiles` prints the effective configuration.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use clap::{Parser, Subcommand};
use reqwest::StatusCode;
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

use resilient_call::client::{BackendError, Operation};
use resilient_call::config::{load_config, ResilienceConfig};
use resilient_call::observability::{init_logging, TelemetryObserver};
use resilient_call::resilience::{execute_with_retry_cancellable, ErrorKind};

#[derive(Parser)]
#[command(name = "resilient-call")]
#[command(about = "Call remote endpoints through the resilient call executor", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// GET a URL with retries and print a JSON report
    Probe {
        url: String,

        /// Operation profile to use instead of the default one
        #[arg(long)]
        profile: Option<String>,

        #[arg(long)]
        max_retries: Option<u32>,

        #[arg(long)]
        base_delay_ms: Option<u64>,

        /// Timeout of a single attempt
        #[arg(long, default_value_t = 30)]
        timeout_secs: u64,
    },
    /// Print the effective configuration as JSON
    Profiles,
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    url: String,
    outcome: &'static str,
    attempts: u32,
    status: Option<u16>,
    kind: Option<ErrorKind>,
    message: Option<String>,
    detail: Option<String>,
    elapsed_ms: u128,
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ResilienceConfig::default(),
    };
    init_logging(&config.observability)?;

    match cli.command {
        Commands::Profiles => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Probe {
            url,
            profile,
            max_retries,
            base_delay_ms,
            timeout_secs,
        } => {
            let url = Url::parse(&url)?;
            let operation = profile.as_deref().map(str::parse::<Operation>).transpose()?;

            let mut retry = match operation {
                Some(op) => config.operations.get(op).clone(),
                None => config.default.clone(),
            };
            if let Some(max_retries) = max_retries {
                retry.max_retries = max_retries;
            }
            if let Some(base_delay_ms) = base_delay_ms {
                retry.base_delay_ms = base_delay_ms;
            }
            let policy = retry.to_policy();

            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(timeout_secs))
                .build()?;
            let observer = TelemetryObserver::new(operation.map_or("probe", |op| op.as_str()))
                .with_metrics(config.observability.metrics_enabled);

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::info!("Interrupt received, cancelling probe");
                    on_interrupt.cancel();
                }
            });

            tracing::info!(
                url = %url,
                max_retries = policy.max_retries(),
                base_delay = ?policy.base_delay(),
                "Probing"
            );

            let attempts = AtomicU32::new(0);
            let counter = &attempts;
            let (client, target) = (&client, &url);
            let started = Instant::now();
            let result = execute_with_retry_cancellable(
                move || {
                    counter.fetch_add(1, Ordering::Relaxed);
                    fetch_status(client, target)
                },
                &policy,
                &observer,
                &cancel,
            )
            .await;

            let mut report = ProbeReport {
                url: url.to_string(),
                outcome: "success",
                attempts: attempts.load(Ordering::Relaxed),
                status: None,
                kind: None,
                message: None,
                detail: None,
                elapsed_ms: started.elapsed().as_millis(),
            };
            let code = match result {
                Ok(status) => {
                    report.status = Some(status);
                    ExitCode::SUCCESS
                }
                Err(err) => {
                    let message = err.user_message();
                    report.outcome = "failure";
                    report.kind = Some(err.kind());
                    report.message = Some(message.text().to_string());
                    report.detail = Some(err.to_string());
                    ExitCode::FAILURE
                }
            };

            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(code)
        }
    }
}

/// One GET attempt. Server errors fail the attempt so it is retried.
async fn fetch_status(client: &reqwest::Client, url: &Url) -> Result<u16, BackendError> {
    let response = client.get(url.clone()).send().await.map_err(backend_error)?;
    let status = response.status();

    if status.is_server_error() {
        return Err(BackendError::Rejected {
            status: status.as_u16(),
            message: format!("server responded with {status}"),
        });
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(BackendError::Unauthorized);
    }
    Ok(status.as_u16())
}

fn backend_error(err: reqwest::Error) -> BackendError {
    if err.is_timeout() {
        BackendError::Timeout(err.to_string())
    } else if err.is_connect() || err.is_request() {
        BackendError::Transport(err.to_string())
    } else {
        BackendError::Other(err.to_string())
    }
}
