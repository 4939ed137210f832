//! # redisform
//!
//! Declarative provisioning of Redis string keys and ACL users.
//!
//! ## Usage
//!
//! ```bash
//! redisform schema
//! redisform --redis-url redis://localhost:6379 ping
//! redisform create redis_string --attrs '{"key":"app:motd","value":"hello"}'
//! redisform read redis_user --state '{"username":"alice"}'
//! redisform import redis_user alice
//! ```
//!
//! Results go to stdout as JSON. Logs and diagnostics go to stderr.

use anyhow::Context;
use clap::Parser;
use redisform_cli::app;
use redisform_cli::cli::Cli;
use redisform_cli::config::{CliConfig, LogFormat};
use redisform_cli::diagnostics::Diagnostic;
use redisform_provider::provider::ProviderConfig;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %format!("{:#}", err), "Command failed");
            eprintln!("{}", Diagnostic::from(&err).to_json());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<serde_json::Value> {
    let config = CliConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?
        .with_overrides(cli.redis_url, cli.log_format);

    init_tracing(config.log_format);

    tracing::debug!(
        "redisform v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    if !cli.command.needs_connection() {
        return Ok(app::schema_json()?);
    }

    let provider = ProviderConfig::configure(config.provider_settings()).await?;
    Ok(app::execute(cli.command, &provider).await?)
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "redisform=info,redisform_cli=info,redisform_provider=info,redisform_shared=info".into()
    });
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries results only
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}
