use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ipecho::cli::Cli;
use ipecho::config::ServiceConfig;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ipecho=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "fatal");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> ipecho::Result<()> {
    let config = ServiceConfig::from_cli(cli)?;

    tracing::info!(
        listen = %config.listen,
        policy = ?config.policy,
        trusted_proxies = ?config.trusted_proxies,
        "Configuration loaded"
    );

    ipecho::server::serve(config.listen, config.resolver()).await
}
