use anyhow::Context;
use clap::Parser;
use olosuashi_cli::{commands, AppState, Cli};
use olosuashi_store::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "olosuashi_cli=info,olosuashi_store=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load().context("Failed to load config")?;
    tracing::debug!("API at {}", config.api.base_url);

    let state = AppState::build(config)?;
    commands::run(cli.command, &state).await
}
