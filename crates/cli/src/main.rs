//! `chunkycloud` binary: terminal front end for the render service.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use chunkycloud_cli::{commands, Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chunkycloud=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = cli.config();
    tracing::debug!(api_url = %config.api_url, "Using render service");

    match cli.command {
        Commands::Job(args) => commands::job::execute(args, &config).await,
        Commands::Stats(args) => commands::stats::execute(args, &config).await,
        Commands::Packs => commands::packs::execute(&config).await,
        Commands::Submit(args) => commands::submit::execute(args, &config).await,
    }
}
