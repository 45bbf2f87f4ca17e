use clap::Parser;
use tasks_service::cli::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("tasks_service=info,tower_http=info")),
        )
        .init();

    let cli = Cli::parse();

    // Read once; components receive their own copies from here on
    let config = tasks_service::config::config().clone();
    tracing::info!("Starting tasks-service in {:?} mode", config.environment);

    tasks_service::cli::run(cli, config).await
}
