pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "tasks-service")]
#[command(about = "Per-user task list service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Wait for the database, bootstrap the schema and serve HTTP (default)")]
    Serve {
        #[arg(long, help = "Listen address, e.g. :8000 or 127.0.0.1:8000 (overrides ADDR)")]
        addr: Option<String>,
    },

    #[command(about = "Wait for the database, bootstrap the schema and exit")]
    Migrate,
}

pub async fn run(cli: Cli, mut config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve { addr: None }) {
        Commands::Serve { addr } => {
            if let Some(addr) = addr {
                config.server.listen_addr = addr;
            }
            commands::serve::handle(config).await
        }
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
