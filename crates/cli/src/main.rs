//! `cortado` — serve the brewing journal API and manage its schema.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cortado_core::AppConfig;

#[derive(Parser)]
#[command(name = "cortado")]
#[command(about = "Coffee brewing journal backend")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Host to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PORT)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Database migration management
    Migrate {
        #[command(subcommand)]
        migrate_command: commands::migrate::MigrateCommands,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::from_env()?;

    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            commands::serve::run(config).await
        }
        Commands::Migrate { migrate_command } => {
            commands::migrate::run(config, migrate_command).await
        }
    }
}
