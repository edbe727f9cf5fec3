//! TylerNote - Main Server
//!
//! Serves the notebook API (and optionally the built frontend).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tylernote::{Config, StoreKind};

#[derive(Parser)]
#[command(name = "tylernote")]
#[command(about = "TylerNote notebook server")]
struct Cli {
    /// Path to a YAML config file (default: ./config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Port to listen on (overrides config.yaml and PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory holding the JSON collections
        #[arg(long)]
        data_dir: Option<String>,

        /// Keep everything in memory (nothing is written to disk)
        #[arg(long)]
        memory: bool,

        /// Path to the frontend dist/ directory
        #[arg(long)]
        frontend_path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tylernote=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            port,
            data_dir,
            memory,
            frontend_path,
        } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(dir) = data_dir {
                config.data_dir = dir;
                config.store_kind = StoreKind::File;
            }
            if memory {
                config.store_kind = StoreKind::Memory;
            }
            if let Some(path) = frontend_path {
                config.frontend_path = Some(path);
            }
            tylernote::start_server(config).await
        }
    }
}
