//! TylerNote
//!
//! A personal notebook server with:
//! - Daily plans, todos, buy/reading lists, notes and hobby lists
//! - A JSON document store (in memory or on disk)
//! - An HTTP API plus a typed client
//! - Debounced autosave with a shared sync status for editing screens

pub mod api;
pub mod client;
pub mod editor;
pub mod models;
pub mod store;
pub mod sync;
pub mod things;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use store::{DocumentStore, FileStore, MemoryStore};
use things::Things;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub store: StoreYamlConfig,
    pub sync: SyncYamlConfig,
    pub client: ClientYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
    /// Built frontend to serve next to the API
    pub frontend_path: Option<String>,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            frontend_path: None,
        }
    }
}

/// Which document store backs the server
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    #[default]
    File,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
        }
    }
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" => Ok(Self::File),
            _ => Err(format!("Unknown store kind: {}", s)),
        }
    }
}

/// Store configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreYamlConfig {
    pub kind: StoreKind,
    pub data_dir: String,
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::File,
            data_dir: "./data".into(),
        }
    }
}

/// Autosave configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncYamlConfig {
    pub delay_ms: u64,
}

impl Default for SyncYamlConfig {
    fn default() -> Self {
        Self {
            delay_ms: sync::DEFAULT_DELAY.as_millis() as u64,
        }
    }
}

/// CLI client configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientYamlConfig {
    pub url: String,
}

impl Default for ClientYamlConfig {
    fn default() -> Self {
        Self {
            url: client::DEFAULT_SERVER_URL.into(),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub store_kind: StoreKind,
    pub data_dir: String,
    pub frontend_path: Option<String>,
    pub sync_delay_ms: u64,
    pub server_url: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        // 1. Load YAML config (or defaults if file not found)
        let yaml = Self::load_yaml(yaml_path);

        // 2. Build Config with env var overrides
        let store_kind = match std::env::var("TYLERNOTE_STORE") {
            Ok(raw) => raw.parse::<StoreKind>().map_err(anyhow::Error::msg)?,
            Err(_) => yaml.store.kind,
        };

        Ok(Self {
            server_port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.server.port),
            store_kind,
            data_dir: std::env::var("TYLERNOTE_DATA_DIR").unwrap_or(yaml.store.data_dir),
            frontend_path: std::env::var("TYLERNOTE_FRONTEND_PATH")
                .ok()
                .or(yaml.server.frontend_path)
                .filter(|p| !p.is_empty()),
            sync_delay_ms: std::env::var("TYLERNOTE_SYNC_DELAY_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.sync.delay_ms),
            server_url: std::env::var("TYLERNOTE_URL").unwrap_or(yaml.client.url),
        })
    }

    pub fn sync_delay(&self) -> Duration {
        Duration::from_millis(self.sync_delay_ms)
    }

    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn DocumentStore>,
    pub things: Things,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match config.store_kind {
            StoreKind::Memory => {
                tracing::warn!("Using in-memory store, data will not be persisted");
                Arc::new(MemoryStore::new())
            }
            StoreKind::File => Arc::new(
                FileStore::open(&config.data_dir)
                    .with_context(|| format!("Failed to open data dir {}", config.data_dir))?,
            ),
        };
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            things: Things::new(store.clone()),
            store,
            config: Arc::new(config),
        }
    }
}

// ============================================================================
// Server
// ============================================================================

/// Build the router for `state` and serve it on an already bound listener
/// until `shutdown` is cancelled.
pub async fn serve(listener: TcpListener, state: AppState, shutdown: CancellationToken) -> Result<()> {
    let server_state = Arc::new(api::ServerState {
        things: state.things.clone(),
        frontend_path: state.config.frontend_path.clone(),
    });
    let app = api::create_router(server_state);

    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    tracing::info!("Server stopped");
    Ok(())
}

/// Start the HTTP server and run until Ctrl-C.
pub async fn start_server(config: Config) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    tracing::info!(
        store = %config.store_kind,
        data_dir = %config.data_dir,
        "Starting server on {}",
        addr
    );
    let state = AppState::new(config)?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
        }
        trigger.cancel();
    });

    serve(listener, state, shutdown).await
}

// ============================================================================
// Tests
// ============================================================================
