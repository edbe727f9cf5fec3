//! Test helper factories and mock state builders
#![allow(dead_code)]

use crate::api::{ServerState, SharedState};
use crate::store::MemoryStore;
use crate::things::Things;
use crate::{AppState, Config, StoreKind};
use std::sync::Arc;

/// Config pointing at an in-memory store on an ephemeral port
pub fn test_config() -> Config {
    Config {
        server_port: 0,
        store_kind: StoreKind::Memory,
        data_dir: "./data".to_string(),
        frontend_path: None,
        sync_delay_ms: 50,
        server_url: "http://localhost:3000".to_string(),
    }
}

/// Create a mock AppState with an empty in-memory store
pub fn mock_app_state() -> AppState {
    AppState::with_store(test_config(), Arc::new(MemoryStore::new()))
}

/// Server state for router tests, without a frontend
pub fn mock_server_state() -> SharedState {
    Arc::new(ServerState {
        things: Things::new(Arc::new(MemoryStore::new())),
        frontend_path: None,
    })
}
