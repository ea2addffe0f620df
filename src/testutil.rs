//! Shared helpers for in-crate tests.

use std::sync::Arc;

use crate::catalog::Database;
use crate::config::{
    Config, LinkConfig, RecommendationConfig, ServerConfig, SessionConfig, StorageConfig,
};
use crate::link_store::MemoryStore;
use crate::AppState;

/// AppState over a temp-dir catalog with in-memory link and session stores.
/// The session store is returned so tests can log users in.
pub fn test_state(temp_dir: &tempfile::TempDir) -> (Arc<AppState>, Arc<MemoryStore>) {
    let sessions = Arc::new(MemoryStore::new());
    let state = test_state_with_stores(temp_dir, Arc::new(MemoryStore::new()), sessions.clone());
    (state, sessions)
}

pub fn test_state_with_stores(
    temp_dir: &tempfile::TempDir,
    links: Arc<MemoryStore>,
    sessions: Arc<MemoryStore>,
) -> Arc<AppState> {
    let data_dir = temp_dir.path().join("data");
    let media_root = temp_dir.path().join("media");
    std::fs::create_dir_all(&media_root).expect("Failed to create media root");

    let config = Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            public_base_url: "http://media.test".to_string(),
        },
        storage: StorageConfig {
            data_dir: data_dir.to_string_lossy().to_string(),
            media_root: media_root.to_string_lossy().to_string(),
        },
        links: LinkConfig::default(),
        sessions: SessionConfig::default(),
        recommendations: RecommendationConfig::default(),
    };

    let db = Database::open(&data_dir).expect("Failed to open test database");
    Arc::new(AppState::new(config, db, links, sessions))
}
