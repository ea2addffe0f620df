mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinkStoreError {
    /// The backing store could not be reached. Distinct from a missing key.
    #[error("Link store unavailable: {0}")]
    Unavailable(String),
    #[error("Corrupt link store entry for {key}: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Key namespaces used in the ephemeral store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// An issued stream link; the display filename is part of the key.
    Link { link_id: String, filename: String },
    /// A bearer session written by the user service.
    Session(String),
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreKey::Link { link_id, filename } => write!(f, "temp_link:{}:{}", link_id, filename),
            StoreKey::Session(token) => write!(f, "session:{}", token),
        }
    }
}

/// A key-value store whose entries vanish on their own after a TTL.
///
/// Only `put` and `get` exist: entries are never updated or deleted by this
/// crate, expiry is the sole way an entry goes away.
#[async_trait]
pub trait EphemeralStore: Send + Sync {
    async fn put(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), LinkStoreError>;
    async fn get(&self, key: &str) -> Result<Option<String>, LinkStoreError>;
}
