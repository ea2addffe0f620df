//! media-stream - temporary stream links, range streaming and recommendations
//! for a media catalog.
//!
//! - Unguessable, self-expiring stream links kept in an ephemeral store
//!   (in-process or redis)
//! - `Range`-aware partial-content streaming with bounded memory per request
//! - Tag-weighted recommendations with time-decayed community ratings
//! - redb embedded catalog for media, tags, ratings and view history

pub mod api;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod link_store;
pub mod links;
pub mod recommend;
pub mod streaming;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use catalog::Database;
use config::Config;
use link_store::EphemeralStore;
use links::LinkIssuer;
use recommend::Recommender;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    /// Bearer sessions written by the user service; read-only here.
    pub sessions: Arc<dyn EphemeralStore>,
    pub links: LinkIssuer,
    pub recommender: Recommender,
}

impl AppState {
    pub fn new(
        config: Config,
        db: Database,
        link_store: Arc<dyn EphemeralStore>,
        sessions: Arc<dyn EphemeralStore>,
    ) -> Self {
        let links = LinkIssuer::new(
            link_store,
            config.server.public_base_url.clone(),
            config.links.ttl_seconds,
        );
        let recommender = Recommender::new(config.recommendations);
        Self {
            config,
            db,
            sessions,
            links,
            recommender,
        }
    }
}
