use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub links: LinkConfig,
    pub sessions: SessionConfig,
    pub recommendations: RecommendationConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    /// Scheme and authority prepended to issued stream URLs.
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory holding the redb catalog file
    pub data_dir: String,
    /// Base directory that relative media storage paths are resolved against
    pub media_root: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStoreBackend {
    Memory,
    Redis,
}

#[derive(Debug, Clone)]
pub struct LinkConfig {
    pub backend: LinkStoreBackend,
    /// Redis endpoint (used when backend is redis)
    pub redis_url: String,
    pub ttl_seconds: u64,
}

/// Where bearer sessions are read from. The user service writes
/// `session:{token}` keys there; this crate never creates them.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub redis_url: String,
}

/// Tunables for the recommendation engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecommendationConfig {
    /// How many of the most recent views feed the tag profile.
    pub recent_history_size: usize,
    /// Upload window for personalized candidates.
    pub candidate_window_days: i64,
    /// Divisor in the `exp(-days / n)` rating decay.
    pub rating_decay_days: f64,
    /// Cold start fills each kind up to this many entries.
    pub target_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            media_root: "./media".to_string(),
        }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            backend: LinkStoreBackend::Memory,
            redis_url: "redis://127.0.0.1:6379".to_string(),
            ttl_seconds: 3600,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            redis_url: LinkConfig::default().redis_url,
        }
    }
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            recent_history_size: 10,
            candidate_window_days: 7,
            rating_decay_days: 7.0,
            target_size: 10,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let server_defaults = ServerConfig::default();
        let storage_defaults = StorageConfig::default();
        let link_defaults = LinkConfig::default();
        let rec_defaults = RecommendationConfig::default();

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or(server_defaults.bind_address);
        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or(server_defaults.public_base_url)
            .trim_end_matches('/')
            .to_string();

        let data_dir = std::env::var("DATA_DIR").unwrap_or(storage_defaults.data_dir);
        let media_root = std::env::var("MEDIA_ROOT").unwrap_or(storage_defaults.media_root);

        let backend = match std::env::var("LINK_STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .to_lowercase()
            .as_str()
        {
            "redis" => LinkStoreBackend::Redis,
            _ => LinkStoreBackend::Memory,
        };
        let redis_url = std::env::var("REDIS_URL").unwrap_or(link_defaults.redis_url);
        let session_redis_url =
            std::env::var("SESSION_REDIS_URL").unwrap_or_else(|_| redis_url.clone());

        let config = Config {
            server: ServerConfig {
                bind_address,
                public_base_url,
            },
            storage: StorageConfig {
                data_dir,
                media_root,
            },
            links: LinkConfig {
                backend,
                redis_url,
                ttl_seconds: env_parse("LINK_TTL_SECONDS", link_defaults.ttl_seconds),
            },
            sessions: SessionConfig {
                redis_url: session_redis_url,
            },
            recommendations: RecommendationConfig {
                recent_history_size: env_parse(
                    "RECENT_HISTORY_SIZE",
                    rec_defaults.recent_history_size,
                ),
                candidate_window_days: env_parse(
                    "CANDIDATE_WINDOW_DAYS",
                    rec_defaults.candidate_window_days,
                ),
                rating_decay_days: env_parse("RATING_DECAY_DAYS", rec_defaults.rating_decay_days),
                target_size: env_parse("RECOMMENDATION_TARGET", rec_defaults.target_size),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = &self.server.public_base_url;
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "PUBLIC_BASE_URL must be an http(s) URL, got '{base}'"
            )));
        }

        if self.links.backend == LinkStoreBackend::Redis && self.links.redis_url.trim().is_empty()
        {
            return Err(ConfigError::ValidationError(
                "REDIS_URL is required when LINK_STORE_BACKEND=redis".to_string(),
            ));
        }

        // Sessions never live in the in-process store: nothing here writes them.
        let sessions = self.sessions.redis_url.trim();
        if !(sessions.starts_with("redis://") || sessions.starts_with("rediss://")) {
            return Err(ConfigError::ValidationError(format!(
                "SESSION_REDIS_URL must be a redis:// or rediss:// URL, got '{sessions}'"
            )));
        }

        let rec = &self.recommendations;
        if rec.recent_history_size == 0 {
            return Err(ConfigError::ValidationError(
                "RECENT_HISTORY_SIZE must be greater than 0".to_string(),
            ));
        }
        if rec.target_size == 0 {
            return Err(ConfigError::ValidationError(
                "RECOMMENDATION_TARGET must be greater than 0".to_string(),
            ));
        }
        if !(rec.rating_decay_days.is_finite() && rec.rating_decay_days > 0.0) {
            return Err(ConfigError::ValidationError(
                "RATING_DECAY_DAYS must be a positive number".to_string(),
            ));
        }
        if rec.candidate_window_days < 0 {
            return Err(ConfigError::ValidationError(
                "CANDIDATE_WINDOW_DAYS cannot be negative".to_string(),
            ));
        }

        if self.links.ttl_seconds == 0 {
            tracing::warn!("LINK_TTL_SECONDS is 0; every issued link expires immediately");
        }

        Ok(())
    }
}
