//! Short-lived, unguessable stream links.
//!
//! A link is `"{base}/stream/{link_id}/{filename}"`. The store key combines
//! both segments, so a valid link id presented with another filename does not
//! resolve.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};
use thiserror::Error;

use crate::catalog::MediaId;
use crate::link_store::{EphemeralStore, LinkStoreError, StoreKey};

/// Bytes of randomness in a link id.
const LINK_ID_BYTES: usize = 16;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error(transparent)]
    Store(#[from] LinkStoreError),
    #[error("Failed to generate link id")]
    TokenGeneration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedLink {
    pub link_id: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

pub struct LinkIssuer {
    store: Arc<dyn EphemeralStore>,
    base_url: String,
    ttl_seconds: u64,
    rng: SystemRandom,
}

impl LinkIssuer {
    pub fn new(store: Arc<dyn EphemeralStore>, base_url: impl Into<String>, ttl_seconds: u64) -> Self {
        Self {
            store,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ttl_seconds,
            rng: SystemRandom::new(),
        }
    }

    /// Mint a link for `media_id` under the display `filename`.
    ///
    /// Link ids carry 128 random bits, so no collision check is made against
    /// live keys.
    pub async fn issue(&self, media_id: MediaId, filename: &str) -> Result<IssuedLink, LinkError> {
        let link_id = self.generate_link_id()?;
        let key = StoreKey::Link {
            link_id: link_id.clone(),
            filename: filename.to_string(),
        };

        self.store
            .put(&key.to_string(), &media_id.to_string(), self.ttl_seconds)
            .await?;

        let url = format!(
            "{}/stream/{}/{}",
            self.base_url,
            link_id,
            urlencoding::encode(filename)
        );
        let expires_at = i64::try_from(self.ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|ttl| Utc::now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        tracing::debug!(media_id, link_id = %link_id, "Issued stream link");
        Ok(IssuedLink {
            link_id,
            url,
            expires_at,
        })
    }

    /// Look up the media behind a link. `None` covers both unknown and
    /// expired links; store failures are reported separately.
    pub async fn resolve(
        &self,
        link_id: &str,
        filename: &str,
    ) -> Result<Option<MediaId>, LinkStoreError> {
        let key = StoreKey::Link {
            link_id: link_id.to_string(),
            filename: filename.to_string(),
        }
        .to_string();

        match self.store.get(&key).await? {
            Some(value) => value
                .trim()
                .parse::<MediaId>()
                .map(Some)
                .map_err(|e| LinkStoreError::Corrupt {
                    key,
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    fn generate_link_id(&self) -> Result<String, LinkError> {
        let mut bytes = [0u8; LINK_ID_BYTES];
        self.rng
            .fill(&mut bytes)
            .map_err(|_| LinkError::TokenGeneration)?;
        Ok(URL_SAFE_NO_PAD.encode(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link_store::MemoryStore;

    fn issuer(ttl: u64) -> LinkIssuer {
        LinkIssuer::new(Arc::new(MemoryStore::new()), "http://media.test/", ttl)
    }

    #[tokio::test]
    async fn test_filename_is_percent_encoded_in_url() {
        let issuer = issuer(60);
        for (filename, encoded) in [
            ("clip.mp4", "clip.mp4"),
            ("My Video", "My%20Video"),
            ("a/b?c", "a%2Fb%3Fc"),
            ("é", "%C3%A9"),
            ("x-y_z.~1", "x-y_z.~1"),
        ] {
            let link = issuer.issue(1, filename).await.unwrap();
            assert_eq!(
                link.url,
                format!("http://media.test/stream/{}/{encoded}", link.link_id),
                "{filename}"
            );
        }
    }

    #[tokio::test]
    async fn test_link_ids_are_unique_and_url_safe() {
        let issuer = issuer(60);
        let a = issuer.issue(1, "a.mp4").await.unwrap();
        let b = issuer.issue(1, "a.mp4").await.unwrap();
        assert_ne!(a.link_id, b.link_id);
        // 16 bytes, unpadded base64
        assert_eq!(a.link_id.len(), 22);
        assert!(a
            .link_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[tokio::test]
    async fn test_url_embeds_link_id_and_filename() {
        let issuer = issuer(60);
        let link = issuer.issue(7, "Cup Final.mp4").await.unwrap();
        assert_eq!(
            link.url,
            format!("http://media.test/stream/{}/Cup%20Final.mp4", link.link_id)
        );
    }

    #[tokio::test]
    async fn test_corrupt_value_is_an_error() {
        let store = Arc::new(MemoryStore::new());
        store
            .put("temp_link:bad:file.mp4", "not-a-number", 60)
            .await
            .unwrap();
        let issuer = LinkIssuer::new(store, "http://media.test", 60);
        assert!(matches!(
            issuer.resolve("bad", "file.mp4").await,
            Err(LinkStoreError::Corrupt { .. })
        ));
    }
}
