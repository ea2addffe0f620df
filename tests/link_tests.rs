use std::sync::Arc;
use std::time::Duration;

use media_stream::link_store::{EphemeralStore, MemoryStore};
use media_stream::links::LinkIssuer;

fn issuer_with_ttl(ttl_seconds: u64) -> (Arc<MemoryStore>, LinkIssuer) {
    let store = Arc::new(MemoryStore::new());
    let issuer = LinkIssuer::new(store.clone(), "https://cdn.example.com", ttl_seconds);
    (store, issuer)
}

#[tokio::test]
async fn test_issued_link_resolves_to_media() {
    let (_, issuer) = issuer_with_ttl(3600);
    let link = issuer.issue(42, "Cup Final").await.unwrap();

    assert!(link.url.starts_with("https://cdn.example.com/stream/"));
    assert_eq!(issuer.resolve(&link.link_id, "Cup Final").await.unwrap(), Some(42));
}

#[tokio::test]
async fn test_filename_is_part_of_the_link() {
    let (_, issuer) = issuer_with_ttl(3600);
    let link = issuer.issue(42, "Cup Final").await.unwrap();

    assert_eq!(issuer.resolve(&link.link_id, "Other Name").await.unwrap(), None);
    assert_eq!(issuer.resolve("unknown", "Cup Final").await.unwrap(), None);
}

#[tokio::test]
async fn test_zero_ttl_link_never_resolves() {
    let (_, issuer) = issuer_with_ttl(0);
    let link = issuer.issue(1, "clip.mp4").await.unwrap();
    assert_eq!(issuer.resolve(&link.link_id, "clip.mp4").await.unwrap(), None);
}

#[tokio::test]
async fn test_link_expires_after_ttl() {
    let (_, issuer) = issuer_with_ttl(1);
    let link = issuer.issue(1, "clip.mp4").await.unwrap();
    assert_eq!(issuer.resolve(&link.link_id, "clip.mp4").await.unwrap(), Some(1));

    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(issuer.resolve(&link.link_id, "clip.mp4").await.unwrap(), None);
}

#[tokio::test]
async fn test_links_for_same_media_are_independent() {
    let (store, issuer) = issuer_with_ttl(3600);
    let a = issuer.issue(5, "song.mp3").await.unwrap();
    let b = issuer.issue(5, "song.mp3").await.unwrap();

    assert_ne!(a.link_id, b.link_id);
    assert_eq!(issuer.resolve(&a.link_id, "song.mp3").await.unwrap(), Some(5));
    assert_eq!(issuer.resolve(&b.link_id, "song.mp3").await.unwrap(), Some(5));
    assert_eq!(store.live_len().await, 2);
}

#[tokio::test]
async fn test_store_value_is_the_decimal_media_id() {
    let (store, issuer) = issuer_with_ttl(60);
    let link = issuer.issue(1234, "x.mp4").await.unwrap();
    let raw = store
        .get(&format!("temp_link:{}:x.mp4", link.link_id))
        .await
        .unwrap();
    assert_eq!(raw.as_deref(), Some("1234"));
}
