// In-process TTL cache for upstream responses

use async_trait::async_trait;
use dashmap::DashMap;
use formflux_core::port::{ResponseCache, TimeProvider};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at_millis: i64,
}

/// Concurrent map with per-entry TTL, checked lazily on read.
///
/// Expired entries are removed when a read finds them; there is no
/// background sweeper. The clock is injected so expiry is testable
/// without waiting.
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
    time_provider: Arc<dyn TimeProvider>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl TtlCache {
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            entries: DashMap::new(),
            time_provider,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl ResponseCache for TtlCache {
    async fn get(&self, key: &str) -> Option<Vec<u8>> {
        let now = self.time_provider.now_millis();
        let expired = match self.entries.get(key) {
            Some(entry) if now < entry.expires_at_millis => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(entry.value.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            // The guard from the lookup above is dropped before this
            self.entries.remove(key);
            debug!(key = %key, "Evicted expired cache entry");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
        let expires_at_millis = self.time_provider.now_millis() + ttl.as_millis() as i64;
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at_millis,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formflux_core::port::time_provider::mocks::MockTimeProvider;

    fn cache() -> (Arc<MockTimeProvider>, TtlCache) {
        let clock = Arc::new(MockTimeProvider::new(1_000));
        (clock.clone(), TtlCache::new(clock))
    }

    #[tokio::test]
    async fn test_get_before_expiry() {
        let (_, cache) = cache();
        cache.set("k", vec![1, 2], Duration::from_secs(60)).await;
        assert_eq!(cache.get("k").await, Some(vec![1, 2]));
        assert_eq!(cache.hits(), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss_and_evicted() {
        let (clock, cache) = cache();
        cache.set("k", vec![1], Duration::from_secs(60)).await;

        clock.advance(60_001);
        assert_eq!(cache.get("k").await, None);
        assert_eq!(cache.misses(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_entry_lives_until_exact_expiry() {
        let (clock, cache) = cache();
        cache.set("k", vec![1], Duration::from_secs(60)).await;

        clock.advance(59_999);
        assert!(cache.get("k").await.is_some());
        clock.advance(1);
        // expires_at is exclusive
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn test_set_overwrites_and_refreshes_ttl() {
        let (clock, cache) = cache();
        cache.set("k", vec![1], Duration::from_secs(10)).await;
        clock.advance(9_000);
        cache.set("k", vec![2], Duration::from_secs(10)).await;
        clock.advance(9_000);
        assert_eq!(cache.get("k").await, Some(vec![2]));
    }

    #[tokio::test]
    async fn test_unknown_key_counts_as_miss() {
        let (_, cache) = cache();
        assert_eq!(cache.get("nope").await, None);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.hits(), 0);
    }
}
