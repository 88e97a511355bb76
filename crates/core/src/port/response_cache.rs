// Response Cache Port (Interface)

use async_trait::async_trait;
use std::time::Duration;

/// Read-through cache for serialized upstream responses.
///
/// Entries expire after the TTL supplied at write time. `get` on an expired
/// key behaves exactly like a miss; eviction timing beyond that is an
/// implementation detail.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Look up a cached response, `None` on miss or expiry
    async fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a response with a time-to-live
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration);
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Map-backed cache that never expires (TTL is recorded but ignored).
    /// Expiry behavior is covered by the production adapter's own tests
    /// against a mock clock.
    pub struct MemoryCache {
        entries: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryCache {
        pub fn new() -> Self {
            Self {
                entries: Mutex::new(HashMap::new()),
            }
        }

        pub fn len(&self) -> usize {
            self.entries.lock().unwrap().len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl Default for MemoryCache {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ResponseCache for MemoryCache {
        async fn get(&self, key: &str) -> Option<Vec<u8>> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        async fn set(&self, key: &str, value: Vec<u8>, _ttl: Duration) {
            self.entries.lock().unwrap().insert(key.to_string(), value);
        }
    }
}
