// Catalog Service Port (Interface)

use async_trait::async_trait;
use serde_json::Value;

/// Connector to the remote movie catalog.
///
/// Both operations return `(payload, status_code)` and never fail at the
/// call boundary: a `Null` payload signals failure and callers treat it as
/// an error to handle locally (the retrying executor behind the production
/// adapter has already logged the attempts).
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Keyword search, one page of results
    async fn search(&self, term: &str, page: u32) -> (Value, Option<u16>);

    /// Detail lookup for a single item identifier
    async fn lookup(&self, id: &str) -> (Value, Option<u16>);
}

// ============================================================================
// Mock Implementation for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Catalog serving canned payloads, with call counters for asserting
    /// cache hits avoid upstream traffic
    pub struct MockCatalogClient {
        search_reply: Mutex<(Value, Option<u16>)>,
        details: Mutex<HashMap<String, Value>>,
        search_calls: AtomicUsize,
        lookup_calls: AtomicUsize,
    }

    impl MockCatalogClient {
        pub fn new(search_reply: Value, status: Option<u16>) -> Self {
            Self {
                search_reply: Mutex::new((search_reply, status)),
                details: Mutex::new(HashMap::new()),
                search_calls: AtomicUsize::new(0),
                lookup_calls: AtomicUsize::new(0),
            }
        }

        /// Catalog whose search always fails (empty payload, no status)
        pub fn unreachable() -> Self {
            Self::new(Value::Null, None)
        }

        pub fn with_detail(self, id: impl Into<String>, detail: Value) -> Self {
            self.details.lock().unwrap().insert(id.into(), detail);
            self
        }

        pub fn search_calls(&self) -> usize {
            self.search_calls.load(Ordering::SeqCst)
        }

        pub fn lookup_calls(&self) -> usize {
            self.lookup_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CatalogClient for MockCatalogClient {
        async fn search(&self, _term: &str, _page: u32) -> (Value, Option<u16>) {
            self.search_calls.fetch_add(1, Ordering::SeqCst);
            self.search_reply.lock().unwrap().clone()
        }

        async fn lookup(&self, id: &str) -> (Value, Option<u16>) {
            self.lookup_calls.fetch_add(1, Ordering::SeqCst);
            match self.details.lock().unwrap().get(id) {
                Some(detail) => (detail.clone(), Some(200)),
                None => (Value::Null, Some(404)),
            }
        }
    }
}
