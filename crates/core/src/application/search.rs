// Movie search - cached upstream search with bounded director enrichment

use crate::application::fanout::bounded_fanout;
use crate::domain::{MovieSearchResponse, MovieSummary, UNAVAILABLE};
use crate::error::{AppError, Result};
use crate::port::{CatalogClient, ResponseCache};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tuning knobs for the search surface
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Fixed page size of the upstream catalog
    pub page_size: u64,
    /// How long a merged page stays cached
    pub cache_ttl: Duration,
    /// Ceiling on concurrent detail lookups per request
    pub max_concurrency: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: 10,
            cache_ttl: Duration::from_secs(300),
            max_concurrency: 5,
        }
    }
}

/// Read-through cached movie search.
///
/// A hit serves the cached merged page without touching the catalog.
/// On a miss the page is searched, each hit's director is fetched with
/// bounded concurrency, and only a fully successful merge is cached;
/// upstream failures and pages without any hits are returned to the
/// caller as errors and never cached.
pub struct MovieSearch {
    catalog: Arc<dyn CatalogClient>,
    cache: Arc<dyn ResponseCache>,
    config: SearchConfig,
}

impl MovieSearch {
    pub fn new(
        catalog: Arc<dyn CatalogClient>,
        cache: Arc<dyn ResponseCache>,
        config: SearchConfig,
    ) -> Self {
        Self {
            catalog,
            cache,
            config,
        }
    }

    pub async fn search(&self, term: &str, page: u32) -> Result<MovieSearchResponse> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(MovieSearchResponse::empty());
        }

        let key = cache_key(term, page);
        if let Some(bytes) = self.cache.get(&key).await {
            match serde_json::from_slice(&bytes) {
                Ok(response) => {
                    debug!(key = %key, "Search cache hit");
                    return Ok(response);
                }
                Err(e) => warn!(key = %key, error = %e, "Discarding undecodable cache entry"),
            }
        }

        let (payload, status) = self.catalog.search(term, page).await;
        if status != Some(200) {
            return Err(AppError::Upstream(payload));
        }
        let hits: Vec<(String, Option<String>)> = payload
            .get("Search")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|item| {
                        (
                            string_field(item, "Title").unwrap_or_else(|| UNAVAILABLE.to_string()),
                            string_field(item, "imdbID"),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default();
        // A missing item list and an empty one are both provider errors
        if hits.is_empty() {
            return Err(AppError::Upstream(payload));
        }

        let catalog = Arc::clone(&self.catalog);
        let fallback = MovieSummary {
            title: UNAVAILABLE.to_string(),
            director: UNAVAILABLE.to_string(),
        };
        let results = bounded_fanout(hits, self.config.max_concurrency, fallback, |(title, id)| {
            let catalog = Arc::clone(&catalog);
            async move {
                let director = match id {
                    Some(id) => fetch_director(catalog.as_ref(), &id).await,
                    None => UNAVAILABLE.to_string(),
                };
                MovieSummary { title, director }
            }
        })
        .await;

        let total = total_results(&payload);
        let response = MovieSearchResponse::new(total, self.config.page_size, results);

        let bytes = serde_json::to_vec(&response)?;
        self.cache.set(&key, bytes, self.config.cache_ttl).await;
        info!(term = %term, page = %page, total = %total, "Search page cached");
        Ok(response)
    }
}

/// Cache key: normalized term plus page number
fn cache_key(term: &str, page: u32) -> String {
    format!("{}_{}", term.to_lowercase(), page)
}

/// Fetch a movie's director, folding every failure into the sentinel
async fn fetch_director(catalog: &dyn CatalogClient, id: &str) -> String {
    let (detail, status) = catalog.lookup(id).await;
    if status != Some(200) {
        warn!(imdb_id = %id, status = ?status, "Director lookup failed");
        return UNAVAILABLE.to_string();
    }
    string_field(&detail, "Director").unwrap_or_else(|| UNAVAILABLE.to_string())
}

fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// The upstream reports totals as a decimal string; tolerate a number too
fn total_results(payload: &Value) -> u64 {
    match payload.get("totalResults") {
        Some(Value::String(s)) => s.parse().unwrap_or(0),
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::catalog::mocks::MockCatalogClient;
    use crate::port::response_cache::mocks::MemoryCache;
    use serde_json::json;

    fn search_reply(count: usize, total: &str) -> Value {
        let items: Vec<Value> = (0..count)
            .map(|n| json!({"Title": format!("Movie {}", n), "imdbID": format!("tt{:07}", n)}))
            .collect();
        json!({"Search": items, "totalResults": total, "Response": "True"})
    }

    fn service(catalog: MockCatalogClient) -> (Arc<MockCatalogClient>, MovieSearch) {
        let catalog = Arc::new(catalog);
        let search = MovieSearch::new(
            catalog.clone(),
            Arc::new(MemoryCache::new()),
            SearchConfig::default(),
        );
        (catalog, search)
    }

    #[tokio::test]
    async fn test_blank_term_short_circuits() {
        let (catalog, search) = service(MockCatalogClient::new(search_reply(1, "1"), Some(200)));
        let response = search.search("   ", 1).await.unwrap();
        assert_eq!(response, MovieSearchResponse::empty());
        assert_eq!(catalog.search_calls(), 0);
    }

    #[tokio::test]
    async fn test_merges_directors_into_page() {
        let catalog = MockCatalogClient::new(search_reply(2, "2"), Some(200))
            .with_detail("tt0000000", json!({"Title": "Movie 0", "Director": "Agnès Varda"}))
            .with_detail("tt0000001", json!({"Title": "Movie 1", "Director": "Bong Joon-ho"}));
        let (catalog, search) = service(catalog);

        let response = search.search("movie", 1).await.unwrap();
        assert_eq!(response.total_results, 2);
        assert_eq!(response.total_pages, 1);
        assert_eq!(response.results[0].director, "Agnès Varda");
        assert_eq!(response.results[1].director, "Bong Joon-ho");
        assert_eq!(catalog.lookup_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_lookup_yields_sentinel() {
        // Only the first hit has a detail record
        let catalog = MockCatalogClient::new(search_reply(2, "2"), Some(200))
            .with_detail("tt0000000", json!({"Director": "Céline Sciamma"}));
        let (_, search) = service(catalog);

        let response = search.search("movie", 1).await.unwrap();
        assert_eq!(response.results[0].director, "Céline Sciamma");
        assert_eq!(response.results[1].director, UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_total_pages_from_string_total() {
        let (_, search) = service(MockCatalogClient::new(search_reply(10, "23"), Some(200)));
        let response = search.search("movie", 1).await.unwrap();
        assert_eq!(response.total_results, 23);
        assert_eq!(response.total_pages, 3);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_upstream() {
        let catalog = MockCatalogClient::new(search_reply(1, "1"), Some(200))
            .with_detail("tt0000000", json!({"Director": "Kelly Reichardt"}));
        let (catalog, search) = service(catalog);

        let first = search.search("Movie", 1).await.unwrap();
        let second = search.search("movie", 1).await.unwrap();
        assert_eq!(first, second);
        // Case-normalized key: one upstream round trip for both calls
        assert_eq!(catalog.search_calls(), 1);
        assert_eq!(catalog.lookup_calls(), 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_not_cached() {
        let (catalog, search) = service(MockCatalogClient::unreachable());

        let err = search.search("movie", 1).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));

        let err = search.search("movie", 1).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(_)));
        // No cache entry was written, both calls hit upstream
        assert_eq!(catalog.search_calls(), 2);
    }

    #[tokio::test]
    async fn test_empty_item_list_is_an_error() {
        let payload = json!({"Search": [], "totalResults": "0", "Response": "True"});
        let (catalog, search) = service(MockCatalogClient::new(payload.clone(), Some(200)));

        let err = search.search("movie", 1).await.unwrap_err();
        match err {
            AppError::Upstream(value) => assert_eq!(value, payload),
            other => panic!("unexpected error: {:?}", other),
        }

        // The empty page was not cached, the next call goes upstream again
        let _ = search.search("movie", 1).await.unwrap_err();
        assert_eq!(catalog.search_calls(), 2);
    }

    #[tokio::test]
    async fn test_not_found_payload_is_an_error() {
        let payload = json!({"Response": "False", "Error": "Movie not found!"});
        let (_, search) = service(MockCatalogClient::new(payload.clone(), Some(200)));

        let err = search.search("zzzz", 1).await.unwrap_err();
        match err {
            AppError::Upstream(value) => assert_eq!(value, payload),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
