// OMDB movie catalog adapter

use crate::executor::RemoteCallExecutor;
use crate::request::RequestSpec;
use async_trait::async_trait;
use formflux_core::application::retry::RetryPolicy;
use formflux_core::port::CatalogClient;
use serde_json::Value;
use std::time::Duration;

/// Catalog retries timeouts up to this many times per call
const CATALOG_MAX_RETRIES: u32 = 3;

#[derive(Debug, Clone)]
pub struct OmdbConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl OmdbConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// OMDB client. All calls carry the API key and are pinned to the movie
/// result type; timeouts are retried, every response passes through.
pub struct OmdbCatalog {
    executor: RemoteCallExecutor,
    config: OmdbConfig,
    policy: RetryPolicy,
}

impl OmdbCatalog {
    pub fn new(config: OmdbConfig) -> Self {
        Self {
            executor: RemoteCallExecutor::new(),
            config,
            policy: RetryPolicy::on_timeout(CATALOG_MAX_RETRIES),
        }
    }

    fn base_spec(&self) -> RequestSpec {
        RequestSpec::get(&self.config.base_url)
            .query_param("apikey", &self.config.api_key)
            .query_param("type", "movie")
            .timeout(self.config.timeout)
    }
}

#[async_trait]
impl CatalogClient for OmdbCatalog {
    async fn search(&self, term: &str, page: u32) -> (Value, Option<u16>) {
        let spec = self
            .base_spec()
            .query_param("s", term)
            .query_param("page", page.to_string());
        self.executor.execute(&spec, &self.policy).await
    }

    async fn lookup(&self, id: &str) -> (Value, Option<u16>) {
        let spec = self.base_spec().query_param("i", id);
        self.executor.execute(&spec, &self.policy).await
    }
}
