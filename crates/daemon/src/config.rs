//! Daemon configuration from environment variables

use anyhow::{Context, Result};
use std::time::Duration;

const DEFAULT_DB_PATH: &str = "~/.formflux/meta.db";
const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9630;
const DEFAULT_WORKER_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_CONCURRENCY: usize = 5;
const DEFAULT_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_QUEUE_CAPACITY: usize = 64;
const DEFAULT_OMDB_URL: &str = "https://www.omdbapi.com/";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Everything the daemon reads from the environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub rpc_host: String,
    pub rpc_port: u16,
    pub worker_timeout: Duration,
    pub max_concurrency: usize,
    pub cache_ttl: Duration,
    pub queue_capacity: usize,
    pub omdb_url: String,
    pub omdb_api_key: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            db_path: std::env::var("FORMFLUX_DB_PATH")
                .unwrap_or_else(|_| shellexpand::tilde(DEFAULT_DB_PATH).into_owned()),
            rpc_host: env_or("FORMFLUX_RPC_HOST", DEFAULT_RPC_HOST),
            rpc_port: env_parsed("FORMFLUX_RPC_PORT", DEFAULT_RPC_PORT),
            worker_timeout: Duration::from_secs(env_parsed(
                "FORMFLUX_WORKER_TIMEOUT_SECS",
                DEFAULT_WORKER_TIMEOUT_SECS,
            )),
            max_concurrency: env_parsed("FORMFLUX_MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY),
            cache_ttl: Duration::from_secs(env_parsed(
                "FORMFLUX_CACHE_TTL_SECS",
                DEFAULT_CACHE_TTL_SECS,
            )),
            queue_capacity: env_parsed("FORMFLUX_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY),
            omdb_url: env_or("FORMFLUX_OMDB_URL", DEFAULT_OMDB_URL),
            omdb_api_key: std::env::var("FORMFLUX_OMDB_API_KEY")
                .context("FORMFLUX_OMDB_API_KEY must be set")?,
            gemini_api_key: std::env::var("FORMFLUX_GEMINI_API_KEY")
                .context("FORMFLUX_GEMINI_API_KEY must be set")?,
            gemini_model: env_or("FORMFLUX_GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
        })
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}
