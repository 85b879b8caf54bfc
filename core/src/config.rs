//! Client configuration, read from the environment with fixed defaults.

use std::env;

use crate::error::ApiError;

/// Where the movie service lives when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/RestEasyTutorial/rest";

pub const BASE_URL_VAR: &str = "MOVIE_API_BASE_URL";
pub const POOL_MAX_IDLE_VAR: &str = "MOVIE_API_POOL_MAX_IDLE";
pub const POOL_MAX_IDLE_PER_HOST_VAR: &str = "MOVIE_API_POOL_MAX_IDLE_PER_HOST";

/// Explicit sizing for the transport's idle-connection pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_idle_connections: usize,
    pub max_idle_connections_per_host: usize,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_idle_connections: 20,
            max_idle_connections_per_host: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    /// `None` keeps the HTTP library's default pool.
    pub pool: Option<PoolConfig>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            pool: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            pool: None,
        }
    }

    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = Some(pool);
        self
    }

    /// Build from `MOVIE_API_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Setting either pool variable turns
    /// on an explicit pool; the other one falls back to its default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ApiError> {
        let base_url = lookup(BASE_URL_VAR)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let max_idle = parse_count(&lookup, POOL_MAX_IDLE_VAR)?;
        let max_idle_per_host = parse_count(&lookup, POOL_MAX_IDLE_PER_HOST_VAR)?;
        let pool = match (max_idle, max_idle_per_host) {
            (None, None) => None,
            (max_idle, max_idle_per_host) => {
                let defaults = PoolConfig::default();
                Some(PoolConfig {
                    max_idle_connections: max_idle.unwrap_or(defaults.max_idle_connections),
                    max_idle_connections_per_host: max_idle_per_host
                        .unwrap_or(defaults.max_idle_connections_per_host),
                })
            }
        };

        Ok(Self { base_url, pool })
    }
}

fn parse_count(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<usize>, ApiError> {
    match lookup(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ApiError::InvalidConfig {
                key: key.to_string(),
                value,
            }),
    }
}
