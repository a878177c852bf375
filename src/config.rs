//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;

use crate::cache::{CacheConfig, TrimPolicy};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Namespace prefixing every key and index of the cache
    pub namespace: String,
    /// Maximum number of entries before trimming evicts (0 = unbounded)
    pub limit: i64,
    /// Per-entry TTL in seconds (0 = no expiry)
    pub ttl: i64,
    /// Override for the recency index name
    pub recency_index: Option<String>,
    /// When the entry limit is enforced
    pub trim_policy: TrimPolicy,
    /// HTTP server port
    pub server_port: u16,
    /// Maintenance (reap + trim) interval in seconds, 0 disables it
    pub maintenance_interval: u64,
    /// Redis connection URL; the in-memory store is used when unset
    pub redis_url: Option<String>,
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_non_empty(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NAMESPACE` - Cache namespace (default: cache)
    /// - `CACHE_LIMIT` - Entry limit (default: 1000)
    /// - `CACHE_TTL` - TTL in seconds (default: 0)
    /// - `CACHE_RECENCY_INDEX` - Recency index name override (default: unset)
    /// - `CACHE_TRIM_POLICY` - `manual` or `on_write` (default: manual)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `MAINTENANCE_INTERVAL` - Maintenance frequency in seconds (default: 1)
    /// - `REDIS_URL` - Redis URL (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            namespace: env_non_empty("CACHE_NAMESPACE").unwrap_or(defaults.namespace),
            limit: env_or("CACHE_LIMIT", defaults.limit),
            ttl: env_or("CACHE_TTL", defaults.ttl),
            recency_index: env_non_empty("CACHE_RECENCY_INDEX"),
            trim_policy: env_or("CACHE_TRIM_POLICY", defaults.trim_policy),
            server_port: env_or("SERVER_PORT", defaults.server_port),
            maintenance_interval: env_or("MAINTENANCE_INTERVAL", defaults.maintenance_interval),
            redis_url: env_non_empty("REDIS_URL"),
        }
    }

    /// Cache settings for the engine; validated when the cache is built.
    pub fn cache_config(&self) -> CacheConfig {
        let config = CacheConfig::new(self.namespace.clone(), self.limit)
            .with_ttl(self.ttl)
            .with_trim_policy(self.trim_policy);

        match &self.recency_index {
            Some(name) => config.with_recency_index(name.clone()),
            None => config,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: "cache".to_string(),
            limit: 1000,
            ttl: 0,
            recency_index: None,
            trim_policy: TrimPolicy::Manual,
            server_port: 3000,
            maintenance_interval: 1,
            redis_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.namespace, "cache");
        assert_eq!(config.limit, 1000);
        assert_eq!(config.ttl, 0);
        assert_eq!(config.trim_policy, TrimPolicy::Manual);
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.maintenance_interval, 1);
        assert!(config.redis_url.is_none());
    }

    // Single test touching the environment, so parallel tests cannot race on it.
    #[test]
    fn test_config_from_env() {
        for name in [
            "CACHE_NAMESPACE",
            "CACHE_LIMIT",
            "CACHE_TTL",
            "CACHE_RECENCY_INDEX",
            "CACHE_TRIM_POLICY",
            "SERVER_PORT",
            "MAINTENANCE_INTERVAL",
            "REDIS_URL",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.namespace, "cache");
        assert_eq!(config.limit, 1000);
        assert_eq!(config.server_port, 3000);

        env::set_var("CACHE_NAMESPACE", "sessions");
        env::set_var("CACHE_LIMIT", "50");
        env::set_var("CACHE_TTL", "30");
        env::set_var("CACHE_TRIM_POLICY", "on_write");
        env::set_var("MAINTENANCE_INTERVAL", "not a number");

        let config = Config::from_env();
        assert_eq!(config.namespace, "sessions");
        assert_eq!(config.limit, 50);
        assert_eq!(config.ttl, 30);
        assert_eq!(config.trim_policy, TrimPolicy::OnWrite);
        assert_eq!(config.maintenance_interval, 1);

        for name in [
            "CACHE_NAMESPACE",
            "CACHE_LIMIT",
            "CACHE_TTL",
            "CACHE_TRIM_POLICY",
            "MAINTENANCE_INTERVAL",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn test_cache_config_conversion() {
        let config = Config {
            namespace: "c".to_string(),
            limit: 2,
            ttl: 5,
            recency_index: Some("c_lru".to_string()),
            ..Config::default()
        };

        let resolved = config.cache_config().validate().unwrap();
        assert_eq!(resolved.namespace, "c");
        assert_eq!(resolved.limit, 2);
        assert_eq!(resolved.ttl_seconds, 5);
        assert_eq!(resolved.index_names.recency, "c_lru");
    }
}
