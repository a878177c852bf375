//! Cache Configuration Module
//!
//! Per-instance cache settings and their validation.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use crate::error::{CacheError, Result};

// == Trim Policy ==
/// When the entry-count limit is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimPolicy {
    /// Only when a caller invokes `trim_to_limit`
    #[default]
    Manual,
    /// After every `set`, in addition to explicit calls
    OnWrite,
}

impl FromStr for TrimPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manual" => Ok(TrimPolicy::Manual),
            "on_write" | "on-write" => Ok(TrimPolicy::OnWrite),
            other => Err(CacheError::InvalidConfiguration(format!(
                "unknown trim policy '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TrimPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrimPolicy::Manual => f.write_str("manual"),
            TrimPolicy::OnWrite => f.write_str("on_write"),
        }
    }
}

// == Index Names ==
/// Names of the two sorted sets backing a cache namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexNames {
    /// Recency index, `<namespace>_queue` unless overridden
    pub recency: String,
    /// Expiry index, always `<namespace>_expiry`
    pub expiry: String,
}

impl IndexNames {
    /// Derives the index names for `namespace`. An empty override counts as
    /// no override.
    pub fn derive(namespace: &str, recency_override: Option<&str>) -> Self {
        let recency = match recency_override {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("{}_queue", namespace),
        };

        Self {
            recency,
            expiry: format!("{}_expiry", namespace),
        }
    }
}

// == Cache Config ==
/// Builder for a cache instance's settings.
///
/// Numeric fields are signed so out-of-range input reaches validation instead
/// of wrapping at the call site.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    namespace: String,
    limit: i64,
    ttl_seconds: i64,
    recency_index: Option<String>,
    trim_policy: TrimPolicy,
}

impl CacheConfig {
    /// `limit` 0 means unbounded.
    pub fn new(namespace: impl Into<String>, limit: i64) -> Self {
        Self {
            namespace: namespace.into(),
            limit,
            ttl_seconds: 0,
            recency_index: None,
            trim_policy: TrimPolicy::default(),
        }
    }

    /// Per-entry TTL in seconds; 0 disables expiry.
    pub fn with_ttl(mut self, ttl_seconds: i64) -> Self {
        self.ttl_seconds = ttl_seconds;
        self
    }

    /// Overrides the recency index name.
    pub fn with_recency_index(mut self, name: impl Into<String>) -> Self {
        self.recency_index = Some(name.into());
        self
    }

    pub fn with_trim_policy(mut self, policy: TrimPolicy) -> Self {
        self.trim_policy = policy;
        self
    }

    // == Validate ==
    /// Checks the settings and resolves derived values.
    ///
    /// A negative TTL is clamped to 0 (no expiry) rather than rejected.
    pub fn validate(self) -> Result<ResolvedConfig> {
        if self.namespace.is_empty() {
            return Err(CacheError::InvalidConfiguration(
                "namespace must not be empty".to_string(),
            ));
        }
        if self.limit < 0 {
            return Err(CacheError::InvalidConfiguration(format!(
                "limit must be >= 0, got {}",
                self.limit
            )));
        }

        let ttl_seconds = if self.ttl_seconds < 0 {
            warn!(
                namespace = %self.namespace,
                ttl = self.ttl_seconds,
                "negative TTL clamped to 0, expiry disabled"
            );
            0
        } else {
            self.ttl_seconds as u64
        };

        let index_names = IndexNames::derive(&self.namespace, self.recency_index.as_deref());
        if index_names.recency == index_names.expiry {
            return Err(CacheError::InvalidConfiguration(format!(
                "recency index name '{}' collides with the expiry index",
                index_names.recency
            )));
        }

        Ok(ResolvedConfig {
            key_prefix: format!("{}:", self.namespace),
            namespace: self.namespace,
            limit: self.limit as u64,
            ttl_seconds,
            index_names,
            trim_policy: self.trim_policy,
        })
    }
}

// == Resolved Config ==
/// Validated, immutable settings of a cache instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub namespace: String,
    /// `<namespace>:`, prefix of every physical key and index member
    pub key_prefix: String,
    pub limit: u64,
    pub ttl_seconds: u64,
    pub index_names: IndexNames,
    pub trim_policy: TrimPolicy,
}
