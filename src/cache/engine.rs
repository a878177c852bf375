//! Cache Engine Module
//!
//! LRU eviction and TTL expiry over an [`OrderedStore`]. Values live under
//! `<namespace>:<key>`; a recency index and an expiry index (both sorted sets
//! keyed by that physical key) drive trimming and reaping.
//!
//! Each operation is a fixed sequence of independent store calls. Nothing is
//! rolled back: if a call fails, the calls before it stay applied and the error
//! names the failing step.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::cache::{CacheConfig, CacheValue, IndexNames, SortedIndex, TrimPolicy};
use crate::clock::{SystemTimeProvider, TimeProvider};
use crate::error::{CacheError, Operation, Result, Step};
use crate::store::{OrderedStore, StoreError};

// == Trim Report ==
/// What a `trim_to_limit` call removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimReport {
    /// Entries removed because their deadline had passed
    pub reaped: usize,
    /// Entries removed as least recently used
    pub evicted: usize,
}

impl TrimReport {
    pub fn total(&self) -> usize {
        self.reaped + self.evicted
    }
}

// == LRU Cache ==
/// Size- and time-bounded cache over a shared store.
///
/// Holds no mutable state; every call reads and writes the store directly, so
/// one instance can be shared across threads behind an `Arc`.
pub struct LruCache<S: ?Sized, T = SystemTimeProvider> {
    store: Arc<S>,
    clock: Arc<T>,
    namespace: String,
    key_prefix: String,
    limit: u64,
    ttl_seconds: u64,
    index_names: IndexNames,
    recency: SortedIndex,
    expiry: SortedIndex,
    trim_policy: TrimPolicy,
}

impl<S: OrderedStore + ?Sized> LruCache<S, SystemTimeProvider> {
    // == Constructor ==
    /// Creates a cache reading the system clock.
    ///
    /// Fails with `InvalidConfiguration` for an empty namespace or a negative
    /// limit.
    pub fn new(store: Arc<S>, config: CacheConfig) -> Result<Self> {
        Self::with_time_provider(store, config, Arc::new(SystemTimeProvider::new()))
    }
}

impl<S: OrderedStore + ?Sized, T: TimeProvider> LruCache<S, T> {
    /// Creates a cache taking timestamps from `clock`.
    pub fn with_time_provider(
        store: Arc<S>,
        config: CacheConfig,
        clock: Arc<T>,
    ) -> Result<Self> {
        let resolved = config.validate()?;
        debug!(
            namespace = %resolved.namespace,
            limit = resolved.limit,
            ttl = resolved.ttl_seconds,
            recency_index = %resolved.index_names.recency,
            "cache created"
        );

        Ok(Self {
            store,
            clock,
            recency: SortedIndex::new(resolved.index_names.recency.clone()),
            expiry: SortedIndex::new(resolved.index_names.expiry.clone()),
            namespace: resolved.namespace,
            key_prefix: resolved.key_prefix,
            limit: resolved.limit,
            ttl_seconds: resolved.ttl_seconds,
            index_names: resolved.index_names,
            trim_policy: resolved.trim_policy,
        })
    }

    // == Accessors ==
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Entry-count limit; 0 = unbounded.
    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Per-entry TTL in seconds; 0 = no expiry.
    pub fn ttl(&self) -> u64 {
        self.ttl_seconds
    }

    pub fn index_names(&self) -> &IndexNames {
        &self.index_names
    }

    pub fn trim_policy(&self) -> TrimPolicy {
        self.trim_policy
    }

    fn implements_ttl(&self) -> bool {
        self.ttl_seconds != 0
    }

    fn physical_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    // == Get ==
    /// Reads a value and, on a hit, marks it as most recently used.
    ///
    /// Sequence: read value, touch recency index (hit only).
    pub fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let physical = self.physical_key(key);
        let value = self.read_value(Operation::Get, &physical)?;

        if value.is_some() {
            self.touch(Operation::Get, &physical)?;
        }
        debug!(key, hit = value.is_some(), "get");
        Ok(value)
    }

    // == Peek ==
    /// Reads a value without touching the recency index.
    pub fn peek(&self, key: &str) -> Result<Option<CacheValue>> {
        let physical = self.physical_key(key);
        self.read_value(Operation::Peek, &physical)
    }

    // == Set ==
    /// Stores a value and marks it as most recently used.
    ///
    /// Sequence: write value (with store-side expiry when TTL is on), touch
    /// recency index, write expiry deadline (TTL only), then trim under
    /// `TrimPolicy::OnWrite`.
    pub fn set(&self, key: &str, value: impl Into<CacheValue>) -> Result<()> {
        let physical = self.physical_key(key);
        let value: CacheValue = value.into();
        let encoded = value.encode();
        let ttl = self.implements_ttl().then_some(self.ttl_seconds);

        self.store
            .scalar_set(&physical, &encoded, ttl)
            .map_err(self.store_error(Operation::Set, Step::WriteValue, &[physical.as_str()]))?;

        self.touch(Operation::Set, &physical)?;

        if self.implements_ttl() {
            let deadline = self.clock.now_secs() + self.ttl_seconds as f64;
            self.expiry
                .record(&*self.store, &physical, deadline)
                .map_err(self.store_error(Operation::Set, Step::WriteExpiry, &[physical.as_str()]))?;
        }
        debug!(key, "set");

        if self.trim_policy == TrimPolicy::OnWrite {
            self.trim_to_limit()?;
        }
        Ok(())
    }

    // == Delete ==
    /// Removes entries from the value store and both indexes.
    ///
    /// Absent keys are ignored. Returns how many values existed.
    ///
    /// Sequence: delete values, remove from recency index, remove from expiry
    /// index.
    pub fn delete<K: AsRef<str>>(&self, keys: &[K]) -> Result<usize> {
        let physical: Vec<String> = keys.iter().map(|k| self.physical_key(k.as_ref())).collect();
        self.remove_entries(Operation::Delete, &physical)
    }

    // == Trim To Limit ==
    /// Brings the entry count down to the limit.
    ///
    /// Expired entries go first; if that is not enough, the least recently
    /// used entries are deleted. Entries sharing a timestamp are taken in the
    /// store's tie order. No-op when the limit is 0.
    pub fn trim_to_limit(&self) -> Result<TrimReport> {
        let mut report = TrimReport::default();
        if self.limit == 0 {
            return Ok(report);
        }

        let count = self
            .recency
            .len(&*self.store)
            .map_err(self.store_error(Operation::TrimToLimit, Step::CountRecency, &[]))?;
        let mut overflow = count as i64 - self.limit as i64;
        if overflow <= 0 {
            return Ok(report);
        }

        report.reaped = self.reap(Operation::TrimToLimit)?;
        overflow -= report.reaped as i64;

        if overflow > 0 {
            let oldest = self
                .recency
                .lowest(&*self.store, overflow as usize)
                .map_err(self.store_error(Operation::TrimToLimit, Step::RangeRecency, &[]))?;
            self.check_members(&oldest)?;

            self.remove_entries(Operation::TrimToLimit, &oldest)?;
            report.evicted = oldest.len();
            info!(
                namespace = %self.namespace,
                evicted = report.evicted,
                reaped = report.reaped,
                "trimmed cache to limit"
            );
        }
        Ok(report)
    }

    // == Reap Expired ==
    /// Deletes every entry whose deadline has passed and returns the count.
    ///
    /// Always 0 when TTL is disabled.
    pub fn reap_expired(&self) -> Result<usize> {
        self.reap(Operation::ReapExpired)
    }

    // == Inspection ==
    /// Number of entries tracked by the recency index.
    pub fn len(&self) -> Result<usize> {
        self.recency
            .len(&*self.store)
            .map_err(self.store_error(Operation::Inspect, Step::CountRecency, &[]))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Recency timestamp (UNIX seconds) of an entry.
    pub fn last_touched(&self, key: &str) -> Result<Option<f64>> {
        let physical = self.physical_key(key);
        self.recency
            .score(&*self.store, &physical)
            .map_err(self.store_error(Operation::Inspect, Step::ReadScore, &[physical.as_str()]))
    }

    /// Expiry deadline (UNIX seconds) of an entry.
    pub fn expires_at(&self, key: &str) -> Result<Option<f64>> {
        let physical = self.physical_key(key);
        self.expiry
            .score(&*self.store, &physical)
            .map_err(self.store_error(Operation::Inspect, Step::ReadScore, &[physical.as_str()]))
    }

    // == Internals ==
    fn read_value(&self, operation: Operation, physical: &str) -> Result<Option<CacheValue>> {
        let raw = self
            .store
            .scalar_get(physical)
            .map_err(self.store_error(operation, Step::ReadValue, &[physical]))?;

        raw.map(|raw| {
            CacheValue::decode(&raw).map_err(|source| CacheError::Decode {
                key: physical.to_string(),
                source,
            })
        })
        .transpose()
    }

    fn touch(&self, operation: Operation, physical: &str) -> Result<()> {
        let now = self.clock.now_secs();
        self.recency
            .record(&*self.store, physical, now)
            .map_err(self.store_error(operation, Step::TouchRecency, &[physical]))
    }

    fn reap(&self, operation: Operation) -> Result<usize> {
        if !self.implements_ttl() {
            return Ok(0);
        }

        let now = self.clock.now_secs();
        let due = self
            .expiry
            .up_to(&*self.store, now)
            .map_err(self.store_error(operation, Step::RangeExpiry, &[]))?;
        if due.is_empty() {
            return Ok(0);
        }
        self.check_members(&due)?;

        self.remove_entries(operation, &due)?;
        info!(namespace = %self.namespace, reaped = due.len(), "reaped expired entries");
        Ok(due.len())
    }

    fn remove_entries(&self, operation: Operation, physical: &[String]) -> Result<usize> {
        if physical.is_empty() {
            return Ok(0);
        }
        let keys: Vec<&str> = physical.iter().map(String::as_str).collect();

        let removed = self
            .store
            .multi_delete(physical)
            .map_err(self.store_error(operation, Step::DeleteValues, &keys))?;
        self.recency
            .remove(&*self.store, physical)
            .map_err(self.store_error(operation, Step::RemoveRecency, &keys))?;
        self.expiry
            .remove(&*self.store, physical)
            .map_err(self.store_error(operation, Step::RemoveExpiry, &keys))?;

        debug!(?keys, removed, %operation, "removed entries");
        Ok(removed)
    }

    /// Every index member must carry this cache's key prefix. A foreign member
    /// means the index is corrupt or shared with another namespace.
    fn check_members(&self, members: &[String]) -> Result<()> {
        match members.iter().find(|m| !m.starts_with(&self.key_prefix)) {
            Some(member) => {
                error!(
                    namespace = %self.namespace,
                    member = %member,
                    "index member outside namespace"
                );
                Err(CacheError::InvariantViolation {
                    namespace: self.namespace.clone(),
                    member: member.clone(),
                })
            }
            None => Ok(()),
        }
    }

    fn store_error(
        &self,
        operation: Operation,
        step: Step,
        keys: &[&str],
    ) -> impl FnOnce(StoreError) -> CacheError {
        let keys: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        move |source| CacheError::Store {
            operation,
            step,
            keys,
            source,
        }
    }
}

impl<S: ?Sized, T> std::fmt::Debug for LruCache<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LruCache")
            .field("namespace", &self.namespace)
            .field("limit", &self.limit)
            .field("ttl_seconds", &self.ttl_seconds)
            .field("index_names", &self.index_names)
            .field("trim_policy", &self.trim_policy)
            .finish_non_exhaustive()
    }
}
