//! Store Module
//!
//! The capability interface the cache engine needs from its backing store, plus
//! the backends that implement it.
//!
//! # Backends
//! - `MemoryStore` - in-process store, used by tests and the default server
//! - `RedisStore` - Redis adapter (feature `redis-backend`)

mod memory;
#[cfg(feature = "redis-backend")]
mod redis_store;

pub use memory::MemoryStore;
#[cfg(feature = "redis-backend")]
pub use redis_store::RedisStore;

use thiserror::Error;

// == Store Error ==
/// Failure of a single store call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached (connection refused, dropped, timed out)
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but rejected or failed the command
    #[error("store operation failed: {0}")]
    OperationFailed(String),
}

/// Result type for store calls.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

// == Ordered Store ==
/// Key-value store with sorted-set support.
///
/// Every method is one blocking round trip. Calls are individually reliable but
/// nothing is atomic across calls.
///
/// Sorted-set scores are `f64`; ranges are inclusive on both ends and members
/// with equal scores come back in the store's own tie order.
pub trait OrderedStore: Send + Sync {
    /// Reads a scalar value. `None` when the key does not exist.
    fn scalar_get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes a scalar value, optionally expiring it after `ttl_seconds`.
    fn scalar_set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> StoreResult<()>;

    /// Deletes scalar keys, returning how many existed.
    fn multi_delete(&self, keys: &[String]) -> StoreResult<usize>;

    /// Adds members or updates their scores.
    fn sorted_set_add(&self, set: &str, members: &[(String, f64)]) -> StoreResult<()>;

    /// Members with `min <= score <= max`, ascending by score, at most `limit`.
    fn sorted_set_range_by_score(
        &self,
        set: &str,
        min: f64,
        max: f64,
        limit: Option<usize>,
    ) -> StoreResult<Vec<String>>;

    /// Number of members in the set; 0 when the set does not exist.
    fn sorted_set_cardinality(&self, set: &str) -> StoreResult<usize>;

    /// Removes members, returning how many were present.
    fn sorted_set_remove(&self, set: &str, members: &[String]) -> StoreResult<usize>;

    /// Score of a single member.
    fn sorted_set_score(&self, set: &str, member: &str) -> StoreResult<Option<f64>>;
}
