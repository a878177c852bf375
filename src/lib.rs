//! Sorted-set LRU cache
//!
//! An entry-count bounded, optionally time-bounded cache layered over a store
//! offering scalar keys and sorted sets (Redis or the bundled in-memory store).
//! Recency and expiry are tracked as sorted-set indexes next to the values.

pub mod api;
pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod models;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheConfig, CacheValue, LruCache, TrimPolicy, TrimReport};
pub use config::Config;
pub use error::{CacheError, Result};
pub use store::{MemoryStore, OrderedStore, StoreError};
pub use tasks::spawn_maintenance_task;
