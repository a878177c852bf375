//! Cache Module
//!
//! LRU eviction and TTL expiry layered over an ordered key-value store.

mod config;
mod engine;
mod index;
mod value;


// Re-export public types
pub use config::{CacheConfig, IndexNames, ResolvedConfig, TrimPolicy};
pub use engine::{LruCache, TrimReport};
pub use index::SortedIndex;
pub use value::CacheValue;

// == Public Constants ==
/// Maximum allowed key length in bytes, enforced at the HTTP boundary
pub const MAX_KEY_LENGTH: usize = 256;
