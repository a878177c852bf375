//! In-Memory Store Module
//!
//! In-process implementation of [`OrderedStore`] with Redis-like semantics:
//! scalar values with optional expiry, and sorted sets ordered by
//! (score, member).

use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::trace;

use super::{OrderedStore, StoreResult};
use crate::clock::{SystemTimeProvider, TimeProvider};

// == Scalar Entry ==
/// A stored scalar value with its optional expiry.
#[derive(Debug, Clone)]
struct ScalarEntry {
    value: String,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    expires_at: Option<u64>,
}

impl ScalarEntry {
    /// Expired once the current time reaches the expiration time.
    fn is_expired(&self, now_ms: u64) -> bool {
        matches!(self.expires_at, Some(expires) if now_ms >= expires)
    }
}

// == Score ==
/// Totally ordered wrapper so scores can key a `BTreeSet`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Score(f64);

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

// == Sorted Set ==
/// Members ordered by score, ties broken by member.
#[derive(Debug, Default)]
struct SortedSet {
    scores: HashMap<String, f64>,
    order: BTreeSet<(Score, String)>,
}

impl SortedSet {
    fn insert(&mut self, member: &str, score: f64) {
        if let Some(previous) = self.scores.insert(member.to_string(), score) {
            self.order.remove(&(Score(previous), member.to_string()));
        }
        self.order.insert((Score(score), member.to_string()));
    }

    fn remove(&mut self, member: &str) -> bool {
        match self.scores.remove(member) {
            Some(score) => {
                self.order.remove(&(Score(score), member.to_string()));
                true
            }
            None => false,
        }
    }

    fn range(&self, min: f64, max: f64, limit: Option<usize>) -> Vec<String> {
        self.order
            .iter()
            .skip_while(|(score, _)| score.0 < min)
            .take_while(|(score, _)| score.0 <= max)
            .take(limit.unwrap_or(usize::MAX))
            .map(|(_, member)| member.clone())
            .collect()
    }

    fn len(&self) -> usize {
        self.scores.len()
    }

    fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

#[derive(Debug, Default)]
struct Inner {
    scalars: HashMap<String, ScalarEntry>,
    sorted_sets: HashMap<String, SortedSet>,
}

// == Memory Store ==
/// Thread-safe in-process store.
///
/// Scalar expiry is lazy: an expired value is dropped the next time it is read
/// or deleted. Empty sorted sets are removed, so an absent set and an empty
/// set look the same.
pub struct MemoryStore {
    inner: Mutex<Inner>,
    clock: Arc<dyn TimeProvider>,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates an empty store reading the system clock.
    pub fn new() -> Self {
        Self::with_time_provider(Arc::new(SystemTimeProvider::new()))
    }

    /// Creates an empty store that expires values against `clock`.
    pub fn with_time_provider(clock: Arc<dyn TimeProvider>) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            clock,
        }
    }

    /// Number of live scalar keys, ignoring expired ones.
    pub fn scalar_count(&self) -> usize {
        let now = self.clock.now_ms();
        self.inner
            .lock()
            .scalars
            .values()
            .filter(|entry| !entry.is_expired(now))
            .count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("MemoryStore")
            .field("scalars", &inner.scalars.len())
            .field("sorted_sets", &inner.sorted_sets.len())
            .finish()
    }
}

impl OrderedStore for MemoryStore {
    fn scalar_get(&self, key: &str) -> StoreResult<Option<String>> {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();

        match inner.scalars.get(key).map(|entry| entry.is_expired(now)) {
            Some(true) => {
                trace!(key, "dropping expired scalar on read");
                inner.scalars.remove(key);
                Ok(None)
            }
            Some(false) => Ok(inner.scalars.get(key).map(|entry| entry.value.clone())),
            None => Ok(None),
        }
    }

    fn scalar_set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> StoreResult<()> {
        let now = self.clock.now_ms();
        let entry = ScalarEntry {
            value: value.to_string(),
            expires_at: ttl_seconds.map(|ttl| now + ttl * 1000),
        };
        self.inner.lock().scalars.insert(key.to_string(), entry);
        Ok(())
    }

    fn multi_delete(&self, keys: &[String]) -> StoreResult<usize> {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock();

        let removed = keys
            .iter()
            .filter_map(|key| inner.scalars.remove(key))
            .filter(|entry| !entry.is_expired(now))
            .count();
        Ok(removed)
    }

    fn sorted_set_add(&self, set: &str, members: &[(String, f64)]) -> StoreResult<()> {
        if members.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.lock();
        let sorted = inner.sorted_sets.entry(set.to_string()).or_default();
        for (member, score) in members {
            sorted.insert(member, *score);
        }
        Ok(())
    }

    fn sorted_set_range_by_score(
        &self,
        set: &str,
        min: f64,
        max: f64,
        limit: Option<usize>,
    ) -> StoreResult<Vec<String>> {
        let inner = self.inner.lock();
        Ok(inner
            .sorted_sets
            .get(set)
            .map(|sorted| sorted.range(min, max, limit))
            .unwrap_or_default())
    }

    fn sorted_set_cardinality(&self, set: &str) -> StoreResult<usize> {
        let inner = self.inner.lock();
        Ok(inner.sorted_sets.get(set).map_or(0, SortedSet::len))
    }

    fn sorted_set_remove(&self, set: &str, members: &[String]) -> StoreResult<usize> {
        let mut inner = self.inner.lock();
        let Some(sorted) = inner.sorted_sets.get_mut(set) else {
            return Ok(0);
        };

        let removed = members.iter().filter(|member| sorted.remove(member)).count();
        if sorted.is_empty() {
            inner.sorted_sets.remove(set);
        }
        Ok(removed)
    }

    fn sorted_set_score(&self, set: &str, member: &str) -> StoreResult<Option<f64>> {
        let inner = self.inner.lock();
        Ok(inner
            .sorted_sets
            .get(set)
            .and_then(|sorted| sorted.scores.get(member).copied()))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockTimeProvider;
    use std::time::Duration;

    fn store_with_clock() -> (MemoryStore, MockTimeProvider) {
        let clock = MockTimeProvider::at_secs(1_000);
        let store = MemoryStore::with_time_provider(Arc::new(clock.clone()));
        (store, clock)
    }

    fn members(pairs: &[(&str, f64)]) -> Vec<(String, f64)> {
        pairs.iter().map(|(m, s)| (m.to_string(), *s)).collect()
    }

    #[test]
    fn test_scalar_set_and_get() {
        let store = MemoryStore::new();

        store.scalar_set("k", "v", None).unwrap();
        assert_eq!(store.scalar_get("k").unwrap(), Some("v".to_string()));
        assert_eq!(store.scalar_get("missing").unwrap(), None);
    }

    #[test]
    fn test_scalar_ttl_expires_at_boundary() {
        let (store, clock) = store_with_clock();

        store.scalar_set("k", "v", Some(2)).unwrap();
        clock.advance(Duration::from_millis(1999));
        assert!(store.scalar_get("k").unwrap().is_some());

        clock.advance(Duration::from_millis(1));
        assert_eq!(store.scalar_get("k").unwrap(), None);
        assert_eq!(store.scalar_count(), 0);
    }

    #[test]
    fn test_scalar_overwrite_clears_ttl() {
        let (store, clock) = store_with_clock();

        store.scalar_set("k", "v1", Some(1)).unwrap();
        store.scalar_set("k", "v2", None).unwrap();
        clock.advance(Duration::from_secs(10));

        assert_eq!(store.scalar_get("k").unwrap(), Some("v2".to_string()));
    }

    #[test]
    fn test_multi_delete_counts_live_keys_only() {
        let (store, clock) = store_with_clock();

        store.scalar_set("a", "1", None).unwrap();
        store.scalar_set("b", "2", Some(1)).unwrap();
        clock.advance(Duration::from_secs(2));

        let keys = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        assert_eq!(store.multi_delete(&keys).unwrap(), 1);
        assert_eq!(store.multi_delete(&keys).unwrap(), 0);
    }

    #[test]
    fn test_sorted_set_add_updates_score() {
        let store = MemoryStore::new();

        store
            .sorted_set_add("s", &members(&[("a", 1.0), ("b", 2.0)]))
            .unwrap();
        store.sorted_set_add("s", &members(&[("a", 3.0)])).unwrap();

        assert_eq!(store.sorted_set_cardinality("s").unwrap(), 2);
        assert_eq!(store.sorted_set_score("s", "a").unwrap(), Some(3.0));
        assert_eq!(
            store
                .sorted_set_range_by_score("s", f64::NEG_INFINITY, f64::INFINITY, None)
                .unwrap(),
            vec!["b".to_string(), "a".to_string()]
        );
    }

    #[test]
    fn test_sorted_set_range_is_inclusive_and_limited() {
        let store = MemoryStore::new();
        store
            .sorted_set_add(
                "s",
                &members(&[("a", 1.0), ("b", 2.0), ("c", 3.0), ("d", 4.0)]),
            )
            .unwrap();

        assert_eq!(
            store.sorted_set_range_by_score("s", 2.0, 3.0, None).unwrap(),
            vec!["b".to_string(), "c".to_string()]
        );
        assert_eq!(
            store
                .sorted_set_range_by_score("s", f64::NEG_INFINITY, 10.0, Some(3))
                .unwrap(),
            vec!["a".to_string(), "b".to_string(), "c".to_string()]
        );
        assert!(store
            .sorted_set_range_by_score("s", 5.0, 6.0, None)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_sorted_set_ties_ordered_by_member() {
        let store = MemoryStore::new();
        store
            .sorted_set_add("s", &members(&[("z", 1.0), ("m", 1.0), ("a", 1.0)]))
            .unwrap();

        assert_eq!(
            store.sorted_set_range_by_score("s", 1.0, 1.0, Some(2)).unwrap(),
            vec!["a".to_string(), "m".to_string()]
        );
    }

    #[test]
    fn test_sorted_set_remove() {
        let store = MemoryStore::new();
        store
            .sorted_set_add("s", &members(&[("a", 1.0), ("b", 2.0)]))
            .unwrap();

        let removed = store
            .sorted_set_remove("s", &["a".to_string(), "nope".to_string()])
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(store.sorted_set_cardinality("s").unwrap(), 1);

        store.sorted_set_remove("s", &["b".to_string()]).unwrap();
        assert_eq!(store.sorted_set_cardinality("s").unwrap(), 0);
        assert_eq!(store.sorted_set_remove("missing", &["a".to_string()]).unwrap(), 0);
    }

    #[test]
    fn test_missing_set_reads_empty() {
        let store = MemoryStore::new();

        assert_eq!(store.sorted_set_cardinality("none").unwrap(), 0);
        assert_eq!(store.sorted_set_score("none", "a").unwrap(), None);
        assert!(store
            .sorted_set_range_by_score("none", 0.0, 1.0, None)
            .unwrap()
            .is_empty());
    }
}
