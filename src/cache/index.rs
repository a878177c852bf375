//! Sorted Index Module
//!
//! Typed view over one sorted set in the store, used for both the recency index
//! (score = last touch) and the expiry index (score = deadline).

use crate::store::{OrderedStore, StoreResult};

// == Sorted Index ==
/// A named sorted set whose members are physical cache keys.
///
/// Lowest score = oldest touch / earliest deadline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortedIndex {
    name: String,
}

impl SortedIndex {
    // == Constructor ==
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    // == Record ==
    /// Inserts `member` or moves it to `score`.
    pub fn record<S>(&self, store: &S, member: &str, score: f64) -> StoreResult<()>
    where
        S: OrderedStore + ?Sized,
    {
        store.sorted_set_add(&self.name, &[(member.to_string(), score)])
    }

    // == Remove ==
    /// Removes members; absent members are ignored.
    pub fn remove<S>(&self, store: &S, members: &[String]) -> StoreResult<usize>
    where
        S: OrderedStore + ?Sized,
    {
        if members.is_empty() {
            return Ok(0);
        }
        store.sorted_set_remove(&self.name, members)
    }

    // == Lowest ==
    /// The `count` members with the lowest scores, lowest first.
    pub fn lowest<S>(&self, store: &S, count: usize) -> StoreResult<Vec<String>>
    where
        S: OrderedStore + ?Sized,
    {
        if count == 0 {
            return Ok(Vec::new());
        }
        store.sorted_set_range_by_score(&self.name, f64::NEG_INFINITY, f64::INFINITY, Some(count))
    }

    // == Up To ==
    /// Every member scored at or below `max`, lowest first.
    pub fn up_to<S>(&self, store: &S, max: f64) -> StoreResult<Vec<String>>
    where
        S: OrderedStore + ?Sized,
    {
        store.sorted_set_range_by_score(&self.name, f64::NEG_INFINITY, max, None)
    }

    // == Length ==
    pub fn len<S>(&self, store: &S) -> StoreResult<usize>
    where
        S: OrderedStore + ?Sized,
    {
        store.sorted_set_cardinality(&self.name)
    }

    // == Score ==
    pub fn score<S>(&self, store: &S, member: &str) -> StoreResult<Option<f64>>
    where
        S: OrderedStore + ?Sized,
    {
        store.sorted_set_score(&self.name, member)
    }
}
