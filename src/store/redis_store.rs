//! Redis Store Module
//!
//! [`OrderedStore`] over a Redis server using the synchronous `redis` client.
//! Scalars map to `GET`/`SET`/`SETEX`/`DEL`, sorted sets to the `Z*` family.

use parking_lot::Mutex;
use redis::{Client, Commands, Connection, RedisError};
use tracing::debug;

use super::{OrderedStore, StoreError, StoreResult};

// == Redis Store ==
/// Redis-backed store holding a single connection.
///
/// Calls are serialized on the connection; run one store per worker if
/// throughput matters more than connection count.
pub struct RedisStore {
    connection: Mutex<Connection>,
}

impl RedisStore {
    // == Constructor ==
    /// Connects to the server at `url` (e.g. `redis://127.0.0.1:6379`).
    pub fn connect(url: &str) -> StoreResult<Self> {
        let client = Client::open(url).map_err(map_redis_error)?;
        let connection = client.get_connection().map_err(map_redis_error)?;
        debug!(url, "connected to redis");

        Ok(Self {
            connection: Mutex::new(connection),
        })
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

/// Splits connection-level failures from command failures.
fn map_redis_error(err: RedisError) -> StoreError {
    if err.is_io_error()
        || err.is_timeout()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
    {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::OperationFailed(err.to_string())
    }
}

/// Renders a score bound, spelling infinities the way Redis expects.
fn score_bound(score: f64) -> String {
    if score == f64::INFINITY {
        "+inf".to_string()
    } else if score == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        score.to_string()
    }
}

impl OrderedStore for RedisStore {
    fn scalar_get(&self, key: &str) -> StoreResult<Option<String>> {
        self.connection.lock().get(key).map_err(map_redis_error)
    }

    fn scalar_set(&self, key: &str, value: &str, ttl_seconds: Option<u64>) -> StoreResult<()> {
        let mut conn = self.connection.lock();
        match ttl_seconds {
            Some(seconds) => conn.set_ex::<_, _, ()>(key, value, seconds),
            None => conn.set::<_, _, ()>(key, value),
        }
        .map_err(map_redis_error)
    }

    fn multi_delete(&self, keys: &[String]) -> StoreResult<usize> {
        // DEL with no arguments is a syntax error.
        if keys.is_empty() {
            return Ok(0);
        }
        self.connection.lock().del(keys).map_err(map_redis_error)
    }

    fn sorted_set_add(&self, set: &str, members: &[(String, f64)]) -> StoreResult<()> {
        if members.is_empty() {
            return Ok(());
        }
        let items: Vec<(f64, &str)> = members
            .iter()
            .map(|(member, score)| (*score, member.as_str()))
            .collect();
        self.connection
            .lock()
            .zadd_multiple::<_, _, _, ()>(set, &items)
            .map_err(map_redis_error)
    }

    fn sorted_set_range_by_score(
        &self,
        set: &str,
        min: f64,
        max: f64,
        limit: Option<usize>,
    ) -> StoreResult<Vec<String>> {
        let (min, max) = (score_bound(min), score_bound(max));
        let mut conn = self.connection.lock();
        match limit {
            Some(count) => conn.zrangebyscore_limit(set, min, max, 0, count as isize),
            None => conn.zrangebyscore(set, min, max),
        }
        .map_err(map_redis_error)
    }

    fn sorted_set_cardinality(&self, set: &str) -> StoreResult<usize> {
        self.connection.lock().zcard(set).map_err(map_redis_error)
    }

    fn sorted_set_remove(&self, set: &str, members: &[String]) -> StoreResult<usize> {
        if members.is_empty() {
            return Ok(0);
        }
        self.connection
            .lock()
            .zrem(set, members)
            .map_err(map_redis_error)
    }

    fn sorted_set_score(&self, set: &str, member: &str) -> StoreResult<Option<f64>> {
        self.connection
            .lock()
            .zscore(set, member)
            .map_err(map_redis_error)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_bound_infinities() {
        assert_eq!(score_bound(f64::NEG_INFINITY), "-inf");
        assert_eq!(score_bound(f64::INFINITY), "+inf");
        assert_eq!(score_bound(1.5), "1.5");
    }

    #[test]
    fn test_connect_rejects_malformed_url() {
        let result = RedisStore::connect("not a url");
        assert!(result.is_err());
    }
}
