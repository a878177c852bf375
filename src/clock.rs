//! Time Provider Module
//!
//! Single source of wall-clock time for the cache engine and the in-memory store.
//! Recency and expiry scores are UNIX timestamps in seconds, so this is wall
//! clock time rather than a monotonic clock.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;

// == Time Provider ==
/// Supplies the current wall-clock time.
///
/// Allows tests to control time instead of sleeping.
pub trait TimeProvider: Send + Sync {
    /// Current UNIX time in milliseconds.
    fn now_ms(&self) -> u64;

    /// Current UNIX time in seconds, with millisecond resolution.
    fn now_secs(&self) -> f64 {
        self.now_ms() as f64 / 1000.0
    }
}

impl<T: TimeProvider + ?Sized> TimeProvider for Arc<T> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

// == System Time Provider ==
/// Reads the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeProvider;

impl SystemTimeProvider {
    pub fn new() -> Self {
        Self
    }
}

impl TimeProvider for SystemTimeProvider {
    fn now_ms(&self) -> u64 {
        // A clock set before 1970 reads as the epoch.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

// == Mock Time Provider ==
/// Manually driven clock for tests.
///
/// Clones share the same underlying time, so a clock handed to a store and an
/// engine can be advanced from one place.
#[derive(Debug, Clone)]
pub struct MockTimeProvider {
    current_ms: Arc<RwLock<u64>>,
}

impl MockTimeProvider {
    /// Creates a clock frozen at `start_ms` UNIX milliseconds.
    pub fn new(start_ms: u64) -> Self {
        Self {
            current_ms: Arc::new(RwLock::new(start_ms)),
        }
    }

    /// Creates a clock frozen at `start_secs` UNIX seconds.
    pub fn at_secs(start_secs: u64) -> Self {
        Self::new(start_secs * 1000)
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current_ms.write();
        *current += by.as_millis() as u64;
    }
}

impl Default for MockTimeProvider {
    fn default() -> Self {
        Self::new(SystemTimeProvider.now_ms())
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_ms(&self) -> u64 {
        *self.current_ms.read()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_is_after_2020() {
        let now = SystemTimeProvider::new().now_secs();
        assert!(now > 1_577_836_800.0);
    }

    #[test]
    fn test_mock_time_advance() {
        let clock = MockTimeProvider::at_secs(100);
        assert_eq!(clock.now_ms(), 100_000);

        clock.advance(Duration::from_millis(1500));
        assert_eq!(clock.now_ms(), 101_500);
        assert_eq!(clock.now_secs(), 101.5);
    }

    #[test]
    fn test_mock_time_clones_share_state() {
        let clock = MockTimeProvider::at_secs(10);
        let shared = clock.clone();

        clock.advance(Duration::from_secs(5));
        assert_eq!(shared.now_ms(), 15_000);

        shared.advance(Duration::from_secs(1));
        assert_eq!(clock.now_ms(), 16_000);
    }

    #[test]
    fn test_arc_provider_delegates() {
        let clock = Arc::new(MockTimeProvider::at_secs(42));
        assert_eq!(TimeProvider::now_ms(&clock), 42_000);
    }
}
