//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::{CacheValue, TrimReport};

/// Response body for GET /get/:key and GET /peek/:key
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub value: CacheValue,
}

impl GetResponse {
    /// Creates a new GetResponse
    pub fn new(key: impl Into<String>, value: CacheValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
}

impl SetResponse {
    /// Creates a new SetResponse
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' set successfully", key),
            key,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// The key that was deleted
    pub key: String,
    /// Whether a value existed
    pub removed: bool,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>, removed: bool) -> Self {
        Self {
            key: key.into(),
            removed,
        }
    }
}

/// Response body for POST /trim
#[derive(Debug, Clone, Serialize)]
pub struct TrimResponse {
    pub reaped: usize,
    pub evicted: usize,
}

impl From<TrimReport> for TrimResponse {
    fn from(report: TrimReport) -> Self {
        Self {
            reaped: report.reaped,
            evicted: report.evicted,
        }
    }
}

/// Response body for POST /reap
#[derive(Debug, Clone, Serialize)]
pub struct ReapResponse {
    pub reaped: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Cache namespace
    pub namespace: String,
    /// Entry-count limit (0 = unbounded)
    pub limit: u64,
    /// Per-entry TTL in seconds (0 = none)
    pub ttl: u64,
    /// Entries currently tracked by the recency index
    pub entries: usize,
    /// When trimming happens
    pub trim_policy: String,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_response_keeps_value_type() {
        let resp = GetResponse::new("n", CacheValue::Int(3));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["key"], "n");
        assert_eq!(json["value"], 3);
    }

    #[test]
    fn test_set_response_serialize() {
        let resp = SetResponse::new("my_key");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("my_key"));
        assert!(json.contains("successfully"));
    }

    #[test]
    fn test_delete_response_serialize() {
        let json = serde_json::to_value(DeleteResponse::new("gone", true)).unwrap();
        assert_eq!(json["key"], "gone");
        assert_eq!(json["removed"], true);
    }

    #[test]
    fn test_trim_response_from_report() {
        let resp = TrimResponse::from(TrimReport {
            reaped: 2,
            evicted: 5,
        });
        assert_eq!(resp.reaped, 2);
        assert_eq!(resp.evicted, 5);
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }

    #[test]
    fn test_error_response_serialize() {
        let resp = ErrorResponse::new("Something went wrong");
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("error"));
        assert!(json.contains("Something went wrong"));
    }
}
