//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;
use crate::store::StoreError;

// == Operation ==
/// Public cache operation in progress when an error occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Peek,
    Set,
    Delete,
    TrimToLimit,
    ReapExpired,
    Inspect,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::Get => "get",
            Operation::Peek => "peek",
            Operation::Set => "set",
            Operation::Delete => "delete",
            Operation::TrimToLimit => "trim_to_limit",
            Operation::ReapExpired => "reap_expired",
            Operation::Inspect => "inspect",
        };
        f.write_str(name)
    }
}

// == Step ==
/// Individual store call within an operation's apply sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ReadValue,
    WriteValue,
    DeleteValues,
    TouchRecency,
    WriteExpiry,
    RemoveRecency,
    RemoveExpiry,
    CountRecency,
    RangeRecency,
    RangeExpiry,
    ReadScore,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::ReadValue => "read value",
            Step::WriteValue => "write value",
            Step::DeleteValues => "delete values",
            Step::TouchRecency => "touch recency index",
            Step::WriteExpiry => "write expiry index",
            Step::RemoveRecency => "remove from recency index",
            Step::RemoveExpiry => "remove from expiry index",
            Step::CountRecency => "count recency index",
            Step::RangeRecency => "range recency index",
            Step::RangeExpiry => "range expiry index",
            Step::ReadScore => "read index score",
        };
        f.write_str(name)
    }
}

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Rejected cache configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A store call failed; earlier calls of the same operation stay applied
    #[error("Store call '{step}' failed during {operation} (keys: {keys:?}): {source}")]
    Store {
        operation: Operation,
        step: Step,
        keys: Vec<String>,
        #[source]
        source: StoreError,
    },

    /// An index holds a member from outside this cache's namespace
    #[error("Invariant violation: index member '{member}' is outside namespace '{namespace}'")]
    InvariantViolation { namespace: String, member: String },

    /// A stored value is not a valid cache value encoding
    #[error("Failed to decode value for key '{key}': {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// Key not found in cache
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// True when the failure came from an unreachable store.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            CacheError::Store {
                source: StoreError::Unavailable(_),
                ..
            }
        )
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            err if err.is_unavailable() => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Store { .. } => StatusCode::BAD_GATEWAY,
            CacheError::InvalidConfiguration(_)
            | CacheError::InvariantViolation { .. }
            | CacheError::Decode { .. }
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn store_error(source: StoreError) -> CacheError {
        CacheError::Store {
            operation: Operation::Set,
            step: Step::TouchRecency,
            keys: vec!["c:a".to_string()],
            source,
        }
    }

    #[test]
    fn test_store_error_message_names_operation_step_and_keys() {
        let err = store_error(StoreError::OperationFailed("WRONGTYPE".to_string()));
        let message = err.to_string();

        assert!(message.contains("set"));
        assert!(message.contains("touch recency index"));
        assert!(message.contains("c:a"));
        assert!(message.contains("WRONGTYPE"));
    }

    #[test]
    fn test_is_unavailable() {
        assert!(store_error(StoreError::Unavailable("refused".to_string())).is_unavailable());
        assert!(!store_error(StoreError::OperationFailed("bad".to_string())).is_unavailable());
        assert!(!CacheError::NotFound("k".to_string()).is_unavailable());
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (CacheError::NotFound("k".to_string()), StatusCode::NOT_FOUND),
            (
                CacheError::InvalidRequest("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                store_error(StoreError::Unavailable("down".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                store_error(StoreError::OperationFailed("bad".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                CacheError::InvariantViolation {
                    namespace: "c".to_string(),
                    member: "x:a".to_string(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
