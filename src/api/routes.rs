//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    delete_handler, get_handler, health_handler, peek_handler, reap_handler, set_handler,
    stats_handler, trim_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/peek/:key", get(peek_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/trim", post(trim_handler))
        .route("/reap", post(reap_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use crate::store::MemoryStore;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use std::sync::Arc;
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state =
            AppState::from_config(Arc::new(MemoryStore::new()), CacheConfig::new("r", 100))
                .unwrap();
        create_router(state)
    }

    async fn status_of(request: Request<Body>) -> StatusCode {
        create_test_app().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let request = Request::builder().uri("/stats").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_set_endpoint() {
        let request = Request::builder()
            .method("PUT")
            .uri("/set")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"key":"test","value":"hello"}"#))
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let request = Request::builder()
            .uri("/get/nonexistent")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_trim_and_reap_require_post() {
        let request = Request::builder().uri("/trim").body(Body::empty()).unwrap();
        assert_eq!(status_of(request).await, StatusCode::METHOD_NOT_ALLOWED);

        let request = Request::builder()
            .method("POST")
            .uri("/reap")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(request).await, StatusCode::OK);
    }
}
