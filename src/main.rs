//! Sorted-set LRU cache server
//!
//! Serves an LRU cache with TTL expiry over HTTP, backed by the in-memory store
//! or by Redis when built with `redis-backend` and `REDIS_URL` is set.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sortedset_lru::api::{create_router, AppState};
use sortedset_lru::store::{MemoryStore, OrderedStore};
use sortedset_lru::{spawn_maintenance_task, Config};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Connect the store and build the cache
/// 4. Start background maintenance task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sortedset_lru=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting sorted-set LRU cache server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: namespace={}, limit={}, ttl={}s, trim_policy={}, port={}, maintenance_interval={}s",
        config.namespace,
        config.limit,
        config.ttl,
        config.trim_policy,
        config.server_port,
        config.maintenance_interval
    );

    let store = build_store(&config)?;
    let state = AppState::from_config(store, config.cache_config())
        .context("invalid cache configuration")?;
    info!(
        recency_index = %state.cache.index_names().recency,
        expiry_index = %state.cache.index_names().expiry,
        "Cache initialized"
    );

    let maintenance_handle = if config.maintenance_interval > 0 {
        Some(spawn_maintenance_task(
            state.cache.clone(),
            config.maintenance_interval,
        ))
    } else {
        info!("Maintenance task disabled");
        None
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(maintenance_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Picks the store backend from configuration.
fn build_store(config: &Config) -> anyhow::Result<Arc<dyn OrderedStore>> {
    match &config.redis_url {
        #[cfg(feature = "redis-backend")]
        Some(url) => {
            let store = sortedset_lru::store::RedisStore::connect(url)
                .with_context(|| format!("failed to connect to {}", url))?;
            info!("Using Redis store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "redis-backend"))]
        Some(_) => {
            warn!("REDIS_URL is set but redis-backend is not compiled in; using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
        None => {
            info!("Using in-memory store");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the maintenance task and allows graceful shutdown.
async fn shutdown_signal(maintenance_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = maintenance_handle {
        handle.abort();
        warn!("Maintenance task aborted");
    }
}
