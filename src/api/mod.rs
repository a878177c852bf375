//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a key-value pair
//! - `GET /get/:key` - Retrieve a value by key, marking it recently used
//! - `GET /peek/:key` - Retrieve a value without touching recency
//! - `DELETE /del/:key` - Delete a key
//! - `POST /trim` - Trim the cache to its entry limit
//! - `POST /reap` - Remove expired entries
//! - `GET /stats` - Get cache configuration and entry count
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
