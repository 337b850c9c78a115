//! recall-server - REST API server for recall.
//!
//! Exposes the memory-augmented chat, memory-game, and analysis
//! operations over HTTP with a uniform response envelope.
//!
//! # Example
//!
//! ```ignore
//! use recall_server::{create_server, AppState};
//!
//! let app = create_server(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, app).await.unwrap();
//! ```

pub mod envelope;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

pub use envelope::ApiEnvelope;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
}
