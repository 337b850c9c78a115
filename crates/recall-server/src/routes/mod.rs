//! Route definitions for the REST API.

mod analysis;
mod chat;
mod game;
mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Chat
        .route("/api/chat", post(chat::chat))
        // Game
        .route("/api/game/question", post(game::generate_question))
        .route("/api/game/result", post(game::submit_result))
        // Analysis
        .route("/api/analysis", post(analysis::analyze))
        .route("/api/analysis/domains", post(analysis::analyze_domains))
        .route("/api/analysis/report", post(analysis::generate_report))
        // Attach state
        .with_state(state)
}

pub use analysis::*;
pub use chat::*;
pub use game::*;
pub use health::*;
