//! Server state management.

use std::sync::Arc;

use recall_core::cache::QuestionCache;
use recall_core::config::AppConfig;
use recall_core::scoring::ScoringEngine;
use recall_core::traits::{CompletionProvider, MemoryStore};

use crate::services::{AnalysisService, ChatService, GameService};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MemoryStore>,
    pub chat: Arc<ChatService>,
    pub game: Arc<GameService>,
    pub analysis: Arc<AnalysisService>,
}

impl AppState {
    /// Wire the services from their collaborators and configuration.
    pub fn new(
        store: Arc<dyn MemoryStore>,
        completion: Arc<dyn CompletionProvider>,
        cache: Arc<QuestionCache>,
        config: &AppConfig,
    ) -> Self {
        let scoring = ScoringEngine::new(config.scoring());

        let chat = Arc::new(ChatService::new(
            store.clone(),
            completion.clone(),
            scoring.clone(),
            config.memory_server_timeout,
            config.save_timeout,
        ));
        let game = Arc::new(GameService::new(
            store.clone(),
            completion.clone(),
            cache,
            scoring,
            config.min_conversations_for_game,
            config.save_timeout,
        ));
        let analysis = Arc::new(AnalysisService::new(
            store.clone(),
            completion,
            config.memory_server_timeout,
        ));

        Self {
            store,
            chat,
            game,
            analysis,
        }
    }
}
