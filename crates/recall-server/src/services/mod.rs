//! Request orchestrators behind the HTTP surface.

mod analysis;
mod chat;
mod game;

pub use analysis::{AnalysisResponse, AnalysisService, ReportResponse};
pub use chat::{ChatResponse, ChatService, ContextUsed, ProcessedChat};
pub use game::{EvaluatedResult, GameResultResponse, GameService};
