//! Domain-analysis value types.

use serde::{Deserialize, Serialize};

/// The fixed set of life domains the analysis scores.
pub const ANALYSIS_DOMAINS: [&str; 4] = ["family", "life_events", "career", "hobbies"];

/// Score and insights for one life domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainScore {
    pub domain: String,
    /// Memory-strength score in [0, 100].
    pub score: i64,
    #[serde(default)]
    pub insights: Vec<String>,
}
