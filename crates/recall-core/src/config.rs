//! Application configuration loaded from the environment.

use std::time::Duration;

use tracing::warn;

use crate::error::{RecallError, RecallResult};
use crate::scoring::ScoringConfig;

/// Configuration for the whole application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Deployment environment name (development, production).
    pub environment: String,

    /// Base URL of the memory/retrieval store.
    pub memory_server_url: String,
    /// Per-lookup timeout for memory store calls.
    pub memory_server_timeout: Duration,

    /// OpenAI API key (required).
    pub openai_api_key: String,
    /// Completion model.
    pub openai_model: String,
    /// Default sampling temperature.
    pub openai_temperature: f32,
    /// Default max completion tokens.
    pub openai_max_tokens: u32,

    /// Minimum conversation matches required to generate a question.
    pub min_conversations_for_game: usize,
    /// Time-to-live for cached questions.
    pub question_cache_ttl: Duration,
    /// Interval between reaper passes.
    pub cache_reaper_interval: Duration,
    /// Retention-score weights: [correctness, speed, recency].
    pub evaluation_weights: [f32; 3],

    /// Deadline for detached saves dispatched after a response.
    pub save_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: "development".to_string(),
            memory_server_url: "http://localhost:8080".to_string(),
            memory_server_timeout: Duration::from_millis(5000),
            openai_api_key: String::new(),
            openai_model: "gpt-4".to_string(),
            openai_temperature: 0.7,
            openai_max_tokens: 3000,
            min_conversations_for_game: 5,
            question_cache_ttl: Duration::from_secs(300),
            cache_reaper_interval: Duration::from_secs(60),
            evaluation_weights: [0.5, 0.3, 0.2],
            save_timeout: Duration::from_millis(5000),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads:
    /// - `PORT` (default: 3000)
    /// - `ENVIRONMENT` (default: development)
    /// - `MEMORY_SERVER_URL` (default: http://localhost:8080)
    /// - `MEMORY_SERVER_TIMEOUT_MS` (default: 5000)
    /// - `OPENAI_API_KEY` (required)
    /// - `OPENAI_MODEL` (default: gpt-4)
    /// - `OPENAI_TEMPERATURE` (default: 0.7)
    /// - `OPENAI_MAX_TOKENS` (default: 3000)
    /// - `MIN_CONVERSATIONS_FOR_GAME` (default: 5)
    /// - `QUESTION_CACHE_TTL_SECS` (default: 300)
    /// - `CACHE_REAPER_INTERVAL_SECS` (default: 60)
    /// - `EVALUATION_WEIGHTS` (default: "0.5,0.3,0.2")
    /// - `SAVE_TIMEOUT_MS` (default: 5000)
    pub fn from_env() -> RecallResult<Self> {
        let mut config = Self {
            port: env_parsed("PORT", 3000),
            environment: env_or("ENVIRONMENT", "development"),
            memory_server_url: env_or("MEMORY_SERVER_URL", "http://localhost:8080"),
            memory_server_timeout: Duration::from_millis(env_parsed(
                "MEMORY_SERVER_TIMEOUT_MS",
                5000,
            )),
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            openai_model: env_or("OPENAI_MODEL", "gpt-4"),
            openai_temperature: env_parsed("OPENAI_TEMPERATURE", 0.7),
            openai_max_tokens: env_parsed("OPENAI_MAX_TOKENS", 3000),
            min_conversations_for_game: env_parsed("MIN_CONVERSATIONS_FOR_GAME", 5),
            question_cache_ttl: Duration::from_secs(env_parsed("QUESTION_CACHE_TTL_SECS", 300)),
            cache_reaper_interval: Duration::from_secs(env_parsed(
                "CACHE_REAPER_INTERVAL_SECS",
                60,
            )),
            evaluation_weights: [0.5, 0.3, 0.2],
            save_timeout: Duration::from_millis(env_parsed("SAVE_TIMEOUT_MS", 5000)),
        };

        if let Ok(raw) = std::env::var("EVALUATION_WEIGHTS") {
            if let Some(weights) = parse_weights(&raw) {
                config.evaluation_weights = weights;
            } else {
                warn!(raw = %raw, "EVALUATION_WEIGHTS is malformed, keeping defaults");
            }
        }

        // Validity of the weights is the operator's responsibility; flag
        // a suspicious triple instead of rejecting it.
        if let Err(reason) = config.scoring().validate() {
            warn!(
                weights = ?config.evaluation_weights,
                reason,
                "EVALUATION_WEIGHTS failed validation"
            );
        }

        if config.openai_api_key.is_empty() {
            return Err(RecallError::Configuration(
                "OPENAI_API_KEY environment variable is required".to_string(),
            ));
        }

        Ok(config)
    }

    /// Scoring configuration derived from the loaded weights.
    pub fn scoring(&self) -> ScoringConfig {
        ScoringConfig {
            weights: self.evaluation_weights,
            ..ScoringConfig::default()
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Parse a "0.5,0.3,0.2" weight triple; malformed input yields `None`
/// and the caller keeps the defaults.
fn parse_weights(raw: &str) -> Option<[f32; 3]> {
    let parts: Vec<f32> = raw
        .split(',')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<_>>()?;

    if parts.len() == 3 {
        Some([parts[0], parts[1], parts[2]])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_weights() {
        assert_eq!(parse_weights("0.5,0.3,0.2"), Some([0.5, 0.3, 0.2]));
        assert_eq!(parse_weights("0.6, 0.2, 0.2"), Some([0.6, 0.2, 0.2]));
        assert_eq!(parse_weights("0.5,0.5"), None);
        assert_eq!(parse_weights("a,b,c"), None);
    }

    #[test]
    fn test_unbalanced_weights_flagged_but_kept() {
        // A triple that parses but does not sum to 1.0 is passed through
        // to the engine unchanged; loading only warns.
        let config = AppConfig {
            evaluation_weights: [0.5, 0.5, 0.5],
            ..AppConfig::default()
        };

        let scoring = config.scoring();
        assert_eq!(scoring.weights, [0.5, 0.5, 0.5]);
        assert!(scoring.validate().is_err());
    }

    #[test]
    fn test_default_config_scoring() {
        let config = AppConfig::default();
        let scoring = config.scoring();
        assert!(scoring.validate().is_ok());
        assert_eq!(scoring.response_time_threshold_ms, 5000);
    }
}
