//! Deterministic scoring and decision functions.
//!
//! Converts raw game signals (correctness, response latency, match
//! recency) into bounded decision values. Pure and stateless; all weights
//! and thresholds come from the config object passed at construction.

use chrono::{DateTime, Utc};

use crate::types::{Confidence, ConversationMatch, Difficulty};

/// Configuration for the scoring engine.
///
/// Weights are `[correctness, speed, recency]` and must sum to 1.0; the
/// engine does not normalize misconfigured weights.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub weights: [f32; 3],
    /// Response time at or beyond which the speed component is 0.
    pub response_time_threshold_ms: i64,
    /// Quality score substituted when the judge output is unparseable.
    pub default_quality_score: i64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: [0.5, 0.3, 0.2],
            response_time_threshold_ms: 5000,
            default_quality_score: 50,
        }
    }
}

impl ScoringConfig {
    /// Validate that weights sum to approximately 1.0.
    pub fn validate(&self) -> Result<(), &'static str> {
        let sum: f32 = self.weights.iter().sum();
        if (sum - 1.0).abs() > 0.01 {
            return Err("evaluation weights should sum to 1.0");
        }
        if self.weights.iter().any(|w| *w < 0.0) {
            return Err("evaluation weights must be non-negative");
        }
        Ok(())
    }
}

/// Pure scoring functions over game signals.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    config: ScoringConfig,
}

impl ScoringEngine {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Weighted retention score in [0, 1].
    ///
    /// Components: correctness (1.0 or 0.0), a linearly decaying speed
    /// score (1.0 at 0 ms, 0.0 at/after the threshold), and a constant
    /// recency term of 1.0.
    pub fn retention_score(&self, correct: bool, response_time_ms: i64) -> f32 {
        let [w_correct, w_speed, w_recency] = self.config.weights;
        let threshold = self.config.response_time_threshold_ms;

        let correct_score = if correct { 1.0 } else { 0.0 };

        let time_score = if response_time_ms >= threshold {
            0.0
        } else {
            (threshold - response_time_ms.max(0)) as f32 / threshold as f32
        };

        // Recency is constant in the current product behavior.
        let recency_score = 1.0;

        w_correct * correct_score + w_speed * time_score + w_recency * recency_score
    }

    /// Confidence tier: high at >= 0.8, medium at >= 0.5, else low.
    pub fn confidence(&self, score: f32) -> Confidence {
        if score >= 0.8 {
            Confidence::High
        } else if score >= 0.5 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }

    /// Human-readable recommendation for the retention score.
    pub fn recommendation(&self, score: f32) -> &'static str {
        if score >= 0.9 {
            "You remember this topic very well."
        } else if score >= 0.7 {
            "You remember this topic fairly well."
        } else if score >= 0.5 {
            "You remember parts of this topic. A review is recommended."
        } else {
            "You are not retaining this topic well. Please review it often."
        }
    }

    /// Next-question difficulty suggestion.
    ///
    /// Higher retention escalates difficulty (spaced-repetition challenge
    /// increase): >= 0.8 hard, >= 0.5 medium, else easy.
    pub fn next_difficulty(&self, score: f32) -> Difficulty {
        if score >= 0.8 {
            Difficulty::Hard
        } else if score >= 0.5 {
            Difficulty::Medium
        } else {
            Difficulty::Easy
        }
    }

    /// Saturate an externally produced quality score into [0, 100].
    pub fn clamp_quality(&self, raw: i64) -> i64 {
        raw.clamp(0, 100)
    }

    /// Quality score used when the judge output cannot be parsed.
    pub fn default_quality(&self) -> i64 {
        self.config.default_quality_score
    }

    /// Session difficulty from an explicit hint or the recency of matches.
    ///
    /// A valid hint wins outright. Otherwise: more than half of the
    /// matches younger than one day means the material is fresh (easy),
    /// some recent means medium, none recent means hard. Zero matches
    /// defaults to easy; the minimum-matches precondition is enforced
    /// elsewhere.
    pub fn determine_difficulty(
        &self,
        hint: Option<Difficulty>,
        matches: &[ConversationMatch],
        now: DateTime<Utc>,
    ) -> Difficulty {
        if let Some(d) = hint {
            return d;
        }

        if matches.is_empty() {
            return Difficulty::Easy;
        }

        let recent = matches
            .iter()
            .filter(|m| (now - m.timestamp).num_hours() < 24)
            .count();

        if recent > matches.len() / 2 {
            Difficulty::Easy
        } else if recent > 0 {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }

    /// Per-question difficulty stamp from the source conversation's age.
    pub fn difficulty_from_age(&self, days_since: i64) -> Difficulty {
        if days_since == 0 {
            Difficulty::Easy
        } else if days_since <= 7 {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }
}

impl Default for ScoringEngine {
    fn default() -> Self {
        Self::new(ScoringConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn match_aged(hours: i64) -> ConversationMatch {
        ConversationMatch {
            conversation_id: format!("c-{}", hours),
            score: 0.5,
            timestamp: Utc::now() - Duration::hours(hours),
            messages: vec![],
        }
    }

    #[test]
    fn test_retention_time_component_boundaries() {
        let engine = ScoringEngine::default();

        // At/after the threshold the speed component is exactly 0:
        // incorrect answer leaves only the recency term (weight 0.2).
        let at_threshold = engine.retention_score(false, 5000);
        assert!((at_threshold - 0.2).abs() < f32::EPSILON);
        let past_threshold = engine.retention_score(false, 60_000);
        assert!((past_threshold - 0.2).abs() < f32::EPSILON);

        // At 0 ms the speed component is exactly 1: correct answer with
        // instant response scores the full 1.0.
        let instant = engine.retention_score(true, 0);
        assert!((instant - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_retention_score_midpoint() {
        let engine = ScoringEngine::default();
        // 2500 ms is half the threshold: 0.5 + 0.3*0.5 + 0.2 = 0.85
        let score = engine.retention_score(true, 2500);
        assert!((score - 0.85).abs() < 1e-6);
    }

    #[test]
    fn test_confidence_tiers() {
        let engine = ScoringEngine::default();
        assert_eq!(engine.confidence(0.8), Confidence::High);
        assert_eq!(engine.confidence(0.95), Confidence::High);
        assert_eq!(engine.confidence(0.79), Confidence::Medium);
        assert_eq!(engine.confidence(0.5), Confidence::Medium);
        assert_eq!(engine.confidence(0.49), Confidence::Low);
        assert_eq!(engine.confidence(0.0), Confidence::Low);
    }

    #[test]
    fn test_next_difficulty_escalates_with_retention() {
        let engine = ScoringEngine::default();
        assert_eq!(engine.next_difficulty(0.9), Difficulty::Hard);
        assert_eq!(engine.next_difficulty(0.8), Difficulty::Hard);
        assert_eq!(engine.next_difficulty(0.6), Difficulty::Medium);
        assert_eq!(engine.next_difficulty(0.2), Difficulty::Easy);
    }

    #[test]
    fn test_clamp_quality_saturates() {
        let engine = ScoringEngine::default();
        assert_eq!(engine.clamp_quality(150), 100);
        assert_eq!(engine.clamp_quality(-5), 0);
        assert_eq!(engine.clamp_quality(72), 72);
    }

    #[test]
    fn test_determine_difficulty_hint_wins() {
        let engine = ScoringEngine::default();
        let matches = vec![match_aged(1), match_aged(2)];
        assert_eq!(
            engine.determine_difficulty(Some(Difficulty::Hard), &matches, Utc::now()),
            Difficulty::Hard
        );
    }

    #[test]
    fn test_determine_difficulty_mostly_recent_is_easy() {
        let engine = ScoringEngine::default();
        // 3 of 4 matches younger than 24h.
        let matches = vec![match_aged(1), match_aged(5), match_aged(10), match_aged(72)];
        assert_eq!(
            engine.determine_difficulty(None, &matches, Utc::now()),
            Difficulty::Easy
        );
    }

    #[test]
    fn test_determine_difficulty_none_recent_is_hard() {
        let engine = ScoringEngine::default();
        let matches = vec![
            match_aged(48),
            match_aged(72),
            match_aged(96),
            match_aged(240),
        ];
        assert_eq!(
            engine.determine_difficulty(None, &matches, Utc::now()),
            Difficulty::Hard
        );
    }

    #[test]
    fn test_determine_difficulty_some_recent_is_medium() {
        let engine = ScoringEngine::default();
        let matches = vec![match_aged(1), match_aged(48), match_aged(96)];
        assert_eq!(
            engine.determine_difficulty(None, &matches, Utc::now()),
            Difficulty::Medium
        );
    }

    #[test]
    fn test_determine_difficulty_empty_defaults_easy() {
        let engine = ScoringEngine::default();
        assert_eq!(
            engine.determine_difficulty(None, &[], Utc::now()),
            Difficulty::Easy
        );
    }

    #[test]
    fn test_difficulty_from_age() {
        let engine = ScoringEngine::default();
        assert_eq!(engine.difficulty_from_age(0), Difficulty::Easy);
        assert_eq!(engine.difficulty_from_age(7), Difficulty::Medium);
        assert_eq!(engine.difficulty_from_age(8), Difficulty::Hard);
    }

    #[test]
    fn test_weight_validation() {
        assert!(ScoringConfig::default().validate().is_ok());

        let bad = ScoringConfig {
            weights: [0.5, 0.5, 0.5],
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
