//! Parsing of model responses that are expected to carry JSON payloads.
//!
//! Models frequently wrap JSON in markdown fences or surround it with
//! prose, so extraction strips those before deserializing.

use serde::Deserialize;

use recall_core::error::{RecallError, RecallResult};
use recall_core::types::{DomainScore, QuestionOption, ANALYSIS_DOMAINS};

/// Extract the JSON object embedded in a model response.
///
/// Strips markdown code fences and any leading/trailing prose, returning
/// the text between the first `{` and the last `}`.
pub fn extract_json(response: &str) -> RecallResult<&str> {
    let trimmed = response.trim();

    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.strip_suffix("```").unwrap_or(rest)
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.strip_suffix("```").unwrap_or(rest)
    } else {
        trimmed
    };

    let start = inner
        .find('{')
        .ok_or_else(|| RecallError::parse("no JSON object in completion response"))?;
    let end = inner
        .rfind('}')
        .ok_or_else(|| RecallError::parse("no JSON object in completion response"))?;
    if end < start {
        return Err(RecallError::parse("malformed JSON object in completion response"));
    }

    Ok(&inner[start..=end])
}

/// Raw question payload as the generation prompts request it.
#[derive(Debug, Clone, Deserialize)]
pub struct QuestionPayload {
    pub question: String,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    pub correct_answer: String,
}

/// Parse and validate a generated question payload.
///
/// The question text, at least one option, and a correct answer must all
/// be present.
pub fn parse_question_payload(response: &str) -> RecallResult<QuestionPayload> {
    let json = extract_json(response)?;
    let payload: QuestionPayload = serde_json::from_str(json)
        .map_err(|e| RecallError::parse(format!("invalid question JSON: {}", e)))?;

    if payload.question.trim().is_empty() {
        return Err(RecallError::missing_field("question"));
    }
    if payload.options.is_empty() {
        return Err(RecallError::missing_field("options"));
    }
    if payload.correct_answer.trim().is_empty() {
        return Err(RecallError::missing_field("correct_answer"));
    }

    Ok(payload)
}

#[derive(Debug, Deserialize)]
struct QualityPayload {
    score: i64,
    #[serde(default)]
    #[allow(dead_code)]
    reasoning: String,
}

/// Parse a quality-judge response into a score clamped to `[0, 100]`.
///
/// Returns `None` when the response is not parseable; callers substitute
/// their configured default score.
pub fn parse_quality_response(response: &str) -> Option<i64> {
    let json = extract_json(response).ok()?;
    let payload: QualityPayload = serde_json::from_str(json).ok()?;
    Some(payload.score.clamp(0, 100))
}

#[derive(Debug, Deserialize)]
struct DomainsPayload {
    domains: Vec<DomainScore>,
}

/// Parse a domain-analysis response into per-domain scores.
///
/// Every expected domain must be present; scores are clamped to
/// `[0, 100]` and unknown domains are rejected.
pub fn parse_domain_scores(response: &str) -> RecallResult<Vec<DomainScore>> {
    let json = extract_json(response)?;
    let payload: DomainsPayload = serde_json::from_str(json)
        .map_err(|e| RecallError::parse(format!("invalid domain analysis JSON: {}", e)))?;

    for score in &payload.domains {
        if !ANALYSIS_DOMAINS.contains(&score.domain.as_str()) {
            return Err(RecallError::parse(format!(
                "unknown analysis domain: {}",
                score.domain
            )));
        }
    }
    for expected in ANALYSIS_DOMAINS {
        if !payload.domains.iter().any(|d| d.domain == expected) {
            return Err(RecallError::missing_field(expected));
        }
    }

    let domains = payload
        .domains
        .into_iter()
        .map(|mut d| {
            d.score = d.score.clamp(0, 100);
            d
        })
        .collect();

    Ok(domains)
}
