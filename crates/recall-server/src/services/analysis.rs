//! Memory analysis orchestration.
//!
//! Produces per-domain memory-strength scores from the user's history
//! and an optional prose report for caregivers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use recall_core::error::{RecallError, RecallResult};
use recall_core::fanout::{AggregatedContext, FanOutCoordinator};
use recall_core::traits::{CompletionOptions, CompletionProvider, MemoryStore};
use recall_core::types::{ChatMessage, DomainScore, ANALYSIS_DOMAINS};
use recall_llm::{parse_domain_scores, prompts};

/// Max tokens for the structured domain-analysis completion.
const DOMAIN_ANALYSIS_MAX_TOKENS: u32 = 1500;

/// Full analysis response.
#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub user_id: String,
    pub domains: Vec<DomainScore>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    pub analyzed_at: DateTime<Utc>,
}

/// Report-only response.
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub report: String,
    pub generated_at: DateTime<Utc>,
}

/// Orchestrates domain analysis and report generation.
pub struct AnalysisService {
    fanout: FanOutCoordinator,
    completion: Arc<dyn CompletionProvider>,
}

impl AnalysisService {
    pub fn new(
        store: Arc<dyn MemoryStore>,
        completion: Arc<dyn CompletionProvider>,
        lookup_timeout: Duration,
    ) -> Self {
        Self {
            fanout: FanOutCoordinator::new(store, lookup_timeout),
            completion,
        }
    }

    /// Analyze all domains and generate the report.
    pub async fn analyze(&self, user_id: &str) -> RecallResult<AnalysisResponse> {
        let ctx = self.fanout.analysis_context(user_id).await?;
        let domains = self.domain_scores(&ctx).await?;
        let report = self.build_report(&domains).await?;

        Ok(AnalysisResponse {
            user_id: user_id.to_string(),
            domains,
            report: Some(report),
            analyzed_at: Utc::now(),
        })
    }

    /// Analyze all domains without generating the report.
    pub async fn analyze_domains_only(&self, user_id: &str) -> RecallResult<AnalysisResponse> {
        let ctx = self.fanout.analysis_context(user_id).await?;
        let domains = self.domain_scores(&ctx).await?;

        Ok(AnalysisResponse {
            user_id: user_id.to_string(),
            domains,
            report: None,
            analyzed_at: Utc::now(),
        })
    }

    /// Generate a report from caller-supplied domain scores.
    ///
    /// Exactly the four known domains must be supplied.
    pub async fn generate_report_only(
        &self,
        domains: Vec<DomainScore>,
    ) -> RecallResult<ReportResponse> {
        if domains.len() != ANALYSIS_DOMAINS.len() {
            return Err(RecallError::validation(format!(
                "expected {} domains, got {}",
                ANALYSIS_DOMAINS.len(),
                domains.len()
            )));
        }
        for expected in ANALYSIS_DOMAINS {
            if !domains.iter().any(|d| d.domain == expected) {
                return Err(RecallError::validation(format!(
                    "missing domain '{}'",
                    expected
                )));
            }
        }

        let report = self.build_report(&domains).await?;

        Ok(ReportResponse {
            report,
            generated_at: Utc::now(),
        })
    }

    async fn domain_scores(&self, ctx: &AggregatedContext) -> RecallResult<Vec<DomainScore>> {
        // The full history feeds the analysis, system turns included.
        let conversations = ctx.all_messages();
        let quizzes: Vec<String> = ctx
            .prior_mistakes
            .iter()
            .map(|a| {
                format!(
                    "[{}] {} (answered '{}', correct '{}')",
                    a.quiz.topic, a.quiz.question, a.user_answer, a.correct_answer
                )
            })
            .collect();

        let messages = [
            ChatMessage::system(prompts::domain_analysis_system_prompt()),
            ChatMessage::user(prompts::domain_analysis_user_prompt(&conversations, &quizzes)),
        ];

        let text = self
            .completion
            .complete(
                &messages,
                Some(CompletionOptions::structured(DOMAIN_ANALYSIS_MAX_TOKENS)),
            )
            .await?;

        parse_domain_scores(&text)
    }

    async fn build_report(&self, domains: &[DomainScore]) -> RecallResult<String> {
        let messages = [
            ChatMessage::system(prompts::report_system_prompt()),
            ChatMessage::user(prompts::report_user_prompt(domains)),
        ];

        self.completion.complete(&messages, None).await
    }
}
