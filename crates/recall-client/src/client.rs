//! REST client for the memory/retrieval store.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use recall_core::error::{RecallError, RecallResult};
use recall_core::traits::MemoryStore;
use recall_core::types::{ConversationMatch, IncorrectAttempt, ProfileFact, SaveRecord};

/// Client for the memory store's REST API.
pub struct MemoryClient {
    client: Client,
    base_url: String,
}

/// Envelope wrapping every store response.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<EnvelopeError>,
}

#[derive(Debug, Deserialize)]
struct EnvelopeError {
    code: String,
    message: String,
}

#[derive(Debug, Deserialize)]
struct SearchData {
    results: Vec<ConversationMatch>,
}

#[derive(Debug, Deserialize)]
struct SaveData {
    conversation_id: String,
}

#[derive(Debug, Deserialize)]
struct ProfileData {
    #[serde(default)]
    items: Vec<ProfileFact>,
}

#[derive(Debug, Deserialize)]
struct AttemptsData {
    #[serde(default)]
    items: Vec<IncorrectAttempt>,
}

impl MemoryClient {
    /// Create a client with the given base URL and per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RecallResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RecallError::Configuration(format!("failed to build client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Unwrap the store's `{success, data, error}` envelope.
    async fn unwrap_envelope<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> RecallResult<T> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RecallError::upstream(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(RecallError::from_http_status(status.as_u16(), &body));
        }

        let envelope: Envelope<T> = serde_json::from_str(&body)
            .map_err(|e| RecallError::upstream(format!("failed to decode response: {}", e)))?;

        if !envelope.success {
            return match envelope.error {
                Some(err) => Err(RecallError::upstream(format!(
                    "{} - {}",
                    err.code, err.message
                ))),
                None => Err(RecallError::upstream("request failed: unknown error")),
            };
        }

        envelope
            .data
            .ok_or_else(|| RecallError::upstream("response envelope missing data"))
    }
}

#[async_trait]
impl MemoryStore for MemoryClient {
    async fn search_conversations(
        &self,
        query: &str,
        limit: usize,
    ) -> RecallResult<Vec<ConversationMatch>> {
        let url = format!("{}/api/rag/conversation/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("query", query), ("top_k", &limit.to_string())])
            .send()
            .await
            .map_err(|e| RecallError::upstream(format!("failed to search conversations: {}", e)))?;

        let data: SearchData = Self::unwrap_envelope(response).await?;
        debug!(matches = data.results.len(), "Conversation search completed");
        Ok(data.results)
    }

    async fn save_conversation(&self, record: &SaveRecord) -> RecallResult<String> {
        let url = format!("{}/api/rag/conversation/store", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(record)
            .send()
            .await
            .map_err(|e| RecallError::upstream(format!("failed to save conversation: {}", e)))?;

        let data: SaveData = Self::unwrap_envelope(response).await?;
        Ok(data.conversation_id)
    }

    async fn get_profile(&self, user_id: &str) -> RecallResult<Vec<ProfileFact>> {
        let url = format!("{}/api/rag/personal-info/{}", self.base_url, user_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RecallError::upstream(format!("failed to get profile: {}", e)))?;

        let data: ProfileData = Self::unwrap_envelope(response).await?;
        Ok(data.items)
    }

    async fn get_incorrect_attempts(
        &self,
        user_id: &str,
        limit: usize,
    ) -> RecallResult<Vec<IncorrectAttempt>> {
        let url = format!("{}/api/rag/quiz/incorrect", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("user_id", user_id), ("limit", &limit.to_string())])
            .send()
            .await
            .map_err(|e| {
                RecallError::upstream(format!("failed to get incorrect attempts: {}", e))
            })?;

        let data: AttemptsData = Self::unwrap_envelope(response).await?;
        Ok(data.items)
    }

    async fn health_check(&self) -> RecallResult<bool> {
        let url = format!("{}/api/rag/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RecallError::upstream(format!("failed to check health: {}", e)))?;

        Ok(response.status().is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = MemoryClient::new("http://localhost:8080/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    #[test]
    fn test_envelope_success_decodes_data() {
        let body = r#"{
            "success": true,
            "data": {"results": [{
                "conversation_id": "c1",
                "score": 0.82,
                "timestamp": "2026-08-01T10:00:00Z",
                "messages": [{"role": "user", "content": "hello"}]
            }]}
        }"#;

        let envelope: Envelope<SearchData> = serde_json::from_str(body).unwrap();
        assert!(envelope.success);
        let data = envelope.data.unwrap();
        assert_eq!(data.results.len(), 1);
        assert_eq!(data.results[0].conversation_id, "c1");
    }

    #[test]
    fn test_envelope_error_decodes() {
        let body = r#"{
            "success": false,
            "error": {"code": "SEARCH_FAILED", "message": "index offline"}
        }"#;

        let envelope: Envelope<SearchData> = serde_json::from_str(body).unwrap();
        assert!(!envelope.success);
        let err = envelope.error.unwrap();
        assert_eq!(err.code, "SEARCH_FAILED");
        assert_eq!(err.message, "index offline");
    }
}
