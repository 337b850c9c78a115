//! OpenAI completion provider implementation.

use async_trait::async_trait;

use recall_core::error::{RecallError, RecallResult};
use recall_core::traits::{CompletionOptions, CompletionProvider};
use recall_core::types::{ChatMessage, MessageRole};

#[cfg(feature = "openai")]
use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest,
    },
    Client,
};

/// Configuration for the OpenAI provider.
#[derive(Debug, Clone)]
pub struct OpenAiLlmConfig {
    /// API key; falls back to `OPENAI_API_KEY` when `None`.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Default sampling temperature.
    pub temperature: f32,
    /// Default max completion tokens.
    pub max_tokens: u32,
    /// Optional API base override.
    pub base_url: Option<String>,
}

impl Default for OpenAiLlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 3000,
            base_url: None,
        }
    }
}

/// OpenAI completion provider.
pub struct OpenAiProvider {
    #[cfg(feature = "openai")]
    client: Client<OpenAIConfig>,
    config: OpenAiLlmConfig,
}

impl OpenAiProvider {
    /// Create a new OpenAI provider.
    pub fn new(config: OpenAiLlmConfig) -> RecallResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                RecallError::Configuration(
                    "OpenAI API key not found. Set OPENAI_API_KEY or provide api_key in config."
                        .to_string(),
                )
            })?;

        #[cfg(feature = "openai")]
        let openai_config = if let Some(ref base_url) = config.base_url {
            OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(base_url)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        #[cfg(feature = "openai")]
        let client = Client::with_config(openai_config);

        #[cfg(not(feature = "openai"))]
        let _ = api_key;

        Ok(Self {
            #[cfg(feature = "openai")]
            client,
            config,
        })
    }

    #[cfg(feature = "openai")]
    fn message_to_openai(msg: &ChatMessage) -> ChatCompletionRequestMessage {
        match msg.role {
            MessageRole::System => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: async_openai::types::ChatCompletionRequestSystemMessageContent::Text(
                        msg.content.clone(),
                    ),
                    name: None,
                })
            }
            MessageRole::User => {
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: async_openai::types::ChatCompletionRequestUserMessageContent::Text(
                        msg.content.clone(),
                    ),
                    name: None,
                })
            }
            MessageRole::Assistant => {
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content: Some(
                        async_openai::types::ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        ),
                    ),
                    name: None,
                    ..Default::default()
                })
            }
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    #[cfg(feature = "openai")]
    async fn complete(
        &self,
        messages: &[ChatMessage],
        options: Option<CompletionOptions>,
    ) -> RecallResult<String> {
        let options = options.unwrap_or_default();

        let chat_messages: Vec<ChatCompletionRequestMessage> =
            messages.iter().map(Self::message_to_openai).collect();

        let request = CreateChatCompletionRequest {
            model: self.config.model.clone(),
            messages: chat_messages,
            temperature: Some(options.temperature.unwrap_or(self.config.temperature)),
            max_tokens: Some(options.max_tokens.unwrap_or(self.config.max_tokens)),
            ..Default::default()
        };

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RecallError::completion(format!("OpenAI API error: {}", e)))?;

        let choice = response
            .choices
            .first()
            .ok_or_else(RecallError::empty_completion)?;

        choice
            .message
            .content
            .clone()
            .ok_or_else(RecallError::empty_completion)
    }

    #[cfg(not(feature = "openai"))]
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _options: Option<CompletionOptions>,
    ) -> RecallResult<String> {
        Err(RecallError::Configuration(
            "OpenAI feature not enabled. Enable the 'openai' feature.".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
