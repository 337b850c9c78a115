//! Error types for recall operations.
//!
//! Structured error codes distinguish transport failures from the two
//! external systems, malformed upstream payloads, and the user-visible
//! insufficient-data condition.

use thiserror::Error;

/// Result type alias for recall operations.
pub type RecallResult<T> = Result<T, RecallError>;

/// Main error type for all recall operations.
#[derive(Error, Debug)]
pub enum RecallError {
    /// Memory/retrieval store request failed (network or non-2xx).
    #[error("Upstream error: {message}")]
    Upstream {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Completion provider request failed (transport or empty response).
    #[error("Completion error: {message}")]
    Completion {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Structured response from the completion provider was malformed.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation { message: String, code: ErrorCode },

    /// Not enough conversation history for question generation.
    #[error("Insufficient data: need at least {needed} conversations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Upstream store (UPS_xxx)
    UpstreamConnectionFailed,
    UpstreamBadStatus,
    UpstreamTimeout,

    // Completion provider (LLM_xxx)
    LlmConnectionFailed,
    LlmEmptyResponse,

    // Parse (PARSE_xxx)
    ParseInvalidJson,
    ParseMissingField,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,

    // Game (GAME_xxx)
    InsufficientData,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UpstreamConnectionFailed => "UPS_001",
            ErrorCode::UpstreamBadStatus => "UPS_002",
            ErrorCode::UpstreamTimeout => "UPS_003",
            ErrorCode::LlmConnectionFailed => "LLM_001",
            ErrorCode::LlmEmptyResponse => "LLM_002",
            ErrorCode::ParseInvalidJson => "PARSE_001",
            ErrorCode::ParseMissingField => "PARSE_002",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::InsufficientData => "GAME_001",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl RecallError {
    /// Create an upstream store error.
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            code: ErrorCode::UpstreamConnectionFailed,
            source: None,
        }
    }

    /// Create an upstream timeout error.
    pub fn upstream_timeout(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            code: ErrorCode::UpstreamTimeout,
            source: None,
        }
    }

    /// Create a completion provider error.
    pub fn completion(message: impl Into<String>) -> Self {
        Self::Completion {
            message: message.into(),
            code: ErrorCode::LlmConnectionFailed,
            source: None,
        }
    }

    /// Create an empty-response completion error.
    pub fn empty_completion() -> Self {
        Self::Completion {
            message: "no choices returned from completion provider".to_string(),
            code: ErrorCode::LlmEmptyResponse,
            source: None,
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidJson,
        }
    }

    /// Create a missing-field parse error.
    pub fn missing_field(field: &str) -> Self {
        Self::Parse {
            message: format!("response missing required field '{}'", field),
            code: ErrorCode::ParseMissingField,
        }
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
        }
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Upstream { code, .. } => *code,
            Self::Completion { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::InsufficientData { .. } => ErrorCode::InsufficientData,
            _ => ErrorCode::Internal,
        }
    }

    /// Convert from an HTTP status returned by the memory store.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        Self::Upstream {
            message: format!("HTTP {}: {}", status, body),
            code: ErrorCode::UpstreamBadStatus,
            source: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_code() {
        let err = RecallError::InsufficientData { needed: 5, got: 2 };
        assert_eq!(err.code(), ErrorCode::InsufficientData);
        assert!(err.to_string().contains("at least 5"));
    }

    #[test]
    fn test_missing_field_error() {
        let err = RecallError::missing_field("correct_answer");
        assert_eq!(err.code(), ErrorCode::ParseMissingField);
        assert!(err.to_string().contains("correct_answer"));
    }

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::UpstreamBadStatus.as_str(), "UPS_002");
        assert_eq!(ErrorCode::InsufficientData.as_str(), "GAME_001");
    }
}
