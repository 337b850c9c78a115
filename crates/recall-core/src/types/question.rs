//! Question types for the memory game.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Question kind offered by the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    FillInBlank,
    MultipleChoice,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::FillInBlank => "fill_in_blank",
            QuestionType::MultipleChoice => "multiple_choice",
        }
    }
}

/// Question difficulty level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Parse a difficulty hint; anything outside the known set is `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Confidence tier for a memory evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// A single answer option with a stable identifier ("A".."D").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionOption {
    pub id: String,
    pub text: String,
}

/// Metadata stamped on a generated question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionMetadata {
    pub topic: String,
    pub memory_score: f32,
    pub days_since_conversation: i64,
}

/// Fields shared by every generated question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBody {
    pub question_id: String,
    pub question: String,
    pub options: Vec<QuestionOption>,
    pub correct_answer: String,
    pub based_on_conversation: String,
    pub difficulty: Difficulty,
    pub metadata: QuestionMetadata,
}

/// A generated question, tagged by kind.
///
/// Both kinds carry the same payload shape; the tag is what the client
/// renders differently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "question_type", rename_all = "snake_case")]
pub enum GeneratedQuestion {
    FillInBlank(QuestionBody),
    MultipleChoice(QuestionBody),
}

impl GeneratedQuestion {
    pub fn kind(&self) -> QuestionType {
        match self {
            GeneratedQuestion::FillInBlank(_) => QuestionType::FillInBlank,
            GeneratedQuestion::MultipleChoice(_) => QuestionType::MultipleChoice,
        }
    }

    pub fn body(&self) -> &QuestionBody {
        match self {
            GeneratedQuestion::FillInBlank(b) | GeneratedQuestion::MultipleChoice(b) => b,
        }
    }

    pub fn id(&self) -> &str {
        &self.body().question_id
    }
}

/// A previously issued question awaiting evaluation.
///
/// Owned exclusively by the question cache; actionable only while
/// `now < expires_at`.
#[derive(Debug, Clone)]
pub struct StoredQuestion {
    pub question_id: String,
    pub user_id: String,
    pub question_type: QuestionType,
    pub topic: String,
    pub difficulty: Difficulty,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Memory evaluation derived from a game result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryEvaluation {
    pub topic: String,
    pub retention_score: f32,
    pub confidence: Confidence,
    pub recommendation: String,
}

/// Suggestion for the next question to issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextQuestionSuggestion {
    pub difficulty: Difficulty,
    pub topic_preference: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_parse() {
        assert_eq!(Difficulty::parse("hard"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::parse("impossible"), None);
        assert_eq!(Difficulty::parse(""), None);
    }

    #[test]
    fn test_generated_question_tag() {
        let body = QuestionBody {
            question_id: "q1".to_string(),
            question: "What did you have for lunch?".to_string(),
            options: vec![QuestionOption {
                id: "A".to_string(),
                text: "Soup".to_string(),
            }],
            correct_answer: "A".to_string(),
            based_on_conversation: "c1".to_string(),
            difficulty: Difficulty::Easy,
            metadata: QuestionMetadata {
                topic: "lunch".to_string(),
                memory_score: 0.9,
                days_since_conversation: 0,
            },
        };

        let q = GeneratedQuestion::MultipleChoice(body);
        assert_eq!(q.kind(), QuestionType::MultipleChoice);
        assert_eq!(q.id(), "q1");

        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["question_type"], "multiple_choice");
        assert_eq!(json["question_id"], "q1");
    }
}
