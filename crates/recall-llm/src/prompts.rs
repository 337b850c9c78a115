//! Prompt templates for chat, question generation, quality judging, and
//! domain analysis.

use std::collections::BTreeMap;

use recall_core::types::{DomainScore, IncorrectAttempt, ProfileFact};

/// Prior mistakes included in the chat prompt, at most.
const PROMPT_MISTAKES_LIMIT: usize = 3;
/// Context lines included in the chat prompt, at most.
const PROMPT_CONTEXT_LIMIT: usize = 3;

/// System prompt for the companion chat, with optional profile and
/// recent-mistake sections.
pub fn chat_system_prompt(profile: &[ProfileFact], mistakes: &[IncorrectAttempt]) -> String {
    let mut prompt = String::from(
        "You are a warm, conversational companion that helps users exercise \
their memory. The user may be experiencing memory decline; your goal is to \
stimulate recall and provide emotional reassurance through friendly \
conversation.\n\n\
Follow these principles:\n\
1. Keep a warm, unhurried, friendly tone.\n\
2. When referring to earlier conversations, summarize only the key topic or \
emotional element.\n\
3. Steer the conversation toward gentle recall questions about everyday \
life.\n\
4. Never quiz or correct the user harshly; always include positive feedback \
and empathy.\n\
5. Use the context below to connect naturally to previous conversations.",
    );

    if !profile.is_empty() {
        prompt.push_str(&profile_section(profile));
    }

    if !mistakes.is_empty() {
        prompt.push_str(&mistakes_section(mistakes));
    }

    prompt.push_str(
        "\n\nKeep every reply natural and conversational; avoid sounding \
overly formal or clinical.",
    );

    prompt
}

fn profile_section(profile: &[ProfileFact]) -> String {
    // Group one representative fact per category, category-sorted for a
    // stable prompt.
    let mut by_category: BTreeMap<&str, &str> = BTreeMap::new();
    for fact in profile {
        by_category
            .entry(fact.category.as_str())
            .or_insert(fact.content.as_str());
    }

    let mut section = String::from("\n\nUser profile:\n");
    for (category, content) in by_category {
        section.push_str(&format!("\n{}: {}", category, content));
    }
    section.push_str(
        "\n\nUse this information to make replies more personal and considerate.",
    );
    section
}

fn mistakes_section(mistakes: &[IncorrectAttempt]) -> String {
    let mut section = String::from("\n\nRecently missed quiz answers:\n");
    for attempt in mistakes.iter().take(PROMPT_MISTAKES_LIMIT) {
        section.push_str(&format!(
            "\n[{}] Question: {}\n  - User's answer: {}\n  - Correct answer: {}\n  - Topic: {}",
            attempt.quiz.question_type,
            attempt.quiz.question,
            attempt.user_answer,
            attempt.correct_answer,
            attempt.quiz.topic,
        ));
    }
    section.push_str(
        "\n\nWhen these topics come up, gently provide the accurate information \
to help the user's memory.",
    );
    section
}

/// Assistant-role context message built from retrieved conversation
/// fragments, limited to the most relevant few.
pub fn chat_context_message(context_messages: &[String]) -> Option<String> {
    if context_messages.is_empty() {
        return None;
    }

    let mut text = String::from("Recent conversation history:\n");
    for line in context_messages.iter().take(PROMPT_CONTEXT_LIMIT) {
        text.push_str(&format!("- {}\n", line));
    }
    Some(text)
}

/// System prompt for fill-in-the-blank question generation.
pub fn fill_in_blank_system_prompt() -> String {
    r#"You generate fill-in-the-blank memory questions from a user's past conversation.
Take one concrete fact from the conversation and turn it into a sentence with one blank, plus four candidate answers.
Respond with JSON only, in exactly this shape:
{"question": "...", "options": [{"id": "A", "text": "..."}, {"id": "B", "text": "..."}, {"id": "C", "text": "..."}, {"id": "D", "text": "..."}], "correct_answer": "A"}"#
        .to_string()
}

/// User prompt for fill-in-the-blank question generation.
pub fn fill_in_blank_user_prompt(conversation_content: &str, topic: &str, difficulty: &str) -> String {
    format!(
        "Topic: {}\nTarget difficulty: {}\n\nConversation:\n{}\n\nGenerate one fill-in-the-blank question about this conversation.",
        topic, difficulty, conversation_content
    )
}

/// System prompt for multiple-choice question generation.
pub fn multiple_choice_system_prompt() -> String {
    r#"You generate multiple-choice memory questions from a user's past conversation.
Ask about one concrete fact from the conversation and provide four answer options.
Respond with JSON only, in exactly this shape:
{"question": "...", "options": [{"id": "A", "text": "..."}, {"id": "B", "text": "..."}, {"id": "C", "text": "..."}, {"id": "D", "text": "..."}], "correct_answer": "A"}"#
        .to_string()
}

/// User prompt for multiple-choice question generation.
pub fn multiple_choice_user_prompt(conversation_content: &str, topic: &str, difficulty: &str) -> String {
    format!(
        "Topic: {}\nTarget difficulty: {}\n\nConversation:\n{}\n\nGenerate one multiple-choice question about this conversation.",
        topic, difficulty, conversation_content
    )
}

/// System prompt for judging the quality of a user's chat turn.
pub fn quality_system_prompt() -> String {
    r#"You evaluate how natural, coherent, and accurate a user's conversational response is.
Score it from 0 to 100.
Respond with JSON only, in exactly this shape:
{"score": 85, "reasoning": "..."}"#
        .to_string()
}

/// User prompt for the quality judge.
pub fn quality_user_prompt(user_message: &str, context_messages: &[String]) -> String {
    let mut prompt = format!("User's response:\n{}\n", user_message);

    if !context_messages.is_empty() {
        prompt.push_str("\nConversation context:\n");
        for line in context_messages.iter().take(PROMPT_CONTEXT_LIMIT) {
            prompt.push_str(&format!("- {}\n", line));
        }
    }

    prompt.push_str("\nEvaluate the response quality.");
    prompt
}

/// System prompt for domain analysis over conversation and quiz history.
pub fn domain_analysis_system_prompt() -> String {
    r#"You analyze a user's memory strength across four life domains: family, life_events, career, hobbies.
Base the analysis on the conversation history and the incorrectly answered quizzes provided.
Respond with JSON only, in exactly this shape:
{"domains": [{"domain": "family", "score": 72, "insights": ["..."]}, {"domain": "life_events", "score": 50, "insights": ["..."]}, {"domain": "career", "score": 64, "insights": ["..."]}, {"domain": "hobbies", "score": 80, "insights": ["..."]}]}
Scores are 0-100 where higher means stronger retention."#
        .to_string()
}

/// User prompt for domain analysis.
pub fn domain_analysis_user_prompt(conversations: &[String], incorrect_quizzes: &[String]) -> String {
    let mut prompt = String::from("Conversation history:\n");
    if conversations.is_empty() {
        prompt.push_str("(none)\n");
    } else {
        for line in conversations {
            prompt.push_str(&format!("- {}\n", line));
        }
    }

    prompt.push_str("\nIncorrectly answered quizzes:\n");
    if incorrect_quizzes.is_empty() {
        prompt.push_str("(none)\n");
    } else {
        for line in incorrect_quizzes {
            prompt.push_str(&format!("- {}\n", line));
        }
    }

    prompt.push_str("\nAnalyze the user's memory strength per domain.");
    prompt
}

/// System prompt for the professional analysis report.
pub fn report_system_prompt() -> String {
    "You write a short, professional, caregiver-friendly report summarizing a \
user's memory analysis. Describe per-domain strengths and weaknesses and \
recommend gentle exercises. Write plain prose, no JSON."
        .to_string()
}

/// User prompt for report generation from domain scores.
pub fn report_user_prompt(domains: &[DomainScore]) -> String {
    let mut prompt = String::from("Domain analysis results:\n");
    for d in domains {
        prompt.push_str(&format!("\n{} (score {}/100):\n", d.domain, d.score));
        for insight in &d.insights {
            prompt.push_str(&format!("  - {}\n", insight));
        }
    }
    prompt.push_str("\nWrite the report.");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use recall_core::types::QuizInfo;

    fn attempt(topic: &str) -> IncorrectAttempt {
        IncorrectAttempt {
            attempt_id: 1,
            quiz: QuizInfo {
                quiz_id: "z1".to_string(),
                question_type: "multiple_choice".to_string(),
                question: "What did you plant?".to_string(),
                difficulty: "easy".to_string(),
                topic: topic.to_string(),
            },
            user_answer: "roses".to_string(),
            correct_answer: "tomatoes".to_string(),
        }
    }

    #[test]
    fn test_chat_prompt_includes_profile_and_mistakes() {
        let profile = vec![ProfileFact {
            id: "f1".to_string(),
            user_id: "u1".to_string(),
            content: "allergic to peanuts".to_string(),
            category: "allergy".to_string(),
            importance: "high".to_string(),
        }];
        let mistakes = vec![attempt("garden")];

        let prompt = chat_system_prompt(&profile, &mistakes);
        assert!(prompt.contains("allergy: allergic to peanuts"));
        assert!(prompt.contains("What did you plant?"));
    }

    #[test]
    fn test_chat_prompt_limits_mistakes() {
        let mistakes: Vec<_> = (0..5).map(|i| attempt(&format!("topic-{}", i))).collect();
        let prompt = chat_system_prompt(&[], &mistakes);

        assert!(prompt.contains("topic-2"));
        assert!(!prompt.contains("topic-3"));
    }

    #[test]
    fn test_context_message_limits_lines() {
        let lines: Vec<String> = (0..5).map(|i| format!("line-{}", i)).collect();
        let text = chat_context_message(&lines).unwrap();

        assert!(text.contains("line-2"));
        assert!(!text.contains("line-3"));
        assert!(chat_context_message(&[]).is_none());
    }
}
