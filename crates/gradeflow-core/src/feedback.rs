//! Natural-language feedback generation
//!
//! Best-effort by contract: a remote failure is logged and replaced
//! by a deterministic fallback message, never propagated. Feedback
//! must not be able to block scoring or persistence.

use gradeflow_inference::ChatBackend;
use std::sync::Arc;

/// Deterministic fallback used when generation fails.
#[inline]
#[must_use]
pub fn fallback_feedback(score: f64) -> String {
    format!("Good attempt! You scored {score}/100.")
}

/// Feedback generator over an injected chat-completion backend.
#[derive(Clone)]
pub struct FeedbackGenerator {
    chat: Arc<dyn ChatBackend>,
    model: String,
}

impl FeedbackGenerator {
    #[inline]
    #[must_use]
    pub fn new(chat: Arc<dyn ChatBackend>, model: impl Into<String>) -> Self {
        Self {
            chat,
            model: model.into(),
        }
    }

    /// Generate structured feedback for one question/answer/score triple.
    ///
    /// Infallible: any backend error yields the fallback string.
    pub async fn generate(&self, question: &str, answer: &str, score: f64) -> String {
        let prompt = build_prompt(question, answer, score);
        match self.chat.complete(&self.model, &prompt).await {
            Ok(text) => text.trim().to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "feedback generation failed, using fallback");
                fallback_feedback(score)
            }
        }
    }
}

impl std::fmt::Debug for FeedbackGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedbackGenerator")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

fn build_prompt(question: &str, answer: &str, score: f64) -> String {
    format!(
        "You are an educational assistant. Your task is to help students improve \
         their understanding. Given a question, a student's answer, and the score, \
         generate constructive, encouraging feedback.\n\n\
         Follow this format:\n\
         Positive: <what the student did well>\n\
         Improvement: <what is missing or could be improved>\n\
         Suggestion: <what to study or focus on next>\n\n\
         Question: {question}\n\
         Student Answer: {answer}\n\
         Score: {score}/100"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_has_fixed_format() {
        assert_eq!(fallback_feedback(73.5), "Good attempt! You scored 73.5/100.");
        assert_eq!(fallback_feedback(100.0), "Good attempt! You scored 100/100.");
        assert_eq!(fallback_feedback(0.0), "Good attempt! You scored 0/100.");
    }

    #[test]
    fn prompt_carries_question_answer_and_score() {
        let prompt = build_prompt("What is a stack?", "LIFO memory", 88.25);
        assert!(prompt.contains("Question: What is a stack?"));
        assert!(prompt.contains("Student Answer: LIFO memory"));
        assert!(prompt.contains("Score: 88.25/100"));
        assert!(prompt.contains("Positive:"));
        assert!(prompt.contains("Improvement:"));
        assert!(prompt.contains("Suggestion:"));
    }
}
