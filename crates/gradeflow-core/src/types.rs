//! Core types for the evaluation pipeline
//!
//! Defines the fundamental values flowing through a run:
//! - Test definitions and their questions (read-only input)
//! - The student's answer set
//! - Per-question score breakdowns and results
//! - The aggregate assessment result and run outcome

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One free-text question with its reference answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Question identifier, unique within its test
    pub id: String,
    /// Question text shown to the student
    pub text: String,
    /// Reference answer the student answer is scored against
    pub ideal_answer: String,
}

/// A test definition: ordered questions under a title.
///
/// Owned by the external test store; read-only to the pipeline once
/// fetched. Question order is significant and drives report numbering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestDefinition {
    /// Test identifier
    pub id: String,
    /// Human-readable title
    pub title: String,
    /// Questions in presentation order
    pub questions: Vec<Question>,
}

/// Mapping from question id to the raw student answer text.
///
/// Keys are unique, order irrelevant; supplied wholesale at
/// invocation and never mutated mid-run.
pub type AnswerSet = HashMap<String, String>;

/// Numeric breakdown behind one final percentage score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    /// Embedding similarity as a percentage, after any negation penalty
    pub embedding_pct: f64,
    /// Cross-encoder similarity as a percentage, after any negation penalty
    pub cross_pct: f64,
    /// 0.5 on a negation mismatch, 0.0 otherwise
    pub negation_penalty: f64,
    /// Final blended percentage, rounded to 2 decimals
    pub final_pct: f64,
    /// Non-numeric short-circuit reason (e.g. an empty answer)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Evaluation result for a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// Question identifier
    pub question_id: String,
    /// Question text, carried for rendering
    pub question_text: String,
    /// The student's raw answer
    pub student_answer: String,
    /// Final percentage score
    pub final_pct: f64,
    /// Score breakdown
    pub breakdown: ScoreBreakdown,
    /// Generated (or fallback) feedback text
    pub feedback: String,
}

/// Append-only diagnostic record persisted per answered question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub student_email: String,
    pub test_id: String,
    pub question_id: String,
    pub question_text: String,
    pub student_answer: String,
    pub score: f64,
    pub recorded_at: DateTime<Utc>,
}

/// The authoritative result of one completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    pub student_email: String,
    pub test_id: String,
    /// Mean of per-question final percentages, rounded to 2 decimals
    pub overall_pct: f64,
    /// Per-question results in evaluation order
    pub per_question: Vec<QuestionResult>,
    pub timestamp: DateTime<Utc>,
}

/// Invocation value for one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRequest {
    pub student_name: String,
    pub student_email: String,
    pub test_id: String,
    pub answers: AnswerSet,
}

/// Whether the single dispatch attempt for a run succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryStatus {
    /// Report was handed to the delivery collaborator successfully
    Sent,
    /// Delivery failed; logged, run result still returned
    Failed,
}

/// Value returned to the caller of a completed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutcome {
    /// Overall percentage score
    pub overall_pct: f64,
    /// Per-question detail in evaluation order
    pub per_question: Vec<QuestionResult>,
    /// Outcome of the at-most-once dispatch attempt
    pub delivery: DeliveryStatus,
}
