//! Gradeflow Core - answer evaluation and feedback pipeline
//!
//! Evaluates a student's free-text answers against a test's reference
//! answers and delivers a scored feedback report:
//! - Normalizes text and detects negation markers
//! - Blends two semantic-similarity signals into a final score
//! - Generates natural-language feedback with a deterministic fallback
//! - Orchestrates the run through an explicit state machine
//!
//! # Example
//!
//! ```rust,ignore
//! use gradeflow_core::{EvaluationWorkflow, RunRequest};
//!
//! # async fn example(workflow: EvaluationWorkflow, request: RunRequest)
//! # -> Result<(), Box<dyn std::error::Error>> {
//! let outcome = workflow.run(request).await?;
//! println!("Overall: {}/100", outcome.overall_pct);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod blend;
pub mod config;
pub mod error;
pub mod feedback;
pub mod report;
pub mod scorer;
pub mod store;
pub mod text;
pub mod types;
pub mod workflow;

// Re-exports for convenience
pub use blend::{blend, round2, CROSS_WEIGHT, EMBED_WEIGHT, NEGATION_PENALTY};
pub use config::{PipelineBackends, PipelineConfig};
pub use error::{ConfigError, EvalError, StoreError};
pub use feedback::{fallback_feedback, FeedbackGenerator};
pub use report::{render_report, ReportBundle};
pub use scorer::AnswerScorer;
pub use store::{ResponseStore, ResultStore, TestStore};
pub use text::{has_negation, normalize};
pub use types::{
    AnswerSet, AssessmentResult, DeliveryStatus, Question, QuestionResult, ResponseRecord,
    RunOutcome, RunRequest, ScoreBreakdown, TestDefinition,
};
pub use workflow::{allowed_transitions, validate_transition, EvaluationWorkflow, RunState};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the evaluation pipeline
    pub use crate::{
        AnswerScorer, DeliveryStatus, EvalError, EvaluationWorkflow, FeedbackGenerator,
        PipelineConfig, Question, RunOutcome, RunRequest, TestDefinition,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
