//! Per-question answer scoring
//!
//! Drives both similarity backends for one (student, teacher) pair
//! and blends the signals into the final percentage. The backends are
//! injected at construction with process lifetime and shared
//! read-only across concurrent runs.

use crate::blend::blend;
use crate::text::normalize;
use crate::types::ScoreBreakdown;
use gradeflow_inference::{CrossEncoderBackend, EmbeddingBackend, ServiceError};
use std::sync::Arc;

/// Similarity scorer over injected embedding and cross-encoder backends.
#[derive(Clone)]
pub struct AnswerScorer {
    embedding: Arc<dyn EmbeddingBackend>,
    cross_encoder: Arc<dyn CrossEncoderBackend>,
}

impl AnswerScorer {
    #[inline]
    #[must_use]
    pub fn new(
        embedding: Arc<dyn EmbeddingBackend>,
        cross_encoder: Arc<dyn CrossEncoderBackend>,
    ) -> Self {
        Self {
            embedding,
            cross_encoder,
        }
    }

    /// Compute both similarity signals for a normalized text pair.
    ///
    /// The reference answer is the embedding anchor. A failure of
    /// either backend fails the whole pair — a zero for only one
    /// signal would silently corrupt the blend.
    pub async fn score_pair(
        &self,
        student_text: &str,
        teacher_text: &str,
    ) -> Result<(f64, f64), ServiceError> {
        let embed_sim = self
            .embedding
            .similarity(teacher_text, student_text)
            .await?
            .clamp(0.0, 1.0);
        let cross_sim = self
            .cross_encoder
            .relatedness(student_text, teacher_text)
            .await?
            .clamp(0.0, 1.0);
        Ok((embed_sim, cross_sim))
    }

    /// Fully evaluate one raw answer against its reference answer.
    ///
    /// Empty answers short-circuit without touching the backends.
    /// Negation flags are taken from the raw texts; similarity runs on
    /// the normalized forms.
    pub async fn evaluate(
        &self,
        student_raw: &str,
        teacher_raw: &str,
    ) -> Result<(f64, ScoreBreakdown), ServiceError> {
        let student = student_raw.trim();
        let teacher = teacher_raw.trim();
        if student.is_empty() {
            return Ok(blend(student, teacher, 0.0, 0.0));
        }

        let (embed_sim, cross_sim) = self
            .score_pair(&normalize(student), &normalize(teacher))
            .await?;
        Ok(blend(student, teacher, embed_sim, cross_sim))
    }
}

impl std::fmt::Debug for AnswerScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnswerScorer").finish_non_exhaustive()
    }
}
