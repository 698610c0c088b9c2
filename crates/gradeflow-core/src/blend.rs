//! Score blending
//!
//! Combines the two similarity signals into the final percentage.
//! The cross-encoder sees both texts jointly and is the more
//! context-sensitive signal, so it carries the larger weight; the
//! weights are policy constants, not learned values.

use crate::text::has_negation;
use crate::types::ScoreBreakdown;

/// Weight of the sentence-embedding signal.
pub const EMBED_WEIGHT: f64 = 0.4;
/// Weight of the cross-encoder signal.
pub const CROSS_WEIGHT: f64 = 0.6;
/// Multiplier applied on a negation mismatch.
pub const NEGATION_PENALTY: f64 = 0.5;

/// Round to 2 decimal places.
#[inline]
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Blend the similarity signals for one question into a final score.
///
/// An empty (or whitespace-only) student answer short-circuits to 0
/// with an explanatory breakdown; callers must not have made any
/// model calls in that case. On a negation mismatch between the raw
/// texts both signals are halved and the blended value is halved
/// again, so the penalty compounds.
#[must_use]
pub fn blend(
    student_text: &str,
    teacher_text: &str,
    embed_sim: f64,
    cross_sim: f64,
) -> (f64, ScoreBreakdown) {
    if student_text.trim().is_empty() {
        return (
            0.0,
            ScoreBreakdown {
                embedding_pct: 0.0,
                cross_pct: 0.0,
                negation_penalty: 0.0,
                final_pct: 0.0,
                reason: Some("Empty answer".to_string()),
            },
        );
    }

    let mut embed = embed_sim;
    let mut cross = cross_sim;
    let negation_penalty = if has_negation(student_text) != has_negation(teacher_text) {
        embed *= NEGATION_PENALTY;
        cross *= NEGATION_PENALTY;
        NEGATION_PENALTY
    } else {
        0.0
    };

    let blended = (EMBED_WEIGHT * embed + CROSS_WEIGHT * cross) * (1.0 - negation_penalty);
    let final_pct = round2(blended * 100.0);

    (
        final_pct,
        ScoreBreakdown {
            embedding_pct: round2(embed * 100.0),
            cross_pct: round2(cross * 100.0),
            negation_penalty,
            final_pct,
            reason: None,
        },
    )
}
