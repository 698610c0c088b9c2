//! Cross-encoder similarity client
//!
//! Cross-encoder deployments are not uniform: depending on how the
//! model is served, the same logical endpoint may expect the pair as a
//! list, as a `text_pair` object, or as a single concatenated string,
//! and may answer with a list of score dicts, a single score dict, or
//! a bare numeric value. Rather than exception-driven probing, each
//! request form is tried in priority order and its response parsed
//! into an explicit [`Shape`] outcome; the first recognized value
//! wins.

use crate::backend::CrossEncoderBackend;
use crate::client::{snippet, ServiceClient};
use crate::error::ServiceError;
use serde_json::{json, Value};

/// Outcome of parsing one response body against one expected shape.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// A usable raw score was extracted.
    Parsed(f64),
    /// The body is valid JSON but not this shape.
    Unrecognized,
}

/// Cross-encoder scoring via a hosted inference endpoint.
#[derive(Debug, Clone)]
pub struct CrossEncoderClient {
    client: ServiceClient,
    model: String,
}

impl CrossEncoderClient {
    /// Create a client for `model` (e.g. `cross-encoder/ms-marco-MiniLM-L-6-v2`).
    #[inline]
    #[must_use]
    pub fn new(client: ServiceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn model_path(&self) -> String {
        format!("models/{}", self.model)
    }
}

#[async_trait::async_trait]
impl CrossEncoderBackend for CrossEncoderClient {
    async fn relatedness(&self, student: &str, teacher: &str) -> Result<f64, ServiceError> {
        let forms: [(Value, fn(&Value) -> Shape); 3] = [
            (json!({ "inputs": [student, teacher] }), parse_score_list),
            (
                json!({ "inputs": { "text_pair": [student, teacher] } }),
                parse_score_object,
            ),
            (
                json!({ "inputs": format!("{student}\n\n===\n\n{teacher}") }),
                parse_best_label,
            ),
        ];

        let path = self.model_path();
        let mut last_err: Option<ServiceError> = None;
        let mut last_body: Option<String> = None;

        for (form_idx, (payload, parse)) in forms.iter().enumerate() {
            match self.client.post_json(&path, payload).await {
                Ok(body) => match parse(&body) {
                    Shape::Parsed(raw) => return Ok(squash(raw)),
                    Shape::Unrecognized => {
                        tracing::warn!(
                            model = %self.model,
                            form = form_idx,
                            "cross-encoder response did not match negotiated shape"
                        );
                        last_body = Some(snippet(&body));
                    }
                },
                Err(err) => {
                    tracing::warn!(
                        model = %self.model,
                        form = form_idx,
                        error = %err,
                        "cross-encoder request form failed"
                    );
                    last_err = Some(err);
                }
            }
        }

        match last_body {
            Some(body) => Err(ServiceError::UnrecognizedShape {
                endpoint: path,
                snippet: body,
            }),
            None => Err(last_err.unwrap_or(ServiceError::UnrecognizedShape {
                endpoint: path,
                snippet: String::new(),
            })),
        }
    }
}

/// Map a raw model output into [0, 1].
///
/// Regression heads return unbounded logits, which get squashed
/// through a sigmoid; deployments that already emit calibrated scores
/// pass through untouched.
#[inline]
#[must_use]
pub fn squash(raw: f64) -> f64 {
    if (0.0..=1.0).contains(&raw) {
        raw
    } else {
        sigmoid(raw)
    }
}

#[inline]
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Shape A: a list, either of `{score}` dicts or of bare numbers.
fn parse_score_list(body: &Value) -> Shape {
    match body.as_array().and_then(|items| items.first()) {
        Some(Value::Object(obj)) => match obj.get("score").and_then(Value::as_f64) {
            Some(score) => Shape::Parsed(score),
            None => Shape::Unrecognized,
        },
        Some(first) => match first.as_f64() {
            Some(score) => Shape::Parsed(score),
            None => Shape::Unrecognized,
        },
        None => Shape::Unrecognized,
    }
}

/// Shape B: a single `{score}` dict.
fn parse_score_object(body: &Value) -> Shape {
    match body.get("score").and_then(Value::as_f64) {
        Some(score) => Shape::Parsed(score),
        None => Shape::Unrecognized,
    }
}

/// Shape C: a list of labeled scores; the highest wins.
fn parse_best_label(body: &Value) -> Shape {
    let Some(items) = body.as_array() else {
        return Shape::Unrecognized;
    };
    items
        .iter()
        .filter_map(|item| item.get("score").and_then(Value::as_f64))
        .fold(Shape::Unrecognized, |best, score| match best {
            Shape::Parsed(current) if current >= score => best,
            _ => Shape::Parsed(score),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_list_of_score_dicts() {
        let body = json!([{ "label": "LABEL_1", "score": 0.82 }, { "label": "LABEL_0", "score": 0.18 }]);
        assert_eq!(parse_score_list(&body), Shape::Parsed(0.82));
    }

    #[test]
    fn parses_list_of_bare_numbers() {
        assert_eq!(parse_score_list(&json!([0.64, 0.1])), Shape::Parsed(0.64));
    }

    #[test]
    fn parses_single_score_object() {
        assert_eq!(
            parse_score_object(&json!({ "score": 0.4 })),
            Shape::Parsed(0.4)
        );
        assert_eq!(parse_score_object(&json!({ "sim": 0.4 })), Shape::Unrecognized);
    }

    #[test]
    fn best_label_takes_the_maximum() {
        let body = json!([{ "score": 0.2 }, { "score": 0.9 }, { "score": 0.5 }]);
        assert_eq!(parse_best_label(&body), Shape::Parsed(0.9));
    }

    #[test]
    fn unexpected_bodies_are_unrecognized_not_errors() {
        assert_eq!(parse_score_list(&json!({ "error": "loading" })), Shape::Unrecognized);
        assert_eq!(parse_score_list(&json!([])), Shape::Unrecognized);
        assert_eq!(parse_best_label(&json!("ready")), Shape::Unrecognized);
    }

    #[test]
    fn squash_passes_calibrated_scores_through() {
        assert_eq!(squash(0.0), 0.0);
        assert_eq!(squash(0.73), 0.73);
        assert_eq!(squash(1.0), 1.0);
    }

    #[test]
    fn squash_maps_logits_into_unit_interval() {
        let squashed = squash(3.2);
        assert!(squashed > 0.9 && squashed < 1.0);
        let negative = squash(-2.0);
        assert!(negative > 0.0 && negative < 0.5);
    }
}
