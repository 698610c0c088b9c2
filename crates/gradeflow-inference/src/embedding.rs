//! Sentence-embedding similarity client
//!
//! Primary path is the hosted sentence-similarity pipeline: one
//! request carrying the anchor (reference answer) and the candidate
//! (student answer), answered with one similarity float per candidate.
//! Deployments without the pipeline head answer feature-extraction
//! requests instead, returning either a pooled vector or a raw
//! token-embedding matrix; in that case both texts are embedded,
//! token matrices are mean-pooled, and the similarity is computed as
//! a cosine locally.

use crate::backend::EmbeddingBackend;
use crate::client::{snippet, ServiceClient};
use crate::error::ServiceError;
use serde_json::{json, Value};

/// Embedding similarity via a hosted inference endpoint.
#[derive(Debug, Clone)]
pub struct EmbeddingClient {
    client: ServiceClient,
    model: String,
}

impl EmbeddingClient {
    /// Create a client for `model` (e.g. `sentence-transformers/all-MiniLM-L6-v2`).
    #[inline]
    #[must_use]
    pub fn new(client: ServiceClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    fn pipeline_path(&self) -> String {
        format!("models/{}/pipeline/sentence-similarity", self.model)
    }

    fn extraction_path(&self) -> String {
        format!("models/{}", self.model)
    }

    /// Embed one text through the feature-extraction endpoint.
    async fn embed(&self, text: &str) -> Result<Vec<f64>, ServiceError> {
        let path = self.extraction_path();
        let body = self.client.post_json(&path, &json!({ "inputs": text })).await?;
        parse_embedding(&body).ok_or_else(|| ServiceError::UnrecognizedShape {
            endpoint: path,
            snippet: snippet(&body),
        })
    }
}

#[async_trait::async_trait]
impl EmbeddingBackend for EmbeddingClient {
    async fn similarity(&self, anchor: &str, candidate: &str) -> Result<f64, ServiceError> {
        let payload = json!({
            "inputs": {
                "source_sentence": anchor,
                "sentences": [candidate],
            },
        });
        match self.client.post_json(&self.pipeline_path(), &payload).await {
            Ok(body) => {
                if let Some(score) = parse_similarity_list(&body) {
                    return Ok(score);
                }
                tracing::warn!(
                    model = %self.model,
                    "similarity pipeline response unrecognized, falling back to feature extraction"
                );
            }
            Err(err) => {
                tracing::warn!(
                    model = %self.model,
                    error = %err,
                    "similarity pipeline unavailable, falling back to feature extraction"
                );
            }
        }

        let anchor_vec = self.embed(anchor).await?;
        let candidate_vec = self.embed(candidate).await?;
        cosine_similarity(&anchor_vec, &candidate_vec).ok_or_else(|| {
            ServiceError::UnrecognizedShape {
                endpoint: self.extraction_path(),
                snippet: format!(
                    "incomparable embedding dimensions {} vs {}",
                    anchor_vec.len(),
                    candidate_vec.len()
                ),
            }
        })
    }
}

/// Pipeline response: one similarity float per candidate, first one wins.
fn parse_similarity_list(body: &Value) -> Option<f64> {
    body.as_array()?.first()?.as_f64()
}

/// Feature-extraction response: a flat vector, a batched vector, or a
/// token-embedding matrix (mean-pooled into a single vector).
fn parse_embedding(body: &Value) -> Option<Vec<f64>> {
    let outer = body.as_array()?;
    let first = outer.first()?;
    if first.is_number() {
        return outer.iter().map(Value::as_f64).collect();
    }

    let candidate = first.as_array()?;
    match candidate.first()? {
        Value::Number(_) => candidate.iter().map(Value::as_f64).collect(),
        Value::Array(_) => mean_pool(candidate),
        _ => None,
    }
}

/// Average a token-embedding matrix over its token axis.
fn mean_pool(rows: &[Value]) -> Option<Vec<f64>> {
    let mut pooled: Option<Vec<f64>> = None;
    for row in rows {
        let row: Option<Vec<f64>> = row.as_array()?.iter().map(Value::as_f64).collect();
        let row = row?;
        match pooled.as_mut() {
            None => pooled = Some(row),
            Some(acc) => {
                if acc.len() != row.len() {
                    return None;
                }
                for (a, v) in acc.iter_mut().zip(row) {
                    *a += v;
                }
            }
        }
    }
    let mut pooled = pooled?;
    let count = rows.len() as f64;
    for v in &mut pooled {
        *v /= count;
    }
    Some(pooled)
}

/// Cosine similarity between two equal-dimension vectors.
///
/// Returns `None` on dimension mismatch or zero-magnitude input.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a * norm_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_similarity_pipeline_response() {
        assert_eq!(parse_similarity_list(&json!([0.87])), Some(0.87));
        assert_eq!(parse_similarity_list(&json!([])), None);
        assert_eq!(parse_similarity_list(&json!({ "error": "loading" })), None);
    }

    #[test]
    fn parses_flat_vector() {
        assert_eq!(
            parse_embedding(&json!([0.1, 0.2, 0.3])),
            Some(vec![0.1, 0.2, 0.3])
        );
    }

    #[test]
    fn parses_batched_vector() {
        assert_eq!(
            parse_embedding(&json!([[0.5, 0.5]])),
            Some(vec![0.5, 0.5])
        );
    }

    #[test]
    fn mean_pools_token_matrix() {
        let body = json!([[[1.0, 3.0], [3.0, 5.0]]]);
        assert_eq!(parse_embedding(&body), Some(vec![2.0, 4.0]));
    }

    #[test]
    fn rejects_ragged_token_matrix() {
        let body = json!([[[1.0, 3.0], [3.0]]]);
        assert_eq!(parse_embedding(&body), None);
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = [0.3, 0.4, 0.5];
        let sim = cosine_similarity(&v, &v).unwrap();
        assert!((sim - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert!(sim.abs() < 1e-9);
    }

    #[test]
    fn cosine_rejects_mismatched_or_zero_vectors() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), None);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), None);
        assert_eq!(cosine_similarity(&[], &[]), None);
    }
}
