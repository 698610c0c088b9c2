//! Backend traits for remote model inference
//!
//! The pipeline never talks to an endpoint directly; it goes through
//! these seams so tests can substitute fakes and deployments can swap
//! providers. Implementations must be safe to share across concurrent
//! evaluation runs (`Send + Sync`, no per-call mutable state).

use crate::error::ServiceError;

/// Sentence-embedding similarity between an anchor and a candidate text.
#[async_trait::async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Similarity of `candidate` to `anchor`, nominally in [0, 1].
    async fn similarity(&self, anchor: &str, candidate: &str) -> Result<f64, ServiceError>;
}

/// Pairwise cross-encoder relatedness for a text pair.
#[async_trait::async_trait]
pub trait CrossEncoderBackend: Send + Sync {
    /// Joint relatedness of `(student, teacher)`, mapped into [0, 1].
    async fn relatedness(&self, student: &str, teacher: &str) -> Result<f64, ServiceError>;
}

/// Chat-completion text generation.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send a single user prompt to `model` and return the generated text.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ServiceError>;
}
