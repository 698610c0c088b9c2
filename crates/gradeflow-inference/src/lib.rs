//! Gradeflow Inference - remote service clients
//!
//! HTTP-facing half of the evaluation pipeline:
//! - Shared retrying JSON client for inference endpoints
//! - Backend traits for embedding, cross-encoder, and chat completion
//! - Response-shape negotiation for heterogeneous endpoint deployments
//! - Mail relay dispatcher for the rendered feedback report
//!
//! All backends are initialized once per process and shared read-only
//! across calls; every method is side-effect free apart from the
//! network round-trip itself.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod backend;
pub mod chat;
pub mod client;
pub mod cross_encoder;
pub mod embedding;
pub mod error;
pub mod mail;

// Re-exports for convenience
pub use backend::{ChatBackend, CrossEncoderBackend, EmbeddingBackend};
pub use chat::ChatClient;
pub use client::ServiceClient;
pub use cross_encoder::CrossEncoderClient;
pub use embedding::EmbeddingClient;
pub use error::ServiceError;
pub use mail::{DeliveryError, HttpMailer, ReportDispatcher};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
