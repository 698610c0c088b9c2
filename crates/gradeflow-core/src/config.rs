//! Environment-sourced pipeline configuration
//!
//! Every credential the pipeline needs is read up front so that a
//! missing key fails fast with a [`ConfigError`] instead of a
//! deep-stack failure on the first remote call.

use crate::error::ConfigError;
use crate::feedback::FeedbackGenerator;
use crate::scorer::AnswerScorer;
use gradeflow_inference::{
    ChatClient, CrossEncoderClient, EmbeddingClient, HttpMailer, ReportDispatcher, ServiceClient,
    ServiceError,
};
use std::env;
use std::sync::Arc;
use std::time::Duration;

/// Default sentence-embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
/// Default cross-encoder model.
pub const DEFAULT_CROSS_ENCODER_MODEL: &str = "cross-encoder/ms-marco-MiniLM-L-6-v2";
/// Default feedback-generation model.
pub const DEFAULT_CHAT_MODEL: &str = "meta-llama/Llama-3.2-1B-Instruct:novita";
/// Default inference endpoint base.
pub const DEFAULT_INFERENCE_BASE_URL: &str = "https://router.huggingface.co/hf-inference";
/// Default chat-completion endpoint base.
pub const DEFAULT_CHAT_BASE_URL: &str = "https://router.huggingface.co";

/// Resolved pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Inference API key (embeddings, cross-encoder, chat)
    pub inference_api_key: String,
    /// Inference endpoint base URL
    pub inference_base_url: String,
    /// Chat-completion endpoint base URL
    pub chat_base_url: String,
    /// Embedding model identifier
    pub embedding_model: String,
    /// Cross-encoder model identifier
    pub cross_encoder_model: String,
    /// Feedback-generation model identifier
    pub chat_model: String,
    /// Mail relay endpoint base URL
    pub mail_endpoint: String,
    /// Mail relay API key
    pub mail_api_key: String,
    /// Sender address for feedback reports
    pub mail_sender: String,
    /// Backing-store connection string
    pub store_uri: String,
    /// Per-remote-call timeout
    pub request_timeout: Duration,
    /// Additional attempts after a failed remote call
    pub max_retries: usize,
}

impl PipelineConfig {
    /// Load configuration from the process environment.
    ///
    /// Required: `INFERENCE_API_KEY`, `MAIL_ENDPOINT`, `MAIL_API_KEY`,
    /// `MAIL_SENDER`, `MONGO_URI`. Everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            inference_api_key: required("INFERENCE_API_KEY")?,
            inference_base_url: optional("INFERENCE_BASE_URL", DEFAULT_INFERENCE_BASE_URL),
            chat_base_url: optional("CHAT_BASE_URL", DEFAULT_CHAT_BASE_URL),
            embedding_model: optional("EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            cross_encoder_model: optional("CROSS_ENCODER_MODEL", DEFAULT_CROSS_ENCODER_MODEL),
            chat_model: optional("CHAT_MODEL", DEFAULT_CHAT_MODEL),
            mail_endpoint: required("MAIL_ENDPOINT")?,
            mail_api_key: required("MAIL_API_KEY")?,
            mail_sender: required("MAIL_SENDER")?,
            store_uri: required("MONGO_URI")?,
            request_timeout: Duration::from_secs(parsed("REQUEST_TIMEOUT_SECS", 30)?),
            max_retries: parsed("MAX_RETRIES", 2)?,
        })
    }

    /// Construct the remote collaborators this configuration describes.
    ///
    /// Composition root for production wiring: one shared client per
    /// base URL, model backends on top, all with process lifetime.
    /// Stores are external and still injected separately.
    pub fn build_backends(&self) -> Result<PipelineBackends, ServiceError> {
        let inference = ServiceClient::new(
            self.inference_base_url.clone(),
            self.inference_api_key.clone(),
            self.request_timeout,
            self.max_retries,
        )?;
        let chat = ServiceClient::new(
            self.chat_base_url.clone(),
            self.inference_api_key.clone(),
            self.request_timeout,
            self.max_retries,
        )?;
        let mail = ServiceClient::new(
            self.mail_endpoint.clone(),
            self.mail_api_key.clone(),
            self.request_timeout,
            self.max_retries,
        )?;

        Ok(PipelineBackends {
            scorer: AnswerScorer::new(
                Arc::new(EmbeddingClient::new(
                    inference.clone(),
                    self.embedding_model.clone(),
                )),
                Arc::new(CrossEncoderClient::new(
                    inference,
                    self.cross_encoder_model.clone(),
                )),
            ),
            feedback: FeedbackGenerator::new(
                Arc::new(ChatClient::new(chat)),
                self.chat_model.clone(),
            ),
            dispatcher: Arc::new(HttpMailer::new(mail, self.mail_sender.clone())),
        })
    }
}

/// Production remote collaborators assembled from a [`PipelineConfig`].
#[derive(Clone)]
pub struct PipelineBackends {
    /// Similarity scorer over the configured inference endpoints
    pub scorer: AnswerScorer,
    /// Feedback generator over the configured chat endpoint
    pub feedback: FeedbackGenerator,
    /// Mail relay dispatcher
    pub dispatcher: Arc<dyn ReportDispatcher>,
}

impl std::fmt::Debug for PipelineBackends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBackends").finish_non_exhaustive()
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::MissingVar(name)),
    }
}

fn optional(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Environment mutation is process-global, so everything lives in
    // one test to avoid interference between parallel test threads.
    #[test]
    fn from_env_reads_required_and_defaults() {
        env::set_var("INFERENCE_API_KEY", "key-123");
        env::set_var("MAIL_ENDPOINT", "https://mail.example/api");
        env::set_var("MAIL_API_KEY", "mail-key");
        env::set_var("MAIL_SENDER", "reports@example.com");
        env::set_var("MONGO_URI", "mongodb://localhost:27017/assessment_db");
        env::remove_var("EMBEDDING_MODEL");
        env::remove_var("REQUEST_TIMEOUT_SECS");

        let config = PipelineConfig::from_env().unwrap();
        assert_eq!(config.inference_api_key, "key-123");
        assert_eq!(config.embedding_model, DEFAULT_EMBEDDING_MODEL);
        assert_eq!(config.cross_encoder_model, DEFAULT_CROSS_ENCODER_MODEL);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 2);

        env::set_var("MAX_RETRIES", "5");
        let config = PipelineConfig::from_env().unwrap();
        assert_eq!(config.max_retries, 5);
        env::remove_var("MAX_RETRIES");

        env::set_var("REQUEST_TIMEOUT_SECS", "not-a-number");
        assert!(matches!(
            PipelineConfig::from_env(),
            Err(ConfigError::InvalidVar { name: "REQUEST_TIMEOUT_SECS", .. })
        ));
        env::remove_var("REQUEST_TIMEOUT_SECS");

        env::remove_var("INFERENCE_API_KEY");
        assert!(matches!(
            PipelineConfig::from_env(),
            Err(ConfigError::MissingVar("INFERENCE_API_KEY"))
        ));
    }
}
