//! Chat-completion client
//!
//! OpenAI-shape endpoint: `{model, messages:[{role:"user", content}]}`
//! in, generated text at `choices[0].message.content` out.

use crate::backend::ChatBackend;
use crate::client::{snippet, ServiceClient};
use crate::error::ServiceError;
use serde_json::{json, Value};

/// Chat-completion path under the router base URL.
const COMPLETIONS_PATH: &str = "v1/chat/completions";

/// Chat completion via an OpenAI-compatible endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: ServiceClient,
}

impl ChatClient {
    #[inline]
    #[must_use]
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ChatBackend for ChatClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, ServiceError> {
        let payload = json!({
            "model": model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let body = self.client.post_json(COMPLETIONS_PATH, &payload).await?;
        parse_completion(&body).ok_or_else(|| ServiceError::UnrecognizedShape {
            endpoint: COMPLETIONS_PATH.to_string(),
            snippet: snippet(&body),
        })
    }
}

/// Extract and trim the generated text from a completion response.
fn parse_completion(body: &Value) -> Option<String> {
    let content = body
        .pointer("/choices/0/message/content")?
        .as_str()?
        .trim();
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_and_trims_generated_text() {
        let body = json!({
            "choices": [{ "message": { "role": "assistant", "content": "  Positive: good effort.\n" } }],
        });
        assert_eq!(
            parse_completion(&body),
            Some("Positive: good effort.".to_string())
        );
    }

    #[test]
    fn rejects_missing_or_empty_content() {
        assert_eq!(parse_completion(&json!({ "choices": [] })), None);
        assert_eq!(
            parse_completion(&json!({ "choices": [{ "message": { "content": "   " } }] })),
            None
        );
        assert_eq!(parse_completion(&json!({ "error": "rate limited" })), None);
    }
}
