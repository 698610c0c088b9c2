//! Shared retrying JSON client
//!
//! Every remote call in the pipeline goes through `ServiceClient`:
//! bearer-authenticated JSON POST with a per-request timeout, retried
//! on failure with a linearly increasing backoff. After the retry
//! schedule is exhausted the last observed failure is returned.

use crate::error::ServiceError;
use serde_json::Value;
use std::time::Duration;

/// Default per-request timeout for inference endpoints.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default number of additional attempts after the first failure.
pub const DEFAULT_MAX_RETRIES: usize = 2;

/// Backoff before retry number `attempt` (zero-based): 1 + attempt seconds.
#[inline]
#[must_use]
pub fn backoff_delay(attempt: usize) -> Duration {
    Duration::from_secs(1 + attempt as u64)
}

/// Bearer-authenticated JSON POST client with linear-backoff retries.
///
/// Cheap to clone; the underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    max_retries: usize,
}

impl ServiceClient {
    /// Create a client rooted at `base_url`.
    ///
    /// `max_retries` counts additional attempts after the first; the
    /// timeout applies per request, not per retry schedule.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
        max_retries: usize,
    ) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
            max_retries,
        })
    }

    /// POST `payload` to `path` under the base URL and parse the JSON body.
    ///
    /// Non-success statuses and transport failures are retried with a
    /// `1 + attempt` second backoff, up to `max_retries` additional
    /// attempts; the last failure is returned once the schedule is
    /// exhausted.
    pub async fn post_json(&self, path: &str, payload: &Value) -> Result<Value, ServiceError> {
        let url = self.endpoint_url(path);
        let mut attempt = 0usize;
        loop {
            let err = match self
                .http
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(payload)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    return resp.json::<Value>().await.map_err(|source| {
                        ServiceError::Transport {
                            endpoint: url.clone(),
                            source,
                        }
                    });
                }
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    let body = resp.text().await.unwrap_or_default();
                    tracing::warn!(
                        endpoint = %url,
                        status,
                        attempt,
                        "service call returned non-success status"
                    );
                    ServiceError::Status {
                        endpoint: url.clone(),
                        status,
                        body,
                        attempts: attempt + 1,
                    }
                }
                Err(source) => {
                    tracing::warn!(
                        endpoint = %url,
                        attempt,
                        error = %source,
                        "service call transport failure"
                    );
                    ServiceError::Transport {
                        endpoint: url.clone(),
                        source,
                    }
                }
            };

            if attempt >= self.max_retries {
                return Err(err);
            }
            tokio::time::sleep(backoff_delay(attempt)).await;
            attempt += 1;
        }
    }

    fn endpoint_url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Truncate a JSON value to a short diagnostic snippet.
///
/// Bodies are arbitrary remote text; the cut is backed off to the
/// nearest char boundary so multibyte content cannot split.
pub(crate) fn snippet(value: &Value) -> String {
    let mut text = value.to_string();
    if text.len() > 200 {
        let mut end = 200;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text.truncate(end);
        text.push('…');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn backoff_is_linear_in_attempt() {
        assert_eq!(backoff_delay(0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1), Duration::from_secs(2));
        assert_eq!(backoff_delay(4), Duration::from_secs(5));
    }

    #[test]
    fn endpoint_url_joins_without_duplicate_slashes() {
        let client = ServiceClient::new(
            "https://inference.example/api/",
            "key",
            DEFAULT_TIMEOUT,
            DEFAULT_MAX_RETRIES,
        )
        .unwrap();
        assert_eq!(
            client.endpoint_url("/models/m1"),
            "https://inference.example/api/models/m1"
        );
        assert_eq!(
            client.endpoint_url("models/m1"),
            "https://inference.example/api/models/m1"
        );
    }

    #[test]
    fn snippet_truncates_long_bodies() {
        let long = json!({ "body": "x".repeat(500) });
        let s = snippet(&long);
        assert!(s.len() <= 204);
        assert!(s.ends_with('…'));
        assert_eq!(snippet(&json!(1.0)), "1.0");
    }

    #[test]
    fn snippet_cuts_multibyte_bodies_on_char_boundaries() {
        // 2-byte chars put byte 200 mid-character.
        let s = snippet(&json!("α".repeat(150)));
        assert!(s.ends_with('…'));
        assert!(s.chars().all(|c| c == '"' || c == 'α' || c == '…'));

        let s = snippet(&json!("評価".repeat(80)));
        assert!(s.ends_with('…'));
        assert!(s.len() <= 204);
    }
}
