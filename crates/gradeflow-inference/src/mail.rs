//! Report delivery
//!
//! The workflow hands the rendered report to a [`ReportDispatcher`]
//! and never sees transport detail beyond success or failure; a
//! delivery failure must not propagate past the dispatch boundary.
//! The production implementation relays through an HTTP mail API.

use crate::client::ServiceClient;
use serde_json::json;

/// Mail delivery failure; logged and flagged, never fatal to a run.
#[derive(Debug, thiserror::Error)]
#[error("mail delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Delivery seam for rendered feedback reports.
#[async_trait::async_trait]
pub trait ReportDispatcher: Send + Sync {
    /// Deliver both report bodies to `to`. At most one attempt per run.
    async fn send(
        &self,
        to: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), DeliveryError>;
}

/// JSON mail-relay dispatcher.
///
/// Posts the message to the relay's `messages` endpoint with both the
/// plain-text body and the HTML alternative.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: ServiceClient,
    sender: String,
}

impl HttpMailer {
    /// Create a mailer sending on behalf of `sender`.
    #[inline]
    #[must_use]
    pub fn new(client: ServiceClient, sender: impl Into<String>) -> Self {
        Self {
            client,
            sender: sender.into(),
        }
    }
}

#[async_trait::async_trait]
impl ReportDispatcher for HttpMailer {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), DeliveryError> {
        let payload = json!({
            "from": self.sender,
            "to": [to],
            "subject": subject,
            "text": plain_body,
            "html": html_body,
        });
        match self.client.post_json("messages", &payload).await {
            Ok(_) => {
                tracing::info!(recipient = %to, "feedback report delivered");
                Ok(())
            }
            Err(err) => Err(DeliveryError(err.to_string())),
        }
    }
}
