/// HTTP email gateway notifier
///
/// Delivers messages by POSTing JSON to a transactional email gateway
/// (any service accepting `{from, to, subject, html}` behind a bearer
/// token). Keeping SMTP out of process means the scheduler binary needs
/// no mail stack of its own.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

use super::{DispatchError, EmailMessage, Notifier};

/// Request body accepted by the gateway
#[derive(Debug, Serialize)]
struct GatewayRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

/// Gateway notifier configuration
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Gateway endpoint URL
    pub url: String,

    /// Bearer token for the gateway
    pub api_token: String,

    /// Sender address on outgoing mail
    pub from_address: String,

    /// Per-request timeout (seconds)
    pub timeout_seconds: u64,
}

/// Notifier that posts messages to an HTTP email gateway
pub struct GatewayNotifier {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayNotifier {
    /// Creates a gateway notifier
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| DispatchError::ChannelUnreachable(e.to_string()))?;

        Ok(GatewayNotifier { client, config })
    }
}

#[async_trait]
impl Notifier for GatewayNotifier {
    fn name(&self) -> &str {
        "email_gateway"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), DispatchError> {
        let body = GatewayRequest {
            from: &self.config.from_address,
            to: &message.to,
            subject: &message.subject,
            html: &message.html_body,
        };

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DispatchError::ChannelUnreachable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(DispatchError::Rejected(format!("{status}: {detail}")));
        }

        tracing::debug!(to = %message.to, subject = %message.subject, "Email accepted by gateway");
        Ok(())
    }
}
