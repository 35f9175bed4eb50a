//! # Telegram Bot API sink.
//!
//! Sends each message with a single `sendMessage` call:
//! ```text
//! GET {api}/bot{token}/sendMessage?chat_id={recipient}&text={message}
//! ```
//! Any non-2xx answer is reported as [`NotifyError::Rejected`].

use std::time::Duration;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::notify::NotificationSink;

/// Public Bot API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Per-request HTTP timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Longest response body kept in a rejection.
const MAX_BODY: usize = 256;

/// Telegram Bot API notification sink.
pub struct TelegramSink {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl TelegramSink {
    /// Creates a sink for the bot `token` against the public API.
    pub fn new(token: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_api_url(token, DEFAULT_API_URL)
    }

    /// Creates a sink against a custom API base URL (self-hosted Bot API server, tests).
    pub fn with_api_url(
        token: impl Into<String>,
        api_url: impl Into<String>,
    ) -> Result<Self, NotifyError> {
        let http = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| NotifyError::Transport {
                error: e.to_string(),
            })?;
        Ok(Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_url, self.token)
    }
}

#[async_trait]
impl NotificationSink for TelegramSink {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), NotifyError> {
        let response = self
            .http
            .get(self.endpoint())
            .query(&[("chat_id", recipient), ("text", message)])
            .send()
            .await
            .map_err(|e| NotifyError::Transport {
                error: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(recipient, "telegram message delivered");
            return Ok(());
        }

        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_BODY {
            let mut cut = MAX_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
