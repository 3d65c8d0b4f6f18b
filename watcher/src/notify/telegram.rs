use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::error::{ConfigError, DeliveryError};
use crate::notify::Notifier;

pub const DEFAULT_TELEGRAM_URL: &str = "https://api.telegram.org";

/// Bot API envelope; only the fields needed to tell success from rejection.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// Sends alerts to a single Telegram chat through `sendMessage`.
#[derive(Clone)]
pub struct TelegramNotifier {
    http: Client,
    base_url: String,
    token: String,
    chat_id: i64,
}

impl TelegramNotifier {
    pub fn new(
        base_url: String,
        token: String,
        chat_id: i64,
        timeout: Duration,
    ) -> Result<Self, ConfigError> {
        if token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if chat_id == 0 {
            return Err(ConfigError::MissingChatId);
        }

        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
            chat_id,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    // The token is part of the URL, so neither it nor the URL is recorded.
    #[instrument(skip(self, message), fields(chat_id = self.chat_id), level = "debug")]
    async fn send(&self, message: &str) -> Result<(), DeliveryError> {
        let chat_id = self.chat_id.to_string();

        let resp = self
            .http
            .get(self.endpoint())
            .header("x-requested-with", "XMLHttpRequest")
            .query(&[("chat_id", chat_id.as_str()), ("text", message)])
            .send()
            .await
            .map_err(|e| DeliveryError::Http(e.without_url()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| DeliveryError::Http(e.without_url()))?;

        check_response(status, &body)?;

        debug!(status = %status, "telegram message delivered");
        Ok(())
    }
}

/// Maps a Bot API reply to a delivery outcome.
///
/// Non-2xx is always a rejection. A 2xx body with `"ok": false` is too;
/// an undecodable 2xx body counts as delivered.
fn check_response(status: StatusCode, body: &[u8]) -> Result<(), DeliveryError> {
    let parsed = serde_json::from_slice::<ApiResponse>(body).ok();

    if !status.is_success() {
        let reason = parsed
            .and_then(|r| r.description)
            .unwrap_or_else(|| "no description".to_string());
        return Err(DeliveryError::Rejected(format!("status {status}: {reason}")));
    }

    match parsed {
        Some(ApiResponse { ok: false, description }) => Err(DeliveryError::Rejected(
            description.unwrap_or_else(|| "ok=false".to_string()),
        )),
        _ => Ok(()),
    }
}
