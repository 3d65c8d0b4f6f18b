use std::fmt;
use std::time::Duration;

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::market::types::WatchScope;

/// Immutable runtime configuration, validated once at startup.
#[derive(Clone)]
pub struct AppConfig {
    // =========================
    // Notification
    // =========================
    /// Telegram bot token. Never logged.
    pub tg_token: String,

    /// Destination chat.
    pub tg_chat_id: i64,

    pub telegram_url: String,

    // =========================
    // Sampling
    // =========================
    pub quote_url: String,

    /// Instruments outside the scope are ignored entirely.
    pub watch_scope: WatchScope,

    /// Relative change strictly above this fires an alert.
    pub change_min: f64,

    /// Pause between the end of one cycle and the start of the next.
    pub poll_interval: Duration,

    /// Applied to both the ticker fetch and alert delivery.
    pub request_timeout: Duration,

    /// Bound on in-flight per-instrument evaluations within a cycle.
    pub max_concurrency: usize,
}

impl TryFrom<Cli> for AppConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let tg_token = cli
            .tg_token
            .filter(|t| !t.trim().is_empty())
            .ok_or(ConfigError::MissingToken)?;

        let tg_chat_id = cli
            .tg_chat_id
            .filter(|id| *id != 0)
            .ok_or(ConfigError::MissingChatId)?;

        if !cli.change_min.is_finite() || cli.change_min < 0.0 {
            return Err(ConfigError::InvalidThreshold(cli.change_min));
        }

        if cli.interval_secs == 0 {
            return Err(ConfigError::ZeroValue {
                field: "interval-secs",
            });
        }
        if cli.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroValue {
                field: "request-timeout-secs",
            });
        }
        if cli.max_concurrency == 0 {
            return Err(ConfigError::ZeroValue {
                field: "max-concurrency",
            });
        }

        Ok(Self {
            tg_token,
            tg_chat_id,
            telegram_url: cli.telegram_url,
            quote_url: cli.quote_url,
            watch_scope: WatchScope::new(cli.ticker.as_deref()),
            change_min: cli.change_min,
            poll_interval: Duration::from_secs(cli.interval_secs),
            request_timeout: Duration::from_secs(cli.request_timeout_secs),
            max_concurrency: cli.max_concurrency,
        })
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("tg_token", &"<redacted>")
            .field("tg_chat_id", &self.tg_chat_id)
            .field("telegram_url", &self.telegram_url)
            .field("quote_url", &self.quote_url)
            .field("watch_scope", &self.watch_scope)
            .field("change_min", &self.change_min)
            .field("poll_interval", &self.poll_interval)
            .field("request_timeout", &self.request_timeout)
            .field("max_concurrency", &self.max_concurrency)
            .finish()
    }
}
