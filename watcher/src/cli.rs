use clap::Parser;

use crate::market::probit::DEFAULT_TICKER_URL;
use crate::notify::DEFAULT_TELEGRAM_URL;

/// Startup flags. Every flag can also come from the environment.
///
/// Required values are optional here so that their absence is reported as a
/// `ConfigError` by `AppConfig::try_from`.
#[derive(Debug, Parser)]
#[clap(name = "watcher", version, about = "Alerts on large moves in exchange tickers")]
pub struct Cli {
    /// Telegram bot api token
    #[clap(long = "tg-token", env = "TG_BOT_TOKEN", hide_env_values = true)]
    pub tg_token: Option<String>,

    /// Telegram chat id (negative for groups)
    #[clap(long = "tg-chatid", env = "TG_CHAT_ID", allow_negative_numbers = true)]
    pub tg_chat_id: Option<i64>,

    /// Ticker last part, e.g. `USDT` to watch only `*-USDT` markets
    #[clap(long = "ticker", env = "WATCH_TICKER")]
    pub ticker: Option<String>,

    /// Minimum relative change that triggers an alert
    #[clap(long = "change-min", env = "CHANGE_MIN", default_value_t = 0.01)]
    pub change_min: f64,

    /// Seconds to sleep between cycles
    #[clap(long, env = "POLL_INTERVAL_SECS", default_value_t = 5)]
    pub interval_secs: u64,

    /// Timeout for each HTTP request, in seconds
    #[clap(long, env = "REQUEST_TIMEOUT_SECS", default_value_t = 10)]
    pub request_timeout_secs: u64,

    /// Upper bound on concurrent per-instrument evaluations
    #[clap(long, env = "MAX_CONCURRENCY", default_value_t = 16)]
    pub max_concurrency: usize,

    /// Ticker endpoint
    #[clap(long, env = "QUOTE_API_URL", default_value = DEFAULT_TICKER_URL)]
    pub quote_url: String,

    /// Telegram Bot API base url
    #[clap(long, env = "TELEGRAM_API_URL", default_value = DEFAULT_TELEGRAM_URL)]
    pub telegram_url: String,
}
