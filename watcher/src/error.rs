use thiserror::Error;

/// Invalid or missing startup configuration. The only error allowed to stop the process.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing telegram bot token")]
    MissingToken,

    #[error("missing telegram chat id")]
    MissingChatId,

    #[error("invalid change threshold: {0}")]
    InvalidThreshold(f64),

    #[error("{field} must be at least 1")]
    ZeroValue { field: &'static str },

    #[error("http client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Failure to obtain a full quote snapshot. Aborts the current cycle only.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response from quote api: {0}")]
    InvalidResponse(String),
}

/// The `last` value of one instrument is not a finite number.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("[{instrument_id}] unparseable last value {raw:?}")]
pub struct ParseError {
    pub instrument_id: String,
    pub raw: String,
}

/// A single alert could not be delivered. Logged, never retried.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("notification rejected: {0}")]
    Rejected(String),
}
