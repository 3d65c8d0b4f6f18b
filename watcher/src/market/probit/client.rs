use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::error::{ConfigError, FetchError};
use crate::market::probit::types::TickerEnvelope;
use crate::market::source::QuoteSource;
use crate::market::types::Quote;

pub const DEFAULT_TICKER_URL: &str = "https://api.probit.com/api/exchange/v1/ticker";

/// HTTP quote source backed by the ProBit public ticker endpoint.
#[derive(Clone)]
pub struct ProbitClient {
    http: Client,
    url: String,
}

impl ProbitClient {
    pub fn new(url: String, timeout: Duration) -> Result<Self, ConfigError> {
        let http = Client::builder()
            .timeout(timeout)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(30))
            .build()?;

        Ok(Self { http, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl QuoteSource for ProbitClient {
    #[instrument(skip(self), fields(url = %self.url), level = "debug")]
    async fn fetch_all(&self) -> Result<Vec<Quote>, FetchError> {
        let resp = self
            .http
            .get(&self.url)
            .header("x-requested-with", "XMLHttpRequest")
            .send()
            .await?
            .error_for_status()?;

        let body = resp.bytes().await?;
        let quotes = parse_ticker_body(&body)?;

        debug!(count = quotes.len(), "probit tickers fetched");

        Ok(quotes)
    }
}

/// Decodes a ticker response body into raw quotes.
pub fn parse_ticker_body(body: &[u8]) -> Result<Vec<Quote>, FetchError> {
    let envelope: TickerEnvelope =
        serde_json::from_slice(body).map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

    Ok(envelope.data.into_iter().map(Quote::from).collect())
}
