use serde::Deserialize;

use crate::market::types::Quote;

/// Body of `GET /api/exchange/v1/ticker`.
#[derive(Debug, Deserialize)]
pub struct TickerEnvelope {
    pub data: Vec<TickerItem>,
}

#[derive(Debug, Deserialize)]
pub struct TickerItem {
    pub market_id: String,

    /// Absent or `null` when the market had no trades.
    #[serde(default)]
    pub last: Option<String>,
}

impl From<TickerItem> for Quote {
    fn from(item: TickerItem) -> Self {
        Quote {
            instrument_id: item.market_id,
            raw_last: item.last.unwrap_or_default(),
        }
    }
}
