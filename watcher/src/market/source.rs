use async_trait::async_trait;

use crate::error::FetchError;
use crate::market::types::Quote;

/// Provider of the full, unfiltered quote list.
#[async_trait]
pub trait QuoteSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Quote>, FetchError>;
}
