use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::market::types::ObservedQuote;

/// In-memory store of the last successfully parsed quote per instrument.
///
/// Lives for the whole process and is never cleared. Commits come from the
/// scheduler task only; the lock exists so clones of the handle stay sound.
#[derive(Clone, Default)]
pub struct SnapshotStore {
    inner: Arc<RwLock<HashMap<String, ObservedQuote>>>,
}

impl SnapshotStore {
    /// Create an empty snapshot store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the remembered quote for an instrument. Last write wins.
    pub async fn set(&self, instrument_id: &str, quote: ObservedQuote) {
        let mut g = self.inner.write().await;
        g.insert(instrument_id.to_string(), quote);
    }

    /// Fetch the remembered quote for an instrument, if one was ever committed.
    pub async fn get(&self, instrument_id: &str) -> Option<ObservedQuote> {
        let g = self.inner.read().await;
        g.get(instrument_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observed(id: &str, last: f64) -> ObservedQuote {
        ObservedQuote {
            instrument_id: id.to_string(),
            raw_last: last.to_string(),
            parsed_last: last,
            change_ratio: None,
        }
    }

    #[tokio::test]
    async fn starts_empty() {
        let store = SnapshotStore::new();
        assert!(store.is_empty().await);
        assert_eq!(store.get("BTC-USDT").await, None);
    }

    #[tokio::test]
    async fn set_overwrites_per_key() {
        let store = SnapshotStore::new();
        store.set("BTC-USDT", observed("BTC-USDT", 100.0)).await;
        store.set("ETH-USDT", observed("ETH-USDT", 50.0)).await;
        store.set("BTC-USDT", observed("BTC-USDT", 101.5)).await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.get("BTC-USDT").await.unwrap().parsed_last, 101.5);
        assert_eq!(store.get("ETH-USDT").await.unwrap().parsed_last, 50.0);
    }

    #[tokio::test]
    async fn clones_share_state() {
        let store = SnapshotStore::new();
        let handle = store.clone();
        handle.set("XRP-USDT", observed("XRP-USDT", 0.5)).await;

        assert_eq!(store.get("XRP-USDT").await, Some(observed("XRP-USDT", 0.5)));
    }
}
