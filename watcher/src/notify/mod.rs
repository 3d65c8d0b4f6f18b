pub mod telegram;

use async_trait::async_trait;

use crate::error::DeliveryError;

pub use telegram::{DEFAULT_TELEGRAM_URL, TelegramNotifier};

/// Sink for plain-text alerts. The destination is fixed when the notifier is built.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, message: &str) -> Result<(), DeliveryError>;
}
