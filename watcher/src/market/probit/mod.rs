pub mod client;
pub mod types;

pub use client::{DEFAULT_TICKER_URL, ProbitClient};
pub use types::*;
