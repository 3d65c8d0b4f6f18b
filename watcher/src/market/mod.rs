pub mod probit;
pub mod source;
pub mod types;

pub use source::QuoteSource;
pub use types::{ObservedQuote, Quote, WatchScope};
