pub mod cli;
pub mod comparator;
pub mod config;
pub mod error;
pub mod market;
pub mod metrics;
pub mod notify;
pub mod scheduler;
pub mod snapshot;
