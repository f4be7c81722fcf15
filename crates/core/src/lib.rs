//! Cointrack Core - caching and orchestration over market data.
//!
//! This crate holds the two-tier cache and the market data service that
//! seeds the identifier resolver from disk, runs refresh cycles and serves
//! targeted lookups. Provider access lives in `cointrack-market-data`.

pub mod cache;
pub mod config;
pub mod errors;
pub mod market;

pub use cache::{cache_key, clean, TwoTierCache};
pub use config::{CacheConfig, ServiceConfig};
pub use market::{MarketDataService, MarketDataServiceTrait, RefreshSummary};

// Re-export error types
pub use errors::{CacheError, CoreError, Result};
