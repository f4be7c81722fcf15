//! Cointrack Market Data Crate
//!
//! This crate turns a paginated upstream crypto market data provider into
//! canonical, display-ready records.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Resolving human-typed coin names, symbols and slugs to canonical IDs
//! - Ranked, paginated bulk fetches streamed page by page with pacing
//! - Targeted fetches for one or a few coins
//! - Price, global market and price chart lookups
//! - Normalization of every raw provider field in one place
//!
//! # Architecture
//!
//! ```text
//! +------------------+     +------------------+
//! |    User input    | --> |    Resolver      |  (name/symbol/slug -> ID)
//! +------------------+     +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Pipeline      |  (pages, pacing, rate limit)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |    Provider      |  (CoinGecko)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |     Format       |  (raw -> CoinRecord)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`CatalogEntry`] - One coin of the provider catalog
//! - [`ResolutionTable`] - Immutable lookup key to canonical ID mapping
//! - [`CoinRecord`] - Canonical market record
//! - [`PageStream`] - Stream of normalized pages from a bulk fetch
//! - [`FetchOutcome`] - How a bulk fetch ended

pub mod currencies;
pub mod errors;
pub mod format;
pub mod lookup;
pub mod models;
pub mod pipeline;
pub mod provider;
pub mod resolver;

// Re-export all public types from models
pub use models::{
    sort_by_rank, CatalogEntry, CoinRecord, GlobalMarketData, MarketCapPoint, MarketsQuery,
    PricePoint, RawCoinMarket, RawGlobalMarket, UNRANKED_SENTINEL,
};

pub use errors::{MarketDataError, RetryClass};

// Re-export resolver types
pub use resolver::{slugify, IdentifierResolver, ResolutionTable, ResolutionTableBuilder};

// Re-export pipeline types
pub use lookup::{chart_days, MarketLookup};
pub use pipeline::{AcquisitionPipeline, FetchOutcome, PageStream, PipelineConfig, RateLimiter};

// Re-export provider types
pub use currencies::{supported_currencies, SUPPORTED_CURRENCIES};
pub use provider::coingecko::{CoinGeckoConfig, CoinGeckoProvider};
pub use provider::{CoinDataProvider, RateLimit};
