//! Market data models
//!
//! This module contains the core data types for market data operations:
//! - `catalog` - Provider-wide coin catalog entries (CatalogEntry)
//! - `coin` - Raw and canonical market records (RawCoinMarket, CoinRecord)
//! - `market` - Global market statistics, chart points, simple prices
//! - `query` - Ranked page request parameters (MarketsQuery)

mod catalog;
mod coin;
mod market;
mod query;

pub use catalog::CatalogEntry;
pub use coin::{sort_by_rank, CoinRecord, RawCoinMarket, UNRANKED_SENTINEL};
pub use market::{GlobalMarketData, MarketCapPoint, PricePoint, RawGlobalMarket, SimplePrices};
pub use query::{MarketsQuery, PriceChangeWindow, ORDER_MARKET_CAP_DESC};
