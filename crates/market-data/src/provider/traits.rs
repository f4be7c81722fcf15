//! Market data provider trait definitions.
//!
//! This module defines the `CoinDataProvider` trait that the upstream
//! provider implementation satisfies. Providers receive canonical IDs only;
//! resolution from user input happens before the call.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{
    CatalogEntry, MarketCapPoint, MarketsQuery, PricePoint, RawCoinMarket, RawGlobalMarket,
    SimplePrices,
};

use super::capabilities::RateLimit;

/// Trait for upstream crypto market data providers.
///
/// Implementations return raw payloads; normalization is applied by the
/// caller through the `format` module.
#[async_trait]
pub trait CoinDataProvider: Send + Sync {
    /// Unique identifier for this provider (e.g. "COINGECKO").
    ///
    /// Used for logging, rate limiting and cache keys.
    fn id(&self) -> &'static str;

    /// Rate limiting configuration applied to every call.
    fn rate_limit(&self) -> RateLimit {
        RateLimit::default()
    }

    /// Public web page for a canonical coin ID.
    fn coin_url(&self, id: &str) -> String;

    /// Lightweight connectivity probe; success means "did not error".
    async fn ping(&self) -> Result<(), MarketDataError>;

    /// Every coin the provider knows, with ID, name and symbol.
    async fn coins_list(&self) -> Result<Vec<CatalogEntry>, MarketDataError>;

    /// One ranked market-data page.
    ///
    /// Records come back in provider order (descending market cap).
    async fn coins_markets(&self, query: &MarketsQuery)
        -> Result<Vec<RawCoinMarket>, MarketDataError>;

    /// Prices for `ids` in each of `currencies`.
    async fn simple_price(
        &self,
        ids: &[String],
        currencies: &[String],
    ) -> Result<SimplePrices, MarketDataError>;

    /// Global market statistics.
    async fn global(&self) -> Result<RawGlobalMarket, MarketDataError>;

    /// Total market capitalization over the last `days` days.
    async fn global_chart(
        &self,
        currency: &str,
        days: u32,
    ) -> Result<Vec<MarketCapPoint>, MarketDataError>;

    /// Price history of one coin over the last `days` days.
    async fn market_chart(
        &self,
        id: &str,
        currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, MarketDataError>;
}
