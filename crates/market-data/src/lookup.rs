//! Single-value lookups: price, global market statistics, price and
//! market-cap charts, connectivity and coin links.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use rust_decimal::Decimal;

use crate::errors::MarketDataError;
use crate::format::{format_price, normalize_global};
use crate::models::{CatalogEntry, GlobalMarketData, MarketCapPoint, PricePoint};
use crate::pipeline::{PipelineConfig, RateLimiter};
use crate::provider::CoinDataProvider;
use crate::resolver::IdentifierResolver;

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days covered by `start..end`, rounded up, at least one.
pub fn chart_days(start: DateTime<Utc>, end: DateTime<Utc>) -> u32 {
    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return 1;
    }
    let days = (seconds + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY;
    u32::try_from(days).unwrap_or(u32::MAX).max(1)
}

/// Lookups that each cost one provider request.
///
/// Obtained from [`AcquisitionPipeline::lookup`](crate::pipeline::AcquisitionPipeline::lookup)
/// so requests share the pipeline's rate limiter.
#[derive(Clone)]
pub struct MarketLookup {
    provider: Arc<dyn CoinDataProvider>,
    resolver: Arc<IdentifierResolver>,
    limiter: Arc<RateLimiter>,
    config: PipelineConfig,
}

impl MarketLookup {
    pub(crate) fn new(
        provider: Arc<dyn CoinDataProvider>,
        resolver: Arc<IdentifierResolver>,
        limiter: Arc<RateLimiter>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            provider,
            resolver,
            limiter,
            config,
        }
    }

    async fn throttle(&self) {
        self.limiter.acquire(self.provider.id()).await;
    }

    /// Succeeds when the provider answered the probe.
    pub async fn ping(&self) -> Result<(), MarketDataError> {
        self.throttle().await;
        self.provider.ping().await
    }

    /// The provider's full coin catalog.
    pub async fn catalog(&self) -> Result<Vec<CatalogEntry>, MarketDataError> {
        self.throttle().await;
        let catalog = self.provider.coins_list().await?;
        debug!("Catalog from {}: {} coin(s)", self.provider.id(), catalog.len());
        Ok(catalog)
    }

    /// Current price of one coin, rounded for the currency.
    ///
    /// # Errors
    ///
    /// [`MarketDataError::NotFound`] when the provider has no entry for the
    /// coin in that currency.
    pub async fn price(&self, name: &str, currency: &str) -> Result<Decimal, MarketDataError> {
        let currency = self.config.currency(currency);
        let id = self.resolver.resolve(name);

        self.throttle().await;
        let prices = self
            .provider
            .simple_price(&[id.clone()], &[currency.clone()])
            .await?;

        match prices.get(&id).and_then(|by_currency| by_currency.get(&currency)) {
            Some(price) => Ok(format_price(Some(*price), &currency)),
            None => Err(MarketDataError::NotFound { coin: id, currency }),
        }
    }

    pub async fn global_market(&self, currency: &str) -> Result<GlobalMarketData, MarketDataError> {
        let currency = self.config.currency(currency);
        self.throttle().await;
        let raw = self.provider.global().await?;
        Ok(normalize_global(&raw, &currency))
    }

    /// Total market capitalization between `start` and `end`.
    pub async fn global_chart(
        &self,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MarketCapPoint>, MarketDataError> {
        let currency = self.config.currency(currency);
        let days = chart_days(start, end);
        debug!("Global market-cap chart in {} over {} day(s)", currency, days);

        self.throttle().await;
        self.provider.global_chart(&currency, days).await
    }

    /// Price points of one coin between `start` and `end`, as the provider
    /// returned them.
    pub async fn coin_chart(
        &self,
        name: &str,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let currency = self.config.currency(currency);
        let id = self.resolver.resolve(name);
        let days = chart_days(start, end);
        debug!("Chart for {} in {} over {} day(s)", id, currency, days);

        self.throttle().await;
        self.provider.market_chart(&id, &currency, days).await
    }

    /// Public web page for a coin.
    pub fn coin_link(&self, name: &str) -> String {
        self.provider.coin_url(&self.resolver.resolve(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawGlobalMarket;
    use crate::pipeline::AcquisitionPipeline;
    use crate::provider::mock::ScriptedProvider;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup(provider: ScriptedProvider) -> MarketLookup {
        let resolver = Arc::new(IdentifierResolver::new());
        resolver.publish_catalog(&[CatalogEntry::new("bitcoin", "Bitcoin", "btc")]);
        AcquisitionPipeline::new(Arc::new(provider), resolver, PipelineConfig::default()).lookup()
    }

    #[test]
    fn test_chart_days() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(chart_days(start, start), 1);
        assert_eq!(chart_days(start, start - Duration::days(3)), 1);
        assert_eq!(chart_days(start, start + Duration::hours(1)), 1);
        assert_eq!(chart_days(start, start + Duration::days(7)), 7);
        assert_eq!(chart_days(start, start + Duration::days(7) + Duration::seconds(1)), 8);
    }

    #[tokio::test]
    async fn test_price_resolves_and_rounds() {
        let lookup = lookup(ScriptedProvider::new().with_price("bitcoin", "usd", 65_123.456_7));

        let price = lookup.price("BTC", "USD").await.unwrap();
        assert_eq!(price, dec!(65123.46));
    }

    #[tokio::test]
    async fn test_price_missing_currency_is_not_found() {
        let lookup = lookup(ScriptedProvider::new().with_price("bitcoin", "usd", 65_000.0));

        let err = lookup.price("bitcoin", "eur").await.unwrap_err();
        match err {
            MarketDataError::NotFound { coin, currency } => {
                assert_eq!(coin, "bitcoin");
                assert_eq!(currency, "eur");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_global_market_normalized() {
        let global = RawGlobalMarket {
            active_cryptocurrencies: Some(12_000),
            markets: Some(900),
            total_market_cap: HashMap::from([("usd".to_string(), 2.5e12)]),
            total_volume: HashMap::from([("usd".to_string(), 9.0e10)]),
            market_cap_percentage: HashMap::from([("btc".to_string(), 52.1)]),
        };
        let lookup = lookup(ScriptedProvider::new().with_global(global));

        let market = lookup.global_market("Usd").await.unwrap();
        assert_eq!(market.currency, "usd");
        assert_eq!(market.active_currencies, 12_000);
        assert_eq!(market.active_markets, 900);
        assert_eq!(market.bitcoin_dominance, 52.1);
    }

    #[tokio::test]
    async fn test_coin_chart_passes_points_through() {
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let points = vec![
            PricePoint {
                timestamp: first,
                price: 1.0,
            },
            PricePoint {
                timestamp: first + Duration::minutes(5),
                price: 2.0,
            },
        ];
        let lookup = lookup(ScriptedProvider::new().with_chart(points.clone()));
        let end = Utc::now();

        let chart = lookup
            .coin_chart("bitcoin", "usd", end - Duration::days(2), end)
            .await
            .unwrap();
        assert_eq!(chart, points);
    }

    #[tokio::test]
    async fn test_global_chart_passes_points_through() {
        let first = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let points = vec![
            MarketCapPoint {
                timestamp: first,
                market_cap: 2.4e12,
            },
            MarketCapPoint {
                timestamp: first + Duration::days(1),
                market_cap: 2.5e12,
            },
        ];
        let lookup = lookup(ScriptedProvider::new().with_global_chart(points.clone()));
        let end = Utc::now();

        let chart = lookup
            .global_chart("EUR", end - Duration::days(30), end)
            .await
            .unwrap();
        assert_eq!(chart, points);
    }

    #[tokio::test]
    async fn test_ping_reports_outage() {
        let provider = ScriptedProvider::new();
        provider.set_offline(true);
        let lookup = lookup(provider);

        let err = lookup.ping().await.unwrap_err();
        assert!(err.is_connectivity());
    }

    #[test]
    fn test_coin_link_uses_canonical_id() {
        let lookup = lookup(ScriptedProvider::new());
        assert_eq!(lookup.coin_link("BTC"), "https://scripted.invalid/coins/bitcoin");
    }
}
