//! Scripted in-memory provider.
//!
//! Serves pre-built pages, fails on demand and records every ranked page
//! request with the (tokio) instant it was issued, so pacing can be
//! asserted on a paused clock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use tokio::time::Instant;

use crate::errors::MarketDataError;
use crate::models::{
    CatalogEntry, MarketCapPoint, MarketsQuery, PricePoint, RawCoinMarket, RawGlobalMarket,
    SimplePrices,
};
use crate::provider::{CoinDataProvider, RateLimit};

const PROVIDER_ID: &str = "SCRIPTED";

/// One recorded `coins_markets` call.
#[derive(Clone, Debug)]
pub struct RecordedCall {
    pub query: MarketsQuery,
    pub at: Instant,
}

/// Provider that answers from memory.
pub struct ScriptedProvider {
    catalog: Vec<CatalogEntry>,
    pages: Vec<Vec<RawCoinMarket>>,
    prices: SimplePrices,
    global: RawGlobalMarket,
    global_chart: Vec<MarketCapPoint>,
    chart: Vec<PricePoint>,
    rate_limit: RateLimit,
    /// 1-based page that fails; 0 means none
    fail_on_page: AtomicU32,
    offline: AtomicBool,
    catalog_calls: AtomicUsize,
    calls: Mutex<Vec<RecordedCall>>,
}

/// A synthetic ranked record; rank doubles as price.
pub fn synthetic_coin(rank: u32) -> RawCoinMarket {
    RawCoinMarket {
        id: format!("asset-{}", rank),
        symbol: format!("a{}", rank),
        name: format!("Asset {}", rank),
        current_price: Some(rank as f64),
        market_cap: Some(1_000_000.0 / rank as f64),
        market_cap_rank: Some(rank),
        total_volume: Some(5_000.0),
        circulating_supply: Some(1_000.0),
        total_supply: None,
        last_updated: Some("2024-03-01T12:30:00.000Z".to_string()),
        price_change_percentage_1h_in_currency: Some(0.5),
        price_change_percentage_24h_in_currency: Some(1.0),
        price_change_percentage_7d_in_currency: None,
        price_change_percentage_30d_in_currency: Some(3.0),
    }
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            catalog: Vec::new(),
            pages: Vec::new(),
            prices: HashMap::new(),
            global: RawGlobalMarket::default(),
            global_chart: Vec::new(),
            chart: Vec::new(),
            rate_limit: RateLimit {
                requests_per_minute: 6_000,
                burst: 100,
                max_page_size: 250,
            },
            fail_on_page: AtomicU32::new(0),
            offline: AtomicBool::new(false),
            catalog_calls: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_catalog(mut self, catalog: Vec<CatalogEntry>) -> Self {
        self.catalog = catalog;
        self
    }

    /// `count` full pages of `page_size` synthetic coins, ranks ascending.
    pub fn with_synthetic_pages(mut self, count: u32, page_size: u32) -> Self {
        self.pages = (0..count)
            .map(|page| {
                (1..=page_size)
                    .map(|i| synthetic_coin(page * page_size + i))
                    .collect()
            })
            .collect();
        self
    }

    pub fn with_pages(mut self, pages: Vec<Vec<RawCoinMarket>>) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_price(mut self, id: &str, currency: &str, price: f64) -> Self {
        self.prices
            .entry(id.to_string())
            .or_default()
            .insert(currency.to_string(), price);
        self
    }

    pub fn with_global(mut self, global: RawGlobalMarket) -> Self {
        self.global = global;
        self
    }

    pub fn with_global_chart(mut self, points: Vec<MarketCapPoint>) -> Self {
        self.global_chart = points;
        self
    }

    pub fn with_chart(mut self, chart: Vec<PricePoint>) -> Self {
        self.chart = chart;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: RateLimit) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    /// Makes every request for `page` (1-based) fail.
    pub fn fail_on_page(&self, page: u32) {
        self.fail_on_page.store(page, Ordering::SeqCst);
    }

    /// Makes every call fail until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn lock_calls(&self) -> MutexGuard<'_, Vec<RecordedCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every ranked page request so far, in issue order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock_calls().clone()
    }

    pub fn catalog_calls(&self) -> usize {
        self.catalog_calls.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> Result<(), MarketDataError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: "scripted outage".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CoinDataProvider for ScriptedProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn coin_url(&self, id: &str) -> String {
        format!("https://scripted.invalid/coins/{}", id)
    }

    fn rate_limit(&self) -> RateLimit {
        self.rate_limit.clone()
    }

    async fn ping(&self) -> Result<(), MarketDataError> {
        self.check_online().map_err(|e| MarketDataError::PingFailed {
            provider: PROVIDER_ID.to_string(),
            message: e.to_string(),
        })
    }

    async fn coins_list(&self) -> Result<Vec<CatalogEntry>, MarketDataError> {
        self.catalog_calls.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        Ok(self.catalog.clone())
    }

    async fn coins_markets(
        &self,
        query: &MarketsQuery,
    ) -> Result<Vec<RawCoinMarket>, MarketDataError> {
        self.lock_calls().push(RecordedCall {
            query: query.clone(),
            at: Instant::now(),
        });
        self.check_online()?;

        if self.fail_on_page.load(Ordering::SeqCst) == query.page {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("scripted failure on page {}", query.page),
            });
        }

        if !query.ids.is_empty() {
            if query.page > 1 {
                return Ok(Vec::new());
            }
            return Ok(self
                .pages
                .iter()
                .flatten()
                .filter(|coin| query.ids.contains(&coin.id))
                .cloned()
                .collect());
        }

        let index = query.page.saturating_sub(1) as usize;
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }

    async fn simple_price(
        &self,
        ids: &[String],
        currencies: &[String],
    ) -> Result<SimplePrices, MarketDataError> {
        self.check_online()?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                let prices = self.prices.get(id)?;
                let selected: HashMap<String, f64> = prices
                    .iter()
                    .filter(|(currency, _)| currencies.contains(currency))
                    .map(|(currency, price)| (currency.clone(), *price))
                    .collect();
                Some((id.clone(), selected))
            })
            .collect())
    }

    async fn global(&self) -> Result<RawGlobalMarket, MarketDataError> {
        self.check_online()?;
        Ok(self.global.clone())
    }

    async fn global_chart(
        &self,
        _currency: &str,
        _days: u32,
    ) -> Result<Vec<MarketCapPoint>, MarketDataError> {
        self.check_online()?;
        Ok(self.global_chart.clone())
    }

    async fn market_chart(
        &self,
        _id: &str,
        _currency: &str,
        _days: u32,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        self.check_online()?;
        Ok(self.chart.clone())
    }
}
