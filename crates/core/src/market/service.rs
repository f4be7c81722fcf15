//! Market data service.
//!
//! Wires the identifier resolver, the acquisition pipeline and the two-tier
//! cache together:
//! - Startup seeding: durable load first, catalog refresh after
//! - Refresh cycles that overwrite both tiers on success
//! - Targeted lookups with volatile caching and stale fallbacks

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cointrack_market_data::format::format_rank;
use cointrack_market_data::{
    chart_days, sort_by_rank, supported_currencies, AcquisitionPipeline, CatalogEntry,
    CoinDataProvider, CoinRecord, GlobalMarketData, IdentifierResolver, MarketCapPoint,
    MarketDataError, MarketLookup, PageStream, PricePoint,
};
use log::{debug, info, warn};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;

use super::model::RefreshSummary;
use crate::cache::{
    cache_key, Expiration, TwoTierCache, CATALOG_DATASET, GLOBAL_CHART_DATASET, MARKET_DATASET,
    RECORDS_DATASET,
};
use crate::config::ServiceConfig;
use crate::errors::Result;

/// Volatile lifetime of global market statistics and the market-cap chart.
const MARKET_TTL: Duration = Duration::from_secs(10);

/// Market data operations exposed to front ends.
#[async_trait]
pub trait MarketDataServiceTrait: Send + Sync {
    /// Reads the durable catalog and record set and seeds the resolver.
    fn load_durable(&self) -> Vec<CoinRecord>;

    /// Fetches the provider catalog and republishes the resolver.
    async fn refresh_catalog(&self) -> Result<usize>;

    /// Fetches every ranked page and overwrites both cache tiers.
    async fn refresh_all(&self, currency: &str) -> RefreshSummary;

    /// Record for one coin, volatile cache first.
    async fn coin(&self, name: &str, currency: &str) -> Result<Option<CoinRecord>>;

    /// Records for several coins in one request.
    async fn coins(&self, names: &[String], currency: &str) -> Result<Vec<CoinRecord>>;

    async fn price(&self, name: &str, currency: &str) -> Result<Decimal>;

    /// Global market statistics, the last cached value when the provider
    /// cannot be reached.
    async fn global_market(&self, currency: &str) -> Result<GlobalMarketData>;

    /// Global market-cap chart, cached like [`Self::global_market`].
    async fn global_chart(
        &self,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MarketCapPoint>>;

    async fn coin_chart(
        &self,
        name: &str,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>>;

    async fn ping(&self) -> Result<()>;
}

/// Facade over resolver, pipeline and cache for one provider.
pub struct MarketDataService {
    pipeline: AcquisitionPipeline,
    lookup: MarketLookup,
    resolver: Arc<IdentifierResolver>,
    cache: Arc<TwoTierCache>,
}

impl MarketDataService {
    pub fn new(provider: Arc<dyn CoinDataProvider>, config: ServiceConfig) -> Self {
        let cache = Arc::new(TwoTierCache::open(config.cache));
        Self::with_cache(provider, config.pipeline, cache)
    }

    pub fn with_cache(
        provider: Arc<dyn CoinDataProvider>,
        pipeline_config: cointrack_market_data::PipelineConfig,
        cache: Arc<TwoTierCache>,
    ) -> Self {
        let resolver = Arc::new(IdentifierResolver::new());
        let pipeline = AcquisitionPipeline::new(provider, Arc::clone(&resolver), pipeline_config);
        let lookup = pipeline.lookup();
        Self {
            pipeline,
            lookup,
            resolver,
            cache,
        }
    }

    pub fn cache(&self) -> &Arc<TwoTierCache> {
        &self.cache
    }

    pub fn resolver(&self) -> &Arc<IdentifierResolver> {
        &self.resolver
    }

    fn key(&self, name: &str) -> String {
        cache_key(self.pipeline.provider_id(), name)
    }

    fn records_key(&self) -> String {
        self.key(RECORDS_DATASET)
    }

    fn page_key(&self, currency: &str, page: u32) -> String {
        self.key(&format!("page_{}_{}", currency, page))
    }

    fn coin_key(&self, id: &str, currency: &str) -> String {
        self.key(&format!("coin_{}_{}", id, currency))
    }

    fn global_chart_key(&self, currency: &str, days: u32) -> String {
        self.key(&format!("{}_{}_{}", GLOBAL_CHART_DATASET, currency, days))
    }

    /// Durable load followed by a catalog refresh.
    ///
    /// A failed refresh is logged; the durable snapshot stays published.
    pub async fn bootstrap(&self) -> Vec<CoinRecord> {
        let records = self.load_durable();
        if let Err(e) = self.refresh_catalog().await {
            warn!("Catalog refresh failed, using cached catalog: {}", e);
        }
        records
    }

    /// Copies the durable market-cap chart for `currency` and `days` into
    /// the volatile tier. Returns whether there was one.
    pub fn seed_global_chart(&self, currency: &str, days: u32) -> bool {
        let currency = self.pipeline.config().currency(currency);
        let key = self.global_chart_key(&currency, days);
        match self.cache.get_durable::<Vec<MarketCapPoint>>(&key) {
            Some(points) => {
                debug!("Seeded '{}' with {} point(s)", key, points.len());
                self.cache.set_volatile(&key, points, Expiration::After(MARKET_TTL));
                true
            }
            None => false,
        }
    }

    /// Live volatile value for `key` when `usable`, otherwise `fetch` written
    /// to both tiers, otherwise the cached value when `fetch` fails.
    async fn fetch_with_fallback<T, U, F>(&self, key: &str, usable: U, fetch: F) -> Result<T>
    where
        T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
        U: Fn(&T) -> bool + Sync,
        F: Future<Output = std::result::Result<T, MarketDataError>> + Send,
    {
        if let Some(value) = self.cache.get_volatile::<T>(key) {
            if usable(&value) {
                return Ok(value);
            }
        }

        match fetch.await {
            Ok(value) => {
                let expiration = Expiration::After(MARKET_TTL);
                if let Err(e) = self.cache.set(key, value.clone(), expiration) {
                    warn!("Failed to persist '{}': {}", key, e);
                }
                Ok(value)
            }
            Err(e) => match self.cache.get::<T>(key) {
                Some(stale) if usable(&stale) => {
                    warn!("Refresh of '{}' failed, serving cached value: {}", key, e);
                    Ok(stale)
                }
                _ => Err(e.into()),
            },
        }
    }

    /// Raw page stream for callers that consume pages themselves.
    pub fn stream_all(&self, currency: &str) -> PageStream {
        self.pipeline.fetch_all(currency)
    }

    /// Last known record set, volatile tier first.
    pub fn cached_records(&self) -> Vec<CoinRecord> {
        self.cache
            .get::<Vec<CoinRecord>>(&self.records_key())
            .unwrap_or_default()
    }

    pub fn coin_link(&self, name: &str) -> String {
        self.lookup.coin_link(name)
    }

    pub fn supported_currencies(&self) -> Vec<String> {
        supported_currencies()
    }

    /// Starts the volatile tier janitor.
    pub fn start_janitor(&self) -> JoinHandle<()> {
        self.cache.spawn_janitor()
    }

    /// Clears the volatile tier and removes durable cache files.
    pub fn reset(&self) -> Result<usize> {
        Ok(self.cache.reset()?)
    }

    /// Records of a truncated refresh merged over the previous set: fresh
    /// records replace old ones with the same ID, old records the refresh
    /// never reached stay.
    fn merge_truncated(&self, fresh: Vec<CoinRecord>, currency: &str) -> Vec<CoinRecord> {
        let mut merged: HashMap<String, CoinRecord> = self
            .cached_records()
            .into_iter()
            .filter(|record| record.currency == currency)
            .map(|record| (record.id.clone(), record))
            .collect();
        for record in fresh {
            merged.insert(record.id.clone(), record);
        }
        let mut records: Vec<CoinRecord> = merged.into_values().collect();
        sort_by_rank(&mut records);
        records
    }

    fn store_records(&self, records: Vec<CoinRecord>) {
        let key = self.records_key();
        if let Err(e) = self.cache.set(&key, records, Expiration::Never) {
            warn!("Failed to persist record set: {}", e);
        }
    }
}

#[async_trait]
impl MarketDataServiceTrait for MarketDataService {
    fn load_durable(&self) -> Vec<CoinRecord> {
        if let Some(catalog) = self
            .cache
            .get_durable::<Vec<CatalogEntry>>(&self.key(CATALOG_DATASET))
        {
            info!("Loaded cached catalog with {} coin(s)", catalog.len());
            self.resolver.publish_catalog(&catalog);
        }

        let mut records = self
            .cache
            .get_durable::<Vec<CoinRecord>>(&self.records_key())
            .unwrap_or_default();
        for record in records.iter_mut() {
            record.rank = format_rank(Some(record.rank));
        }
        sort_by_rank(&mut records);
        debug!("Loaded {} cached record(s)", records.len());
        records
    }

    async fn refresh_catalog(&self) -> Result<usize> {
        let catalog = self.lookup.catalog().await?;
        self.resolver.publish_catalog(&catalog);
        if let Err(e) = self.cache.set_durable(&self.key(CATALOG_DATASET), &catalog) {
            warn!("Failed to persist catalog: {}", e);
        }
        info!("Catalog refreshed: {} coin(s)", catalog.len());
        Ok(catalog.len())
    }

    async fn refresh_all(&self, currency: &str) -> RefreshSummary {
        let currency = self.pipeline.config().currency(currency);
        let mut stream = self.pipeline.fetch_all(&currency);
        let mut fresh: Vec<CoinRecord> = Vec::new();
        let mut page = 0u32;

        while let Some(records) = stream.next_page().await {
            page += 1;
            fresh.extend(records.iter().cloned());
            self.cache.set_volatile(
                &self.page_key(&currency, page),
                records,
                Expiration::After(self.cache.volatile().default_ttl()),
            );
        }
        let outcome = stream.finish().await;

        let summary = RefreshSummary {
            currency: currency.clone(),
            pages: page,
            records: fresh.len(),
            completed: outcome.is_complete(),
            error: outcome.error,
        };

        if page == 0 {
            warn!("Refresh in {} fetched nothing, keeping cached data", currency);
            return summary;
        }

        let records = if summary.completed {
            fresh
        } else {
            self.merge_truncated(fresh, &currency)
        };
        self.store_records(records);
        info!(
            "Refreshed {} record(s) over {} page(s) in {}{}",
            summary.records,
            summary.pages,
            currency,
            if summary.completed { "" } else { " (truncated)" }
        );
        summary
    }

    async fn coin(&self, name: &str, currency: &str) -> Result<Option<CoinRecord>> {
        let currency = self.pipeline.config().currency(currency);
        let key = self.coin_key(&self.resolver.resolve(name), &currency);
        if let Some(record) = self.cache.get_volatile::<CoinRecord>(&key) {
            debug!("Cache hit for coin '{}'", key);
            return Ok(Some(record));
        }

        let record = self.pipeline.fetch_coin(name, &currency).await?;
        if let Some(record) = &record {
            self.cache.set_volatile(
                &key,
                record.clone(),
                Expiration::After(self.cache.volatile().default_ttl()),
            );
        }
        Ok(record)
    }

    async fn coins(&self, names: &[String], currency: &str) -> Result<Vec<CoinRecord>> {
        Ok(self.pipeline.fetch_batch(names, currency).await?)
    }

    async fn price(&self, name: &str, currency: &str) -> Result<Decimal> {
        Ok(self.lookup.price(name, currency).await?)
    }

    async fn global_market(&self, currency: &str) -> Result<GlobalMarketData> {
        let currency = self.pipeline.config().currency(currency);
        let key = self.key(MARKET_DATASET);
        self.fetch_with_fallback(
            &key,
            |market: &GlobalMarketData| market.currency == currency,
            self.lookup.global_market(&currency),
        )
        .await
    }

    async fn global_chart(
        &self,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MarketCapPoint>> {
        let currency = self.pipeline.config().currency(currency);
        let key = self.global_chart_key(&currency, chart_days(start, end));
        self.fetch_with_fallback(
            &key,
            |_: &Vec<MarketCapPoint>| true,
            self.lookup.global_chart(&currency, start, end),
        )
        .await
    }

    async fn coin_chart(
        &self,
        name: &str,
        currency: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<PricePoint>> {
        let currency = self.pipeline.config().currency(currency);
        let key = self.key(&format!(
            "chart_{}_{}_{}",
            self.resolver.resolve(name),
            currency,
            chart_days(start, end)
        ));
        if let Some(points) = self.cache.get_volatile::<Vec<PricePoint>>(&key) {
            return Ok(points);
        }

        let points = self.lookup.coin_chart(name, &currency, start, end).await?;
        self.cache.set_volatile(
            &key,
            points.clone(),
            Expiration::After(self.cache.volatile().default_ttl()),
        );
        Ok(points)
    }

    async fn ping(&self) -> Result<()> {
        Ok(self.lookup.ping().await?)
    }
}
