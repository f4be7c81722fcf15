//! Paginated acquisition against one upstream provider.

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::errors::MarketDataError;
use crate::format::normalize_page;
use crate::lookup::MarketLookup;
use crate::models::{CoinRecord, MarketsQuery, RawCoinMarket};
use crate::provider::CoinDataProvider;
use crate::resolver::IdentifierResolver;

use super::config::PipelineConfig;
use super::rate_limiter::RateLimiter;
use super::stream::{FetchOutcome, PageStream};

/// Fetches ranked market data page by page and normalizes every page.
///
/// Cloning is cheap; clones share the provider, resolver and rate limiter.
#[derive(Clone)]
pub struct AcquisitionPipeline {
    provider: Arc<dyn CoinDataProvider>,
    resolver: Arc<IdentifierResolver>,
    limiter: Arc<RateLimiter>,
    config: PipelineConfig,
}

impl AcquisitionPipeline {
    pub fn new(
        provider: Arc<dyn CoinDataProvider>,
        resolver: Arc<IdentifierResolver>,
        config: PipelineConfig,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::new());
        limiter.configure(provider.id(), &provider.rate_limit());
        Self {
            provider,
            resolver,
            limiter,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn resolver(&self) -> &Arc<IdentifierResolver> {
        &self.resolver
    }

    pub fn provider_id(&self) -> &'static str {
        self.provider.id()
    }

    /// Single-value lookups sharing this pipeline's provider, resolver and
    /// rate limiter.
    pub fn lookup(&self) -> MarketLookup {
        MarketLookup::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.resolver),
            Arc::clone(&self.limiter),
            self.config.clone(),
        )
    }

    /// Effective page size: the configured size capped by the provider.
    fn page_size(&self) -> u32 {
        self.config
            .page_size()
            .min(self.provider.rate_limit().max_page_size.max(1))
    }

    async fn fetch_page(
        &self,
        query: &MarketsQuery,
    ) -> Result<Vec<RawCoinMarket>, MarketDataError> {
        self.limiter.acquire(self.provider.id()).await;
        self.provider.coins_markets(query).await
    }

    /// Streams every ranked page in `currency`.
    ///
    /// Pages are requested strictly one after another with the configured
    /// delay in between, until the provider runs out of coins, the page
    /// ceiling is hit or a request fails. A failed request closes the stream
    /// after the pages already delivered; the error is kept in the
    /// [`FetchOutcome`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch_all(&self, currency: &str) -> PageStream {
        let currency = self.config.currency(currency);
        let (tx, rx) = mpsc::channel(1);
        let pipeline = self.clone();
        let task = tokio::spawn(async move { pipeline.produce(currency, tx).await });
        PageStream::new(rx, task)
    }

    async fn produce(self, currency: String, tx: mpsc::Sender<Vec<CoinRecord>>) -> FetchOutcome {
        let mut outcome = FetchOutcome::default();
        let page_size = self.page_size();

        for page in 1..=self.config.max_pages {
            if page > 1 {
                tokio::select! {
                    _ = tokio::time::sleep(self.config.page_delay) => {}
                    _ = tx.closed() => {
                        debug!("Page stream abandoned before page {}", page);
                        outcome.abandoned = true;
                        return outcome;
                    }
                }
            }

            let query = MarketsQuery::ranked(currency.as_str(), page_size, page);
            let raw = match self.fetch_page(&query).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(
                        "Page {} from {} failed, closing stream after {} page(s): {}",
                        page,
                        self.provider.id(),
                        outcome.pages,
                        e
                    );
                    outcome.error = Some(e);
                    return outcome;
                }
            };

            if raw.is_empty() {
                debug!("Page {} is empty, provider exhausted", page);
                return outcome;
            }

            let exhausted = (raw.len() as u32) < page_size;
            let records = normalize_page(&raw, &currency);
            debug!("Page {}: {} record(s) in {}", page, records.len(), currency);

            if tx.send(records).await.is_err() {
                debug!("Page stream abandoned while delivering page {}", page);
                outcome.abandoned = true;
                return outcome;
            }
            outcome.pages += 1;

            if exhausted {
                return outcome;
            }
        }

        info!(
            "Fetched {} page(s) in {}, page ceiling reached",
            outcome.pages, currency
        );
        outcome.ceiling_reached = true;
        outcome
    }

    /// One page filtered to the given identifiers, each resolved first.
    pub async fn fetch_one(
        &self,
        currency: &str,
        identifiers: &[String],
    ) -> Result<Vec<CoinRecord>, MarketDataError> {
        let currency = self.config.currency(currency);
        let table = self.resolver.snapshot();
        let ids: Vec<String> = identifiers.iter().map(|name| table.resolve(name)).collect();

        let query = MarketsQuery::ranked(currency.as_str(), self.page_size(), 1).with_ids(ids);
        let raw = self.fetch_page(&query).await?;
        Ok(normalize_page(&raw, &currency))
    }

    /// Records for several coins in one request.
    pub async fn fetch_batch(
        &self,
        names: &[String],
        currency: &str,
    ) -> Result<Vec<CoinRecord>, MarketDataError> {
        self.fetch_one(currency, names).await
    }

    /// The record for one coin, or `None` when the provider has nothing for it.
    pub async fn fetch_coin(
        &self,
        name: &str,
        currency: &str,
    ) -> Result<Option<CoinRecord>, MarketDataError> {
        let records = self.fetch_one(currency, &[name.to_string()]).await?;
        Ok(records.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CatalogEntry;
    use crate::provider::mock::{synthetic_coin, ScriptedProvider};
    use futures::StreamExt;
    use std::time::Duration;

    fn pipeline(provider: Arc<ScriptedProvider>, config: PipelineConfig) -> AcquisitionPipeline {
        AcquisitionPipeline::new(provider, Arc::new(IdentifierResolver::new()), config)
    }

    fn small_pages() -> PipelineConfig {
        PipelineConfig::default().with_page_size(5)
    }

    #[tokio::test(start_paused = true)]
    async fn test_ceiling_bounds_page_count() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(12, 5));
        let pipeline = pipeline(provider.clone(), small_pages().with_max_pages(3));

        let (pages, outcome) = pipeline.fetch_all("usd").collect_all().await;

        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.len() == 5));
        assert_eq!(outcome.pages, 3);
        assert!(outcome.ceiling_reached);
        assert!(outcome.is_complete());
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pages_separated_by_delay() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(4, 5));
        let delay = Duration::from_millis(1500);
        let pipeline = pipeline(
            provider.clone(),
            small_pages().with_max_pages(4).with_page_delay(delay),
        );

        let (pages, _) = pipeline.fetch_all("usd").collect_all().await;
        assert_eq!(pages.len(), 4);

        let calls = provider.calls();
        let pages_requested: Vec<u32> = calls.iter().map(|c| c.query.page).collect();
        assert_eq!(pages_requested, vec![1, 2, 3, 4]);
        for pair in calls.windows(2) {
            assert!(pair[1].at.duration_since(pair[0].at) >= delay);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_mid_stream_keeps_earlier_pages() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(5, 5));
        provider.fail_on_page(3);
        let pipeline = pipeline(provider.clone(), small_pages());

        let mut stream = pipeline.fetch_all("usd");
        let mut pages = Vec::new();
        while let Some(page) = stream.next().await {
            pages.push(page);
        }
        let outcome = stream.finish().await;

        assert_eq!(pages.len(), 2);
        let first: Vec<_> = (1..=5).map(synthetic_coin).collect();
        let expected = normalize_page(&first, "usd");
        assert_eq!(pages[0], expected);
        assert_eq!(pages[1][0].id, "asset-6");
        assert!(outcome.is_truncated());
        assert!(!outcome.ceiling_reached);
        assert_eq!(outcome.pages, 2);
        assert!(matches!(
            outcome.error,
            Some(MarketDataError::ProviderError { .. })
        ));
        // no request after the failed one
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_page_ends_stream() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(2, 5));
        let pipeline = pipeline(provider.clone(), small_pages());

        let (pages, outcome) = pipeline.fetch_all("usd").collect_all().await;

        assert_eq!(pages.len(), 2);
        assert!(outcome.is_complete());
        assert!(!outcome.ceiling_reached);
        assert_eq!(provider.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_page_is_last() {
        let pages = vec![
            (1..=5).map(synthetic_coin).collect(),
            (6..=7).map(synthetic_coin).collect(),
        ];
        let provider = Arc::new(ScriptedProvider::new().with_pages(pages));
        let pipeline = pipeline(provider.clone(), small_pages());

        let (pages, outcome) = pipeline.fetch_all("usd").collect_all().await;

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].len(), 2);
        assert_eq!(outcome.pages, 2);
        assert_eq!(provider.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abandoned_stream_stops_producer() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(10, 5));
        let pipeline = pipeline(provider.clone(), small_pages());

        let mut stream = pipeline.fetch_all("usd");
        assert!(stream.next_page().await.is_some());
        let outcome = stream.finish().await;

        assert!(outcome.abandoned);
        assert!(!outcome.is_complete());
        assert!(provider.calls().len() <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_stream_stops_requests() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(10, 5));
        let pipeline = pipeline(provider.clone(), small_pages());

        let mut stream = pipeline.fetch_all("usd");
        assert!(stream.next_page().await.is_some());
        drop(stream);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(provider.calls().len() <= 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_parameters_are_fixed() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(1, 5));
        let pipeline = pipeline(provider.clone(), small_pages());

        let _ = pipeline.fetch_all("EUR").collect_all().await;

        let query = &provider.calls()[0].query;
        assert_eq!(query.vs_currency, "eur");
        assert_eq!(query.order, "market_cap_desc");
        assert_eq!(query.per_page, 5);
        assert_eq!(query.page, 1);
        assert!(!query.sparkline);
        assert_eq!(query.price_change_param(), "1h,24h,7d,30d");
    }

    #[tokio::test(start_paused = true)]
    async fn test_targeted_fetch_resolves_identifiers() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(1, 5));
        let resolver = Arc::new(IdentifierResolver::new());
        resolver.publish_catalog(&[
            CatalogEntry::new("asset-1", "Asset 1", "a1"),
            CatalogEntry::new("asset-3", "Asset 3", "a3"),
        ]);
        let pipeline = AcquisitionPipeline::new(provider.clone(), resolver, small_pages());

        let coin = pipeline.fetch_coin("A1", "usd").await.unwrap();
        assert_eq!(coin.map(|c| c.id), Some("asset-1".to_string()));

        let names = vec!["asset 3".to_string(), "Asset 5".to_string()];
        let batch = pipeline.fetch_batch(&names, "usd").await.unwrap();
        assert_eq!(batch.len(), 2);

        let calls = provider.calls();
        assert_eq!(calls[0].query.ids, vec!["asset-1"]);
        // the second name misses the table and falls back to its slug
        assert_eq!(calls[1].query.ids, vec!["asset-3", "asset-5"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_coin_is_none() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(1, 5));
        let pipeline = pipeline(provider, small_pages());

        let coin = pipeline.fetch_coin("nothing here", "usd").await.unwrap();
        assert!(coin.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_currency_is_case_insensitive() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(1, 5));
        let pipeline = pipeline(provider.clone(), small_pages());
        let ids = vec!["asset-2".to_string()];

        let mixed = pipeline.fetch_one("Usd", &ids).await.unwrap();
        let lower = pipeline.fetch_one("usd", &ids).await.unwrap();
        let empty = pipeline.fetch_one("", &ids).await.unwrap();

        assert_eq!(mixed, lower);
        assert_eq!(empty, lower);
        assert!(provider.calls().iter().all(|c| c.query.vs_currency == "usd"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_targeted_fetch_error_is_returned() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(1, 5));
        provider.set_offline(true);
        let pipeline = pipeline(provider, small_pages());

        let result = pipeline.fetch_coin("asset-1", "usd").await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_pages_match_normalized_provider_pages() {
        let provider = Arc::new(ScriptedProvider::new().with_synthetic_pages(2, 5));
        let pipeline = pipeline(provider, small_pages());

        let pages: Vec<Vec<CoinRecord>> = pipeline.fetch_all("btc").collect().await;

        let raw: Vec<_> = (6..=10).map(synthetic_coin).collect();
        assert_eq!(pages[1], normalize_page(&raw, "btc"));
    }
}
