//! CoinGecko provider implementation.
//!
//! # API Endpoints
//!
//! - Connectivity: `GET /ping`
//! - Catalog: `GET /coins/list`
//! - Ranked pages: `GET /coins/markets` with `vs_currency`, `ids`, `order`,
//!   `per_page`, `page`, `sparkline` and `price_change_percentage`
//! - Simple price: `GET /simple/price?ids=&vs_currencies=`
//! - Global stats: `GET /global`
//! - Global market-cap chart: `GET /global/market_cap_chart?vs_currency=&days=`
//! - Price chart: `GET /coins/{id}/market_chart?vs_currency=&days=`

mod models;

use async_trait::async_trait;
use chrono::DateTime;
use log::debug;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::time::Duration;

use crate::errors::MarketDataError;
use crate::models::{
    CatalogEntry, MarketCapPoint, MarketsQuery, PricePoint, RawCoinMarket, RawGlobalMarket,
    SimplePrices,
};
use crate::provider::{CoinDataProvider, RateLimit};

use models::{
    CoinListItem, GlobalChartResponse, GlobalResponse, MarketChartResponse, SimplePriceResponse,
};

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com/api/v3";
const PROVIDER_ID: &str = "COINGECKO";

/// Largest page the markets endpoint serves.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Base of the public coin pages.
pub const COIN_PAGE_BASE_URL: &str = "https://www.coingecko.com/en/coins";

/// Default HTTP request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// Connection settings for [`CoinGeckoProvider`].
#[derive(Clone, Debug)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    /// Optional demo/pro key sent as a header
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: REQUEST_TIMEOUT,
        }
    }
}

/// CoinGecko provider for crypto market data.
///
/// # Example
///
/// ```ignore
/// let provider = CoinGeckoProvider::new(CoinGeckoConfig::default());
/// let catalog = provider.coins_list().await?;
/// ```
pub struct CoinGeckoProvider {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoProvider {
    pub fn new(config: CoinGeckoConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { client, config }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// GET `path` with `query` and return the body text.
    async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<String, MarketDataError> {
        let url = self.url(path);
        debug!("CoinGecko request: {} {:?}", url, query);

        let mut request = self.client.get(&url).query(query);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;

        // Check for rate limiting
        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MarketDataError::RateLimited {
                provider: PROVIDER_ID.to_string(),
            });
        }

        // Check for other HTTP errors
        if !response.status().is_success() {
            return Err(MarketDataError::ProviderError {
                provider: PROVIDER_ID.to_string(),
                message: format!("HTTP error: {}", response.status()),
            });
        }

        Ok(response.text().await?)
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MarketDataError> {
        let body = self.fetch(path, query).await?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, MarketDataError> {
    serde_json::from_str(body).map_err(|e| MarketDataError::Decode {
        provider: PROVIDER_ID.to_string(),
        message: e.to_string(),
    })
}

/// Wire parameters of a ranked page request.
fn markets_params(query: &MarketsQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![("vs_currency", query.vs_currency.clone())];
    if !query.ids.is_empty() {
        params.push(("ids", query.ids.join(",")));
    }
    params.push(("order", query.order.to_string()));
    params.push(("per_page", query.per_page.min(MAX_PAGE_SIZE).to_string()));
    params.push(("page", query.page.max(1).to_string()));
    params.push(("sparkline", query.sparkline.to_string()));
    params.push(("price_change_percentage", query.price_change_param()));
    params
}

fn chart_points(chart: MarketChartResponse) -> Vec<PricePoint> {
    chart
        .prices
        .into_iter()
        .filter_map(|[millis, price]| {
            DateTime::from_timestamp_millis(millis as i64)
                .map(|timestamp| PricePoint { timestamp, price })
        })
        .collect()
}

fn market_cap_points(chart: GlobalChartResponse) -> Vec<MarketCapPoint> {
    chart
        .market_cap_chart
        .market_cap
        .into_iter()
        .filter_map(|[millis, market_cap]| {
            DateTime::from_timestamp_millis(millis as i64)
                .map(|timestamp| MarketCapPoint { timestamp, market_cap })
        })
        .collect()
}

fn simple_prices(response: SimplePriceResponse) -> SimplePrices {
    response
        .into_iter()
        .map(|(id, prices)| {
            let prices: HashMap<String, f64> = prices
                .into_iter()
                .filter_map(|(currency, price)| price.map(|p| (currency, p)))
                .collect();
            (id, prices)
        })
        .collect()
}

#[async_trait]
impl CoinDataProvider for CoinGeckoProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn coin_url(&self, id: &str) -> String {
        format!("{}/{}", COIN_PAGE_BASE_URL, id)
    }

    fn rate_limit(&self) -> RateLimit {
        RateLimit {
            requests_per_minute: 30,
            burst: 10,
            max_page_size: MAX_PAGE_SIZE,
        }
    }

    async fn ping(&self) -> Result<(), MarketDataError> {
        self.fetch("ping", &[])
            .await
            .map(|_| ())
            .map_err(|e| MarketDataError::PingFailed {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            })
    }

    async fn coins_list(&self) -> Result<Vec<CatalogEntry>, MarketDataError> {
        let items: Vec<CoinListItem> = self.fetch_json("coins/list", &[]).await?;
        Ok(items
            .into_iter()
            .map(|item| CatalogEntry::new(item.id, item.name, item.symbol))
            .collect())
    }

    async fn coins_markets(
        &self,
        query: &MarketsQuery,
    ) -> Result<Vec<RawCoinMarket>, MarketDataError> {
        self.fetch_json("coins/markets", &markets_params(query)).await
    }

    async fn simple_price(
        &self,
        ids: &[String],
        currencies: &[String],
    ) -> Result<SimplePrices, MarketDataError> {
        let query = [("ids", ids.join(",")), ("vs_currencies", currencies.join(","))];
        let response: SimplePriceResponse = self.fetch_json("simple/price", &query).await?;
        Ok(simple_prices(response))
    }

    async fn global(&self) -> Result<RawGlobalMarket, MarketDataError> {
        let response: GlobalResponse = self.fetch_json("global", &[]).await?;
        Ok(response.data)
    }

    async fn global_chart(
        &self,
        currency: &str,
        days: u32,
    ) -> Result<Vec<MarketCapPoint>, MarketDataError> {
        let query = [("vs_currency", currency.to_string()), ("days", days.to_string())];
        let chart: GlobalChartResponse = self.fetch_json("global/market_cap_chart", &query).await?;
        Ok(market_cap_points(chart))
    }

    async fn market_chart(
        &self,
        id: &str,
        currency: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, MarketDataError> {
        let path = format!("coins/{}/market_chart", id);
        let query = [("vs_currency", currency.to_string()), ("days", days.to_string())];
        let chart: MarketChartResponse = self.fetch_json(&path, &query).await?;
        Ok(chart_points(chart))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_id() {
        let provider = CoinGeckoProvider::new(CoinGeckoConfig::default());
        assert_eq!(provider.id(), "COINGECKO");
        assert_eq!(
            provider.coin_url("bitcoin"),
            "https://www.coingecko.com/en/coins/bitcoin"
        );
    }

    #[test]
    fn test_url_joins_base() {
        let provider = CoinGeckoProvider::new(CoinGeckoConfig {
            base_url: "http://localhost:9000/api/v3/".to_string(),
            ..CoinGeckoConfig::default()
        });
        assert_eq!(provider.url("coins/list"), "http://localhost:9000/api/v3/coins/list");
    }

    #[test]
    fn test_markets_params() {
        let query = MarketsQuery::ranked("usd", 500, 0)
            .with_ids(vec!["bitcoin".to_string(), "ethereum".to_string()]);
        let params = markets_params(&query);

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("vs_currency"), Some("usd"));
        assert_eq!(get("ids"), Some("bitcoin,ethereum"));
        assert_eq!(get("order"), Some("market_cap_desc"));
        assert_eq!(get("per_page"), Some("250"));
        assert_eq!(get("page"), Some("1"));
        assert_eq!(get("sparkline"), Some("false"));
        assert_eq!(get("price_change_percentage"), Some("1h,24h,7d,30d"));
    }

    #[test]
    fn test_markets_params_without_ids() {
        let params = markets_params(&MarketsQuery::ranked("eur", 250, 2));
        assert!(params.iter().all(|(k, _)| *k != "ids"));
    }

    #[test]
    fn test_decode_markets_page_with_nulls() {
        let body = r#"[
            {
                "id": "bitcoin", "symbol": "btc", "name": "Bitcoin",
                "current_price": 64000.5, "market_cap": 1260000000000, "market_cap_rank": 1,
                "total_volume": 30000000000, "circulating_supply": 19600000,
                "total_supply": 21000000, "last_updated": "2024-03-01T12:30:00.000Z",
                "price_change_percentage_1h_in_currency": 0.1,
                "price_change_percentage_24h_in_currency": 2.5,
                "price_change_percentage_7d_in_currency": null,
                "image": "https://example.invalid/btc.png"
            },
            {
                "id": "fresh-token", "symbol": "frsh", "name": "Fresh Token",
                "current_price": null, "market_cap": null, "market_cap_rank": null,
                "total_volume": null, "circulating_supply": 0, "total_supply": null,
                "last_updated": null
            }
        ]"#;
        let page: Vec<RawCoinMarket> = decode(body).unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].market_cap_rank, Some(1));
        assert_eq!(page[0].price_change_percentage_7d_in_currency, None);
        assert_eq!(page[0].price_change_percentage_30d_in_currency, None);
        assert_eq!(page[1].current_price, None);
        assert_eq!(page[1].market_cap_rank, None);
    }

    #[test]
    fn test_decode_error_is_reported() {
        let result: Result<Vec<RawCoinMarket>, _> = decode("<html>busy</html>");
        assert!(matches!(result, Err(MarketDataError::Decode { .. })));
    }

    #[test]
    fn test_decode_global() {
        let body = r#"{"data": {
            "active_cryptocurrencies": 13000, "markets": 1000,
            "total_market_cap": {"usd": 2500000000000.0, "eur": 2300000000000.0},
            "total_volume": {"usd": 90000000000.0},
            "market_cap_percentage": {"btc": 51.2, "eth": 16.8}
        }}"#;
        let response: GlobalResponse = decode(body).unwrap();
        assert_eq!(response.data.active_cryptocurrencies, Some(13000));
        assert_eq!(response.data.market_cap_percentage.get("btc"), Some(&51.2));
    }

    #[test]
    fn test_simple_prices_drop_nulls() {
        let body = r#"{"bitcoin": {"usd": 64000.0, "eur": null}}"#;
        let response: SimplePriceResponse = decode(body).unwrap();
        let prices = simple_prices(response);
        assert_eq!(prices["bitcoin"].get("usd"), Some(&64000.0));
        assert!(prices["bitcoin"].get("eur").is_none());
    }

    #[test]
    fn test_chart_points() {
        let body = r#"{
            "prices": [[1709294400000, 61000.0], [1709380800000, 62000.5]],
            "market_caps": []
        }"#;
        let chart: MarketChartResponse = decode(body).unwrap();
        let points = chart_points(chart);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp.timestamp(), 1_709_294_400);
        assert_eq!(points[1].price, 62000.5);
    }

    #[test]
    fn test_market_cap_points() {
        let body = r#"{"market_cap_chart": {
            "market_cap": [[1709294400000, 2.4e12], [1709380800000, 2.5e12]],
            "volume": [[1709294400000, 9.0e10]]
        }}"#;
        let chart: GlobalChartResponse = decode(body).unwrap();
        let points = market_cap_points(chart);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp.timestamp(), 1_709_294_400);
        assert_eq!(points[1].market_cap, 2.5e12);
    }
}
