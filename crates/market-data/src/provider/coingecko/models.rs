//! CoinGecko API response models.
//!
//! Only the fields the normalizer reads are modelled; everything else in
//! the payload is ignored.

use serde::Deserialize;
use std::collections::HashMap;

use crate::models::RawGlobalMarket;

/// Entry of `/coins/list`
#[derive(Debug, Deserialize)]
pub struct CoinListItem {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
}

/// Envelope of `/global`
#[derive(Debug, Deserialize)]
pub struct GlobalResponse {
    pub data: RawGlobalMarket,
}

/// Body of `/coins/{id}/market_chart`; each point is `[unix_ms, value]`.
#[derive(Debug, Deserialize)]
pub struct MarketChartResponse {
    #[serde(default)]
    pub prices: Vec<[f64; 2]>,
}

/// Body of `/global/market_cap_chart`
#[derive(Debug, Deserialize)]
pub struct GlobalChartResponse {
    pub market_cap_chart: GlobalChartSeries,
}

#[derive(Debug, Deserialize)]
pub struct GlobalChartSeries {
    #[serde(default)]
    pub market_cap: Vec<[f64; 2]>,
}

/// Body of `/simple/price`
pub type SimplePriceResponse = HashMap<String, HashMap<String, Option<f64>>>;
