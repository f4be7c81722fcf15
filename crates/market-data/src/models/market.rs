use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Raw global market statistics, keyed by lower-cased currency code.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGlobalMarket {
    #[serde(default)]
    pub active_cryptocurrencies: Option<u64>,
    #[serde(default)]
    pub markets: Option<u64>,
    #[serde(default)]
    pub total_market_cap: HashMap<String, f64>,
    #[serde(default)]
    pub total_volume: HashMap<String, f64>,
    #[serde(default)]
    pub market_cap_percentage: HashMap<String, f64>,
}

/// Normalized global market statistics for one currency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GlobalMarketData {
    pub currency: String,
    pub total_market_cap: Decimal,
    pub total_volume_24h: Decimal,
    pub bitcoin_dominance: f64,
    pub active_currencies: u64,
    pub active_markets: u64,
}

/// One point of a price chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// One point of the global market-cap chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketCapPoint {
    pub timestamp: DateTime<Utc>,
    pub market_cap: f64,
}

/// Mapping from coin ID to currency code to price, as the simple price
/// endpoint returns it.
pub type SimplePrices = HashMap<String, HashMap<String, f64>>;
