use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rank assigned to coins the provider reports as unranked.
///
/// No real market-cap rank reaches it, so such coins sort last.
pub const UNRANKED_SENTINEL: u32 = u32::MAX;

/// One ranked market record exactly as the provider returned it.
///
/// Every numeric field is optional; the formatter decides what a missing
/// value means.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCoinMarket {
    pub id: String,
    #[serde(default)]
    pub symbol: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub market_cap: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
    #[serde(default)]
    pub total_volume: Option<f64>,
    #[serde(default)]
    pub circulating_supply: Option<f64>,
    #[serde(default)]
    pub total_supply: Option<f64>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub price_change_percentage_1h_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_7d_in_currency: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_30d_in_currency: Option<f64>,
}

/// Canonical, display-ready market record.
///
/// A record is identified by `id` and `currency` only. A newer fetch for the
/// same coin replaces the record as a whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CoinRecord {
    pub id: String,
    pub name: String,
    /// Upper-cased ticker
    pub symbol: String,
    /// Market-cap rank, [`UNRANKED_SENTINEL`] when the provider has none
    pub rank: u32,
    /// Lower-cased currency the monetary fields are expressed in
    pub currency: String,
    pub price: Decimal,
    pub circulating_supply: f64,
    /// Falls back to the circulating supply when the provider omits it
    pub total_supply: f64,
    pub market_cap: Decimal,
    pub volume_24h: Decimal,
    pub percent_change_1h: f64,
    pub percent_change_24h: f64,
    pub percent_change_7d: f64,
    pub percent_change_30d: f64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl CoinRecord {
    pub fn is_ranked(&self) -> bool {
        self.rank < UNRANKED_SENTINEL
    }
}

/// Sort records by ascending rank, unranked coins last, ties by ID.
pub fn sort_by_rank(records: &mut [CoinRecord]) {
    records.sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
}
