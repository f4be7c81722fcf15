//! Normalization of raw provider fields into canonical values.
//!
//! Every "missing data" decision lives here: an absent percent change is
//! zero, an absent or zero rank is [`UNRANKED_SENTINEL`], an absent total
//! supply is the circulating supply. Nothing in this module fails or does
//! I/O.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::models::{
    CoinRecord, GlobalMarketData, RawCoinMarket, RawGlobalMarket, UNRANKED_SENTINEL,
};

/// Currency used when the caller does not name one.
pub const DEFAULT_CURRENCY: &str = "usd";

/// Quote currencies that are themselves crypto assets and need more decimals.
const CRYPTO_QUOTE_CURRENCIES: &[&str] = &["btc", "eth", "bnb", "eos"];

const FIAT_DECIMALS: u32 = 2;
const CRYPTO_DECIMALS: u32 = 8;

/// Lower-cases and trims a currency code; empty input becomes [`DEFAULT_CURRENCY`].
pub fn normalize_currency(currency: &str) -> String {
    let currency = currency.trim().to_lowercase();
    if currency.is_empty() {
        DEFAULT_CURRENCY.to_string()
    } else {
        currency
    }
}

fn is_crypto_quote(currency: &str) -> bool {
    CRYPTO_QUOTE_CURRENCIES.contains(&currency)
}

fn to_decimal(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

/// Rank pass-through; `0` or missing means unranked.
pub fn format_rank(raw: Option<u32>) -> u32 {
    match raw {
        Some(rank) if rank > 0 => rank,
        _ => UNRANKED_SENTINEL,
    }
}

pub fn format_supply(raw: Option<f64>) -> f64 {
    raw.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Total supply, substituting the circulating supply when absent or zero.
pub fn format_total_supply(total: Option<f64>, circulating: Option<f64>) -> f64 {
    let total = format_supply(total);
    if total == 0.0 {
        format_supply(circulating)
    } else {
        total
    }
}

/// Price rounded for display: 8 decimals for crypto quote currencies and
/// sub-unit prices, 2 otherwise.
pub fn format_price(raw: Option<f64>, currency: &str) -> Decimal {
    let price = raw.filter(|v| v.is_finite()).unwrap_or(0.0);
    let currency = normalize_currency(currency);
    let decimals = if is_crypto_quote(&currency) || price.abs() < 1.0 {
        CRYPTO_DECIMALS
    } else {
        FIAT_DECIMALS
    };
    to_decimal(price).round_dp(decimals)
}

/// Aggregate amounts (market cap, volume) in the requested currency.
pub fn format_amount(raw: Option<f64>, currency: &str) -> Decimal {
    let amount = raw.filter(|v| v.is_finite()).unwrap_or(0.0);
    let decimals = if is_crypto_quote(&normalize_currency(currency)) {
        CRYPTO_DECIMALS
    } else {
        FIAT_DECIMALS
    };
    to_decimal(amount).round_dp(decimals)
}

pub fn format_market_cap(raw: Option<f64>, currency: &str) -> Decimal {
    format_amount(raw, currency)
}

pub fn format_volume(raw: Option<f64>, currency: &str) -> Decimal {
    format_amount(raw, currency)
}

/// Percent change pass-through; an absent window is `0`.
pub fn format_percent_change(raw: Option<f64>) -> f64 {
    raw.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Parses the provider's RFC 3339 timestamp; unparseable or absent is `None`.
pub fn format_last_updated(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn format_symbol(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn format_name(raw: &str) -> String {
    raw.trim().to_string()
}

/// Converts one raw ranked record into a [`CoinRecord`] for `currency`.
pub fn normalize_coin(raw: &RawCoinMarket, currency: &str) -> CoinRecord {
    let currency = normalize_currency(currency);
    CoinRecord {
        id: raw.id.trim().to_string(),
        name: format_name(&raw.name),
        symbol: format_symbol(&raw.symbol),
        rank: format_rank(raw.market_cap_rank),
        price: format_price(raw.current_price, &currency),
        circulating_supply: format_supply(raw.circulating_supply),
        total_supply: format_total_supply(raw.total_supply, raw.circulating_supply),
        market_cap: format_market_cap(raw.market_cap, &currency),
        volume_24h: format_volume(raw.total_volume, &currency),
        percent_change_1h: format_percent_change(raw.price_change_percentage_1h_in_currency),
        percent_change_24h: format_percent_change(raw.price_change_percentage_24h_in_currency),
        percent_change_7d: format_percent_change(raw.price_change_percentage_7d_in_currency),
        percent_change_30d: format_percent_change(raw.price_change_percentage_30d_in_currency),
        last_updated: format_last_updated(raw.last_updated.as_deref()),
        currency,
    }
}

/// Normalizes a whole provider page, preserving provider order.
pub fn normalize_page(raw: &[RawCoinMarket], currency: &str) -> Vec<CoinRecord> {
    raw.iter().map(|coin| normalize_coin(coin, currency)).collect()
}

/// Picks the figures for `currency` out of the raw global statistics.
pub fn normalize_global(raw: &RawGlobalMarket, currency: &str) -> GlobalMarketData {
    let currency = normalize_currency(currency);
    GlobalMarketData {
        total_market_cap: format_amount(raw.total_market_cap.get(&currency).copied(), &currency),
        total_volume_24h: format_amount(raw.total_volume.get(&currency).copied(), &currency),
        bitcoin_dominance: format_percent_change(raw.market_cap_percentage.get("btc").copied()),
        active_currencies: raw.active_cryptocurrencies.unwrap_or(0),
        active_markets: raw.markets.unwrap_or(0),
        currency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sort_by_rank;
    use rust_decimal_macros::dec;

    fn raw_coin(id: &str, rank: Option<u32>) -> RawCoinMarket {
        RawCoinMarket {
            id: id.to_string(),
            symbol: id[..3].to_string(),
            name: id.to_string(),
            current_price: Some(42_000.123),
            market_cap: Some(800_000_000_000.0),
            market_cap_rank: rank,
            total_volume: Some(12_345_678.9),
            circulating_supply: Some(19_000_000.0),
            total_supply: Some(21_000_000.0),
            last_updated: Some("2024-03-01T12:30:00.000Z".to_string()),
            price_change_percentage_1h_in_currency: Some(0.25),
            price_change_percentage_24h_in_currency: Some(-1.5),
            price_change_percentage_7d_in_currency: Some(4.0),
            price_change_percentage_30d_in_currency: Some(12.75),
        }
    }

    #[test]
    fn test_zero_rank_maps_to_sentinel() {
        assert_eq!(format_rank(Some(0)), UNRANKED_SENTINEL);
        assert_eq!(format_rank(None), UNRANKED_SENTINEL);
        assert_eq!(format_rank(Some(7)), 7);
    }

    #[test]
    fn test_unranked_sorts_last() {
        let mut records = vec![
            normalize_coin(&raw_coin("newcoin", Some(0)), "usd"),
            normalize_coin(&raw_coin("ethereum", Some(2)), "usd"),
            normalize_coin(&raw_coin("bitcoin", Some(1)), "usd"),
            normalize_coin(&raw_coin("tailcoin", Some(9_999)), "usd"),
        ];
        sort_by_rank(&mut records);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["bitcoin", "ethereum", "tailcoin", "newcoin"]);
        assert!(!records[3].is_ranked());
    }

    #[test]
    fn test_deep_ranks_stay_ahead_of_unranked() {
        let mut records = vec![
            normalize_coin(&raw_coin("unranked", None), "usd"),
            normalize_coin(&raw_coin("long-tail", Some(12_000)), "usd"),
            normalize_coin(&raw_coin("deeper-tail", Some(250_000)), "usd"),
        ];
        sort_by_rank(&mut records);
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["long-tail", "deeper-tail", "unranked"]);
        assert_eq!(records[0].rank, 12_000);
        assert!(records[0].is_ranked());
        assert!(records[1].is_ranked());
        assert!(!records[2].is_ranked());
    }

    #[test]
    fn test_total_supply_falls_back_to_circulating() {
        assert_eq!(format_total_supply(Some(0.0), Some(1000.0)), 1000.0);
        assert_eq!(format_total_supply(None, Some(1000.0)), 1000.0);
        assert_eq!(format_total_supply(Some(2000.0), Some(1000.0)), 2000.0);
        assert_eq!(format_total_supply(None, None), 0.0);
    }

    #[test]
    fn test_missing_percent_change_is_zero() {
        let mut raw = raw_coin("bitcoin", Some(1));
        raw.price_change_percentage_7d_in_currency = None;
        let record = normalize_coin(&raw, "usd");
        assert_eq!(record.percent_change_7d, 0.0);
        assert_eq!(record.percent_change_24h, -1.5);
    }

    #[test]
    fn test_price_rounding_by_currency() {
        assert_eq!(format_price(Some(42_000.126), "usd"), dec!(42000.13));
        assert_eq!(format_price(Some(0.123456789), "usd"), dec!(0.12345679));
        assert_eq!(format_price(Some(15.123456789), "BTC"), dec!(15.12345679));
        assert_eq!(format_price(None, "usd"), Decimal::ZERO);
        assert_eq!(format_price(Some(f64::NAN), "usd"), Decimal::ZERO);
    }

    #[test]
    fn test_currency_case_insensitive() {
        let raw = raw_coin("bitcoin", Some(1));
        assert_eq!(normalize_coin(&raw, "Usd"), normalize_coin(&raw, "usd"));
        assert_eq!(normalize_coin(&raw, " USD "), normalize_coin(&raw, "usd"));
    }

    #[test]
    fn test_empty_currency_defaults() {
        assert_eq!(normalize_currency(""), "usd");
        assert_eq!(normalize_currency("  "), "usd");
        assert_eq!(normalize_currency("EUR"), "eur");
    }

    #[test]
    fn test_last_updated_parsing() {
        let parsed = format_last_updated(Some("2024-03-01T12:30:00.000Z")).unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T12:30:00+00:00");
        assert!(format_last_updated(Some("yesterday")).is_none());
        assert!(format_last_updated(None).is_none());
    }

    #[test]
    fn test_normalize_coin_fields() {
        let record = normalize_coin(&raw_coin("bitcoin", Some(1)), "usd");
        assert_eq!(record.symbol, "BIT");
        assert_eq!(record.currency, "usd");
        assert_eq!(record.price, dec!(42000.12));
        assert_eq!(record.volume_24h, dec!(12345678.90));
        assert_eq!(record.total_supply, 21_000_000.0);
        assert_eq!(record.percent_change_30d, 12.75);
    }

    #[test]
    fn test_normalize_page_preserves_order() {
        let page = vec![raw_coin("bitcoin", Some(1)), raw_coin("ethereum", Some(2))];
        let records = normalize_page(&page, "usd");
        assert_eq!(records[0].id, "bitcoin");
        assert_eq!(records[1].id, "ethereum");
    }

    #[test]
    fn test_normalize_global_picks_currency() {
        let mut raw = RawGlobalMarket::default();
        raw.total_market_cap.insert("eur".to_string(), 2_000_000.5);
        raw.total_volume.insert("eur".to_string(), 50_000.0);
        raw.market_cap_percentage.insert("btc".to_string(), 52.3);
        raw.active_cryptocurrencies = Some(12_000);
        raw.markets = Some(900);

        let global = normalize_global(&raw, "EUR");
        assert_eq!(global.currency, "eur");
        assert_eq!(global.total_market_cap, dec!(2000000.50));
        assert_eq!(global.bitcoin_dominance, 52.3);
        assert_eq!(global.active_markets, 900);

        let missing = normalize_global(&raw, "jpy");
        assert_eq!(missing.total_market_cap, Decimal::ZERO);
    }
}
