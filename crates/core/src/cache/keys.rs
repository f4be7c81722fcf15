/// Durable key of the provider catalog snapshot.
pub const CATALOG_DATASET: &str = "coinslist";

/// Durable key of the last record set.
pub const RECORDS_DATASET: &str = "allcoinsslugmap";

/// Key of the global market statistics.
pub const MARKET_DATASET: &str = "market";

/// Key prefix of the global market-cap chart, followed by currency and days.
pub const GLOBAL_CHART_DATASET: &str = "globaldata";

/// Cache key for `name` under `provider`: lower-cased `<provider>_<name>`.
pub fn cache_key(provider: &str, name: &str) -> String {
    format!("{}_{}", provider, name).to_lowercase()
}
