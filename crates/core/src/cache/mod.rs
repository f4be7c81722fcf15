//! Two-tier cache: a short-lived in-memory tier in front of a durable
//! on-disk tier.
//!
//! - [`VolatileCache`]: concurrent TTL map, lost on restart
//! - [`DurableCache`]: one JSON file per key (`fcache.<key>.json`)
//! - [`TwoTierCache`]: reads volatile first, writes both
//! - [`clean`]: operator cleanup of durable files

mod durable;
mod entry;
mod keys;
mod maintenance;
mod two_tier;
mod volatile;

pub use durable::{file_name, DurableCache, FILE_PREFIX};
pub use entry::{CacheEntry, Expiration};
pub use keys::{
    cache_key, CATALOG_DATASET, GLOBAL_CHART_DATASET, MARKET_DATASET, RECORDS_DATASET,
};
pub use maintenance::clean;
pub use two_tier::TwoTierCache;
pub use volatile::VolatileCache;
