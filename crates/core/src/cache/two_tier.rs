use std::sync::Arc;

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::JoinHandle;

use super::durable::DurableCache;
use super::entry::Expiration;
use super::maintenance;
use super::volatile::VolatileCache;
use crate::config::CacheConfig;
use crate::errors::CacheError;

/// Volatile tier in front of an optional durable tier.
///
/// Reads try the volatile tier first; a live volatile entry always wins
/// over the durable one for the same key. Durable read failures are logged
/// and treated as misses.
pub struct TwoTierCache {
    volatile: Arc<VolatileCache>,
    durable: Option<DurableCache>,
    config: CacheConfig,
}

impl TwoTierCache {
    /// Builds both tiers from `config`.
    ///
    /// When the cache directory cannot be created the durable tier is
    /// skipped and the cache runs memory-only.
    pub fn open(config: CacheConfig) -> Self {
        let durable = if config.enabled {
            match DurableCache::open(&config.cache_dir) {
                Ok(durable) => Some(durable),
                Err(e) => {
                    warn!(
                        "Cache dir {} unusable, proceeding without durable cache: {}",
                        config.cache_dir.display(),
                        e
                    );
                    None
                }
            }
        } else {
            None
        };

        Self {
            volatile: Arc::new(VolatileCache::new(config.volatile_ttl)),
            durable,
            config,
        }
    }

    /// Memory-only cache.
    pub fn volatile_only(config: CacheConfig) -> Self {
        Self::open(config.no_cache())
    }

    pub fn volatile(&self) -> &Arc<VolatileCache> {
        &self.volatile
    }

    pub fn durable(&self) -> Option<&DurableCache> {
        self.durable.as_ref()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Volatile value if live, otherwise the durable value.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + DeserializeOwned + 'static,
    {
        if let Some(value) = self.volatile.get::<T>(key) {
            debug!("Cache hit (volatile) for '{}'", key);
            return Some(value);
        }
        self.get_durable(key)
    }

    pub fn get_volatile<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        self.volatile.get::<T>(key)
    }

    pub fn get_durable<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let durable = self.durable.as_ref()?;
        match durable.get::<T>(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring unreadable durable cache entry '{}': {}", key, e);
                None
            }
        }
    }

    pub fn set_volatile<T>(&self, key: &str, value: T, expiration: Expiration)
    where
        T: Send + Sync + 'static,
    {
        self.volatile.set(key, value, expiration);
    }

    /// Writes `value` to the durable tier without expiry. A no-op when the
    /// durable tier is disabled.
    pub fn set_durable<T: Serialize>(&self, key: &str, value: &T) -> Result<(), CacheError> {
        match &self.durable {
            Some(durable) => durable.set(key, value, None),
            None => Ok(()),
        }
    }

    /// Writes both tiers: volatile with `expiration`, durable without.
    ///
    /// The volatile write happens even when the durable write fails.
    pub fn set<T>(&self, key: &str, value: T, expiration: Expiration) -> Result<(), CacheError>
    where
        T: Serialize + Send + Sync + 'static,
    {
        let durable = self.set_durable(key, &value);
        self.volatile.set(key, value, expiration);
        durable
    }

    /// Starts the volatile tier's janitor with the configured interval.
    pub fn spawn_janitor(&self) -> JoinHandle<()> {
        self.volatile.spawn_janitor(self.config.cleanup_interval)
    }

    /// Removes all durable cache files.
    pub fn clean(&self) -> Result<usize, CacheError> {
        maintenance::clean(&self.config.cache_dir)
    }

    /// Clears the volatile tier and removes all durable cache files.
    pub fn reset(&self) -> Result<usize, CacheError> {
        let dropped = self.volatile.clear();
        let removed = self.clean()?;
        info!(
            "Cache reset: {} volatile entries dropped, {} file(s) removed",
            dropped, removed
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    fn cache(dir: &TempDir) -> TwoTierCache {
        TwoTierCache::open(CacheConfig::default().with_cache_dir(dir.path()))
    }

    #[tokio::test(start_paused = true)]
    async fn test_volatile_shadows_durable_until_expiry() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        cache.set_durable("coingecko_market", &"durable".to_string()).unwrap();
        assert_eq!(cache.get::<String>("coingecko_market").as_deref(), Some("durable"));

        cache.set_volatile(
            "coingecko_market",
            "volatile".to_string(),
            Expiration::After(Duration::from_secs(10)),
        );
        assert_eq!(cache.get::<String>("coingecko_market").as_deref(), Some("volatile"));

        tokio::time::advance(Duration::from_secs(11)).await;
        assert_eq!(cache.get::<String>("coingecko_market").as_deref(), Some("durable"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_writes_both_tiers() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        cache
            .set("key", vec![1u32, 2], Expiration::After(Duration::from_secs(1)))
            .unwrap();

        assert_eq!(cache.get_volatile::<Vec<u32>>("key"), Some(vec![1, 2]));
        assert_eq!(cache.get_durable::<Vec<u32>>("key"), Some(vec![1, 2]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_corrupt_durable_entry_is_miss() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        std::fs::write(dir.path().join("fcache.key.json"), "garbage").unwrap();

        assert_eq!(cache.get::<u32>("key"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_durable_tier() {
        let dir = TempDir::new().unwrap();
        let cache = TwoTierCache::volatile_only(CacheConfig::default().with_cache_dir(dir.path()));
        assert!(cache.durable().is_none());

        cache.set("key", 5u32, Expiration::Never).unwrap();
        assert_eq!(cache.get::<u32>("key"), Some(5));
        assert!(!dir.path().join("fcache.key.json").exists());
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_both_tiers() {
        let dir = TempDir::new().unwrap();
        let cache = cache(&dir);
        cache.set("a", 1u32, Expiration::Never).unwrap();
        cache.set("b", 2u32, Expiration::Never).unwrap();

        assert_eq!(cache.reset().unwrap(), 2);
        assert_eq!(cache.get::<u32>("a"), None);
        assert!(cache.volatile().is_empty());
    }
}
