//! In-memory cache tier, lost on restart.
//!
//! Values of any `'static` type live side by side behind type-erased
//! handles and are downcast on read. A read with the wrong type is a miss.

use std::any::Any;
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use log::debug;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::entry::{CacheEntry, Expiration};

type ErasedValue = Arc<dyn Any + Send + Sync>;

/// Concurrent TTL map keyed by opaque strings.
pub struct VolatileCache {
    entries: DashMap<String, CacheEntry<ErasedValue>>,
    default_ttl: Duration,
}

impl VolatileCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Live value for `key`, if present and of type `T`.
    pub fn get<T>(&self, key: &str) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = Instant::now();
        let value = {
            let entry = self.entries.get(key)?;
            if entry.is_expired_at(now) {
                None
            } else {
                Some(Arc::clone(entry.value().value()))
            }
        };

        match value {
            Some(value) => {
                let hit = value.downcast_ref::<T>().cloned();
                if hit.is_none() {
                    debug!("Volatile cache type mismatch for '{}'", key);
                }
                hit
            }
            None => {
                self.entries.remove_if(key, |_, entry| entry.is_expired_at(now));
                debug!("Volatile cache entry '{}' expired", key);
                None
            }
        }
    }

    pub fn set<T>(&self, key: &str, value: T, expiration: Expiration)
    where
        T: Send + Sync + 'static,
    {
        let value: ErasedValue = Arc::new(value);
        self.entries
            .insert(key.to_string(), CacheEntry::new(value, expiration));
    }

    /// Stores `value` with the default TTL.
    pub fn set_default<T>(&self, key: &str, value: T)
    where
        T: Send + Sync + 'static,
    {
        self.set(key, value, Expiration::After(self.default_ttl));
    }

    pub fn remove(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired())
    }

    /// Drops every entry and returns how many there were.
    pub fn clear(&self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes expired entries and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before.saturating_sub(self.entries.len())
    }

    /// Purges expired entries every `interval` until the cache is dropped.
    pub fn spawn_janitor(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // first tick completes immediately
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(cache) = cache.upgrade() else {
                    break;
                };
                let purged = cache.purge_expired();
                if purged > 0 {
                    debug!("Volatile cache janitor purged {} entries", purged);
                }
            }
        })
    }
}

impl Default for VolatileCache {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_VOLATILE_TTL)
    }
}
