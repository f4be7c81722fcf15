use std::time::Duration;

use tokio::time::Instant;

/// Expiry policy of a cache entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expiration {
    Never,
    After(Duration),
}

impl Expiration {
    /// Instant at which an entry created at `created_at` expires.
    pub fn deadline(self, created_at: Instant) -> Option<Instant> {
        match self {
            Expiration::Never => None,
            Expiration::After(ttl) => Some(created_at + ttl),
        }
    }
}

impl From<Duration> for Expiration {
    fn from(ttl: Duration) -> Self {
        Expiration::After(ttl)
    }
}

/// A cached value with its creation time and expiry policy.
#[derive(Clone, Debug)]
pub struct CacheEntry<T> {
    value: T,
    created_at: Instant,
    expires_at: Option<Instant>,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T, expiration: Expiration) -> Self {
        let created_at = Instant::now();
        Self {
            value,
            created_at,
            expires_at: expiration.deadline(created_at),
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}
