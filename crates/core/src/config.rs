use std::path::PathBuf;
use std::time::Duration;

use cointrack_market_data::PipelineConfig;

/// Directory name under the platform cache directory.
pub const CACHE_DIR_NAME: &str = "cointrack";

/// Default lifetime of volatile entries.
pub const DEFAULT_VOLATILE_TTL: Duration = Duration::from_secs(60);

/// Default period of the volatile tier janitor.
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(120);

/// `<platform cache dir>/cointrack`, or under the temp dir when the
/// platform has no cache dir.
pub fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(CACHE_DIR_NAME)
}

/// Settings of the two cache tiers.
#[derive(Clone, Debug)]
pub struct CacheConfig {
    /// Directory holding durable entries
    pub cache_dir: PathBuf,
    /// When false the durable tier is not used at all
    pub enabled: bool,
    pub volatile_ttl: Duration,
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: default_cache_dir(),
            enabled: true,
            volatile_ttl: DEFAULT_VOLATILE_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl CacheConfig {
    pub fn with_cache_dir(mut self, cache_dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = cache_dir.into();
        self
    }

    /// Disables the durable tier.
    pub fn no_cache(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Everything the market data service needs besides its provider.
#[derive(Clone, Debug, Default)]
pub struct ServiceConfig {
    pub pipeline: PipelineConfig,
    pub cache: CacheConfig,
}
