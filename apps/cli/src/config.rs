use std::path::PathBuf;
use std::time::Duration;

use anyhow::bail;
use cointrack_core::config::default_cache_dir;
use cointrack_core::{CacheConfig, ServiceConfig};
use cointrack_market_data::provider::coingecko::DEFAULT_BASE_URL;
use cointrack_market_data::{currencies, CoinGeckoConfig, PipelineConfig};

use crate::args::Cli;

pub struct AppConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub cache_dir: PathBuf,
    pub no_cache: bool,
    pub currency: String,
    pub max_pages: u32,
    pub page_delay: Duration,
    pub request_timeout: Duration,
    pub log_format: String,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

impl AppConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let api_url = env_or("COINTRACK_API_URL", DEFAULT_BASE_URL);
        let api_key = std::env::var("COINTRACK_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty());
        let cache_dir = std::env::var("COINTRACK_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_cache_dir());
        let max_pages: u32 = env_or("COINTRACK_MAX_PAGES", "10").parse().unwrap_or(10);
        let page_delay_ms: u64 = env_or("COINTRACK_PAGE_DELAY_MS", "1000")
            .parse()
            .unwrap_or(1000);
        let timeout_ms: u64 = env_or("COINTRACK_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .unwrap_or(30000);
        Self {
            api_url,
            api_key,
            cache_dir,
            no_cache: env_flag("COINTRACK_NO_CACHE"),
            currency: env_or("COINTRACK_CURRENCY", "usd"),
            max_pages,
            page_delay: Duration::from_millis(page_delay_ms),
            request_timeout: Duration::from_millis(timeout_ms),
            log_format: env_or("COINTRACK_LOG_FORMAT", "text"),
        }
    }

    /// Command line flags win over the environment.
    pub fn apply_overrides(mut self, cli: &Cli) -> Self {
        if let Some(api_url) = &cli.api_url {
            self.api_url = api_url.clone();
        }
        if let Some(cache_dir) = &cli.cache_dir {
            self.cache_dir = cache_dir.clone();
        }
        if cli.no_cache {
            self.no_cache = true;
        }
        if let Some(currency) = &cli.currency {
            self.currency = currency.clone();
        }
        if let Some(max_pages) = cli.max_pages {
            self.max_pages = max_pages;
        }
        self
    }

    /// Rejects quote currencies the provider does not serve.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !currencies::is_supported(&self.currency) {
            bail!(
                "unsupported currency '{}', see `cointrack currencies`",
                self.currency
            );
        }
        Ok(())
    }

    pub fn provider_config(&self) -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: self.api_url.clone(),
            api_key: self.api_key.clone(),
            timeout: self.request_timeout,
        }
    }

    pub fn service_config(&self) -> ServiceConfig {
        let mut cache = CacheConfig::default().with_cache_dir(&self.cache_dir);
        if self.no_cache {
            cache = cache.no_cache();
        }
        ServiceConfig {
            pipeline: PipelineConfig::default()
                .with_max_pages(self.max_pages)
                .with_page_delay(self.page_delay)
                .with_default_currency(self.currency.as_str()),
            cache,
        }
    }
}
