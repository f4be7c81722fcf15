use std::time::Duration;

use crate::format::DEFAULT_CURRENCY;

/// Largest page any supported provider serves.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Default ceiling on pages per bulk fetch.
pub const DEFAULT_MAX_PAGES: u32 = 10;

/// Default pause between successive page requests.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_secs(1);

/// Pagination and pacing settings for the acquisition pipeline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Records per page, always within `1..=MAX_PAGE_SIZE`
    page_size: u32,
    /// Ceiling on pages per bulk fetch
    pub max_pages: u32,
    /// Pause before every page after the first
    pub page_delay: Duration,
    /// Currency used when a caller passes an empty code
    pub default_currency: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
            page_delay: DEFAULT_PAGE_DELAY,
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Sets the page size, clamped to what providers accept.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    pub fn with_default_currency(mut self, currency: impl Into<String>) -> Self {
        let currency = currency.into().trim().to_lowercase();
        if !currency.is_empty() {
            self.default_currency = currency;
        }
        self
    }

    /// Lower-cased currency, falling back to the configured default.
    pub fn currency(&self, currency: &str) -> String {
        let currency = currency.trim().to_lowercase();
        if currency.is_empty() {
            self.default_currency.clone()
        } else {
            currency
        }
    }
}
