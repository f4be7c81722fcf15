use cointrack_market_data::MarketDataError;

/// Result of one refresh cycle.
#[derive(Debug)]
pub struct RefreshSummary {
    pub currency: String,
    /// Pages received before the stream closed
    pub pages: u32,
    /// Records received across those pages
    pub records: usize,
    /// False when the stream stopped on an error
    pub completed: bool,
    /// Error that cut the refresh short, if any
    pub error: Option<MarketDataError>,
}

impl RefreshSummary {
    /// True when at least one page arrived and was written to the cache.
    pub fn updated_cache(&self) -> bool {
        self.pages > 0
    }
}
