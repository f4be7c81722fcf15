//! Provider rate limiting configuration.

/// Rate limiting configuration for a provider.
///
/// Controls how aggressively we can call a provider to avoid
/// hitting their quota and getting blocked.
#[derive(Clone, Debug, PartialEq)]
pub struct RateLimit {
    /// Maximum requests allowed per minute.
    pub requests_per_minute: u32,

    /// Requests that may be issued back to back before pacing kicks in.
    pub burst: u32,

    /// Maximum page size the provider accepts.
    pub max_page_size: u32,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 30,
            burst: 10,
            max_page_size: 250,
        }
    }
}
