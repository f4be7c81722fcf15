//! Paginated acquisition pipeline.
//!
//! - [`AcquisitionPipeline`]: bulk (`fetch_all`) and targeted (`fetch_one`,
//!   `fetch_coin`, `fetch_batch`) fetches
//! - [`PageStream`]: the bulk fetch's page stream, one page of lookahead
//! - [`RateLimiter`]: token bucket applied before every provider call

mod acquisition;
mod config;
mod rate_limiter;
mod stream;

pub use acquisition::AcquisitionPipeline;
pub use config::{PipelineConfig, DEFAULT_MAX_PAGES, DEFAULT_PAGE_DELAY, MAX_PAGE_SIZE};
pub use rate_limiter::RateLimiter;
pub use stream::{FetchOutcome, PageStream};
