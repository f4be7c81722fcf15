//! Core error types for Cointrack.
//!
//! Provider failures come through unchanged as [`MarketDataError`]; cache
//! failures are kept separate so callers can treat a broken disk cache as
//! a miss.

use cointrack_market_data::MarketDataError;
use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Errors of the durable cache tier.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache entry could not be (de)serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Root error type of the core crate.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Cache operation failed: {0}")]
    Cache(#[from] CacheError),
}
