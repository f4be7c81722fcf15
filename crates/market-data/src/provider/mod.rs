//! Market data provider abstractions and implementations.
//!
//! This module contains:
//! - The `CoinDataProvider` trait the acquisition pipeline drives
//! - Provider rate limiting configuration
//! - The CoinGecko implementation
//! - A scripted in-memory provider for tests (`testing` feature)

mod capabilities;
mod traits;

pub mod coingecko;
#[cfg(any(test, feature = "testing"))]
pub mod mock;

// Re-exports
pub use capabilities::RateLimit;
pub use traits::CoinDataProvider;
