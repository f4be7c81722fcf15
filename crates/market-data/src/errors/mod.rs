//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum for every provider-facing operation
//! - [`RetryClass`]: Classification used by callers that schedule retries
//!
//! Identifier resolution and normalization never fail, so no variant exists
//! for them.

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// A targeted price lookup returned no entry for the requested currency.
    #[error("Not found: {coin} in {currency}")]
    NotFound {
        /// Canonical coin ID that was requested
        coin: String,
        /// Lower-cased currency code that was requested
        currency: String,
    },

    /// The connectivity probe failed.
    #[error("Failed to ping {provider}: {message}")]
    PingFailed {
        /// The provider that was probed
        provider: String,
        /// Underlying failure
        message: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The provider answered with a non-success status.
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider payload could not be decoded.
    #[error("Decode error: {provider} - {message}")]
    Decode {
        /// The provider whose payload was rejected
        provider: String,
        /// Parser message
        message: String,
    },

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A background acquisition task ended abnormally.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use cointrack_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "COINGECKO".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::NotFound {
    ///     coin: "bitcoin".to_string(),
    ///     currency: "xyz".to_string(),
    /// };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::NotFound { .. } | Self::Decode { .. } | Self::Internal(_) => RetryClass::Never,

            Self::PingFailed { .. }
            | Self::RateLimited { .. }
            | Self::ProviderError { .. }
            | Self::Network(_) => RetryClass::WithBackoff,
        }
    }

    /// True when the provider could not be reached or refused service.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            Self::PingFailed { .. } | Self::Network(_) | Self::RateLimited { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_never_retries() {
        let error = MarketDataError::NotFound {
            coin: "bitcoin".to_string(),
            currency: "usd".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
        assert!(!error.is_connectivity());
    }

    #[test]
    fn test_decode_never_retries() {
        let error = MarketDataError::Decode {
            provider: "COINGECKO".to_string(),
            message: "expected value at line 1".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = MarketDataError::RateLimited {
            provider: "COINGECKO".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
        assert!(error.is_connectivity());
    }

    #[test]
    fn test_ping_failed_is_connectivity() {
        let error = MarketDataError::PingFailed {
            provider: "COINGECKO".to_string(),
            message: "connection refused".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
        assert!(error.is_connectivity());
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::NotFound {
            coin: "bitcoin".to_string(),
            currency: "usd".to_string(),
        };
        assert_eq!(format!("{}", error), "Not found: bitcoin in usd");

        let error = MarketDataError::ProviderError {
            provider: "COINGECKO".to_string(),
            message: "HTTP error: 500 Internal Server Error".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Provider error: COINGECKO - HTTP error: 500 Internal Server Error"
        );
    }
}
