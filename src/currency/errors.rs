//! # Currency Errors
//!
//! Error types for the currency-exchange proxy.

use thiserror::Error;

/// Result type for currency operations
pub type CurrencyResult<T> = Result<T, CurrencyError>;

/// Currency proxy errors
#[derive(Debug, Clone, Error)]
pub enum CurrencyError {
    /// Caller-supplied query is unusable before any upstream call
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Provider answered but with `success: false`
    #[error("Currency provider rejected the request")]
    ProviderRejected,

    /// Provider answered with a non-success HTTP status
    #[error("External currency API error: status {0}")]
    ProviderStatus(u16),

    /// Transport failure or undecodable provider response
    #[error("Error communicating with external currency API")]
    Upstream,
}

impl CurrencyError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            CurrencyError::InvalidQuery(_) => 422,
            CurrencyError::ProviderRejected => 400,
            // Provider status passes through to the caller
            CurrencyError::ProviderStatus(status) => *status,
            CurrencyError::Upstream => 502,
        }
    }
}
