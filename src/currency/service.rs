//! # Currency Service
//!
//! Orchestrates the three proxied provider operations: currency list,
//! live rates, and conversion. Validates caller input before calling
//! out, and interprets the provider's `success` flag afterwards.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::client::RateProvider;
use super::errors::{CurrencyError, CurrencyResult};

/// Available currencies, code -> display name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyList {
    pub success: bool,
    pub currencies: BTreeMap<String, String>,
}

/// Live exchange rates relative to a source currency
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiveRates {
    pub success: bool,
    pub timestamp: i64,
    pub source: String,
    pub quotes: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionQuery {
    #[serde(rename = "from")]
    pub from_currency: String,
    pub to: String,
    pub amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionInfo {
    pub timestamp: i64,
    pub quote: f64,
}

/// Result of converting an amount between two currencies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    pub success: bool,
    pub query: ConversionQuery,
    pub info: ConversionInfo,
    pub result: f64,
}

/// Currency proxy service over a rate provider
pub struct CurrencyService {
    provider: Arc<dyn RateProvider>,
}

impl CurrencyService {
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self { provider }
    }

    /// List all currencies the provider supports
    pub async fn list(&self) -> CurrencyResult<CurrencyList> {
        let body = self.provider.fetch("list", &[]).await?;
        Self::decode(body, CurrencyError::ProviderRejected)
    }

    /// Live rates relative to `source`, optionally narrowed to a
    /// comma-separated list of target currencies
    pub async fn live(&self, source: &str, currencies: Option<&str>) -> CurrencyResult<LiveRates> {
        if source.trim().is_empty() {
            return Err(CurrencyError::InvalidQuery(
                "Source currency must be provided".to_string(),
            ));
        }

        let mut params = vec![("source", source.to_string())];
        if let Some(currencies) = currencies {
            params.push(("currencies", currencies.to_string()));
        }

        let body = self.provider.fetch("live", &params).await?;
        Self::decode(body, CurrencyError::Upstream)
    }

    /// Convert `amount` from one currency to another
    pub async fn convert(&self, amount: f64, from: &str, to: &str) -> CurrencyResult<Conversion> {
        if amount <= 0.0 {
            return Err(CurrencyError::InvalidQuery(
                "Amount must be greater than 0".to_string(),
            ));
        }
        if from.trim().is_empty() || to.trim().is_empty() {
            return Err(CurrencyError::InvalidQuery(
                "Both source and target currencies must be specified".to_string(),
            ));
        }

        let params = [
            ("to", to.to_string()),
            ("from", from.to_string()),
            ("amount", amount.to_string()),
        ];

        let body = self.provider.fetch("convert", &params).await?;
        Self::decode(body, CurrencyError::ProviderRejected)
    }

    /// Reject non-success provider bodies, then deserialize
    fn decode<T: serde::de::DeserializeOwned>(
        body: serde_json::Value,
        on_rejection: CurrencyError,
    ) -> CurrencyResult<T> {
        if body.get("success").and_then(|v| v.as_bool()) != Some(true) {
            return Err(on_rejection);
        }
        serde_json::from_value(body).map_err(|_| CurrencyError::Upstream)
    }
}
