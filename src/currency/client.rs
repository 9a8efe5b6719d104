//! # Rate Provider Client
//!
//! The outbound seam to the external currency-exchange API. The provider
//! is a plain `fetch(path, params) -> JSON-or-error` collaborator; all
//! response interpretation happens in the service layer.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::errors::{CurrencyError, CurrencyResult};

/// External currency API collaborator
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// GET `{base}/{path}?{params}` and return the decoded JSON body
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> CurrencyResult<Value>;
}

/// HTTP implementation backed by reqwest
///
/// Authenticates with the provider via an `apikey` header on every call.
pub struct HttpRateProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpRateProvider {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch(&self, path: &str, params: &[(&str, String)]) -> CurrencyResult<Value> {
        let response = self
            .client
            .get(self.url_for(path))
            .header("apikey", &self.api_key)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!(path, error = %e, "currency provider unreachable");
                CurrencyError::Upstream
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "currency provider error status");
            return Err(CurrencyError::ProviderStatus(status.as_u16()));
        }

        response.json::<Value>().await.map_err(|e| {
            warn!(path, error = %e, "currency provider returned non-JSON body");
            CurrencyError::Upstream
        })
    }
}
