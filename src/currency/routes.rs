//! Currency HTTP Routes
//!
//! Access-token-gated proxy endpoints over the external currency API.

use std::sync::Arc;

use axum::{
    extract::{Json, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Router,
};
use serde::Deserialize;

use crate::auth::errors::AuthError;
use crate::auth::routes::{bearer_token, into_api_error, ApiError, AuthState, ErrorResponse};

use super::errors::CurrencyError;
use super::service::{Conversion, CurrencyList, CurrencyService, LiveRates};

/// Shared currency state
///
/// Holds the auth state too: every currency endpoint resolves the caller
/// from its bearer token before touching the provider.
pub struct CurrencyState {
    pub auth: Arc<AuthState>,
    pub service: CurrencyService,
}

/// Currency routes with shared state
pub fn currency_routes(state: Arc<CurrencyState>) -> Router {
    Router::new()
        .route("/", get(list_handler))
        .route("/rates", get(rates_handler))
        .route("/convert", get(convert_handler))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct RatesQuery {
    #[serde(default = "default_source")]
    pub source: String,
    pub currencies: Option<String>,
}

fn default_source() -> String {
    "USD".to_string()
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
}

fn currency_api_error(err: CurrencyError) -> ApiError {
    let code = err.status_code();
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_GATEWAY);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
            code,
        }),
    )
}

/// Reject the request unless the bearer access token resolves to an
/// active user
fn require_user(state: &CurrencyState, headers: &HeaderMap) -> Result<(), ApiError> {
    let token = bearer_token(headers).ok_or_else(|| into_api_error(AuthError::AuthFailed))?;
    state
        .auth
        .service
        .current_user(token)
        .map(|_| ())
        .map_err(into_api_error)
}

/// List available currencies
async fn list_handler(
    State(state): State<Arc<CurrencyState>>,
    headers: HeaderMap,
) -> Result<Json<CurrencyList>, ApiError> {
    require_user(&state, &headers)?;

    state
        .service
        .list()
        .await
        .map(Json)
        .map_err(currency_api_error)
}

/// Live rates relative to a base currency
async fn rates_handler(
    State(state): State<Arc<CurrencyState>>,
    headers: HeaderMap,
    Query(query): Query<RatesQuery>,
) -> Result<Json<LiveRates>, ApiError> {
    require_user(&state, &headers)?;

    state
        .service
        .live(&query.source, query.currencies.as_deref())
        .await
        .map(Json)
        .map_err(currency_api_error)
}

/// Convert an amount between two currencies
async fn convert_handler(
    State(state): State<Arc<CurrencyState>>,
    headers: HeaderMap,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<Conversion>, ApiError> {
    require_user(&state, &headers)?;

    state
        .service
        .convert(query.amount, &query.from_currency, &query.to_currency)
        .await
        .map(Json)
        .map_err(currency_api_error)
}
