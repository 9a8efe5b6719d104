//! # HTTP Server
//!
//! Router assembly and serving: auth routes under `/auth`, the currency
//! proxy under `/currencies`, plus a health check.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::auth::routes::{auth_routes, AuthState};
use crate::auth::{AuthService, InMemoryCredentialStore, TokenCodec};
use crate::config::AppConfig;
use crate::currency::client::HttpRateProvider;
use crate::currency::routes::{currency_routes, CurrencyState};
use crate::currency::{CurrencyService, RateProvider};

/// HTTP server for the currency exchange gateway
pub struct HttpServer {
    config: AppConfig,
    router: Router,
}

impl HttpServer {
    /// Create a server from configuration, wiring the real provider
    pub fn new(config: AppConfig) -> Self {
        let store = Arc::new(InMemoryCredentialStore::new());
        let auth_state = Arc::new(AuthState {
            service: AuthService::new(
                store,
                TokenCodec::new(&config.jwt_secret),
                config.token_ttls(),
            ),
        });
        let provider = Arc::new(HttpRateProvider::new(
            config.currency_api_url.clone(),
            config.currency_api_key.clone(),
        ));

        let router = build_router(auth_state, provider);
        Self { config, router }
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until shutdown
    pub async fn start(self) -> Result<(), std::io::Error> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        info!(%addr, "starting HTTP server");

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

/// Build the full router over the given auth state and rate provider
///
/// Taking the provider as a parameter keeps the upstream seam swappable
/// in router-level tests.
pub fn build_router(auth_state: Arc<AuthState>, provider: Arc<dyn RateProvider>) -> Router {
    let currency_state = Arc::new(CurrencyState {
        auth: auth_state.clone(),
        service: CurrencyService::new(provider),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(welcome_handler))
        .route("/health", get(health_handler))
        .nest("/auth", auth_routes(auth_state))
        .nest("/currencies/", currency_routes(currency_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

#[derive(Debug, Serialize)]
struct WelcomeResponse {
    message: String,
}

async fn welcome_handler() -> impl IntoResponse {
    Json(WelcomeResponse {
        message: "Currency exchange app".to_string(),
    })
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    (StatusCode::OK, Json(response))
}
