//! Router-level tests exercising the HTTP surface end to end with a
//! mock rate provider behind the currency routes.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use fxgate::auth::routes::AuthState;
use fxgate::auth::{AuthService, InMemoryCredentialStore, TokenCodec, TokenTtls};
use fxgate::currency::{CurrencyError, CurrencyResult, RateProvider};
use fxgate::server::build_router;

const SECRET: &str = "http_test_secret";

/// Provider serving canned bodies per path
struct MockProvider;

#[async_trait]
impl RateProvider for MockProvider {
    async fn fetch(&self, path: &str, _params: &[(&str, String)]) -> CurrencyResult<Value> {
        match path {
            "list" => Ok(json!({
                "success": true,
                "currencies": {"EUR": "Euro", "USD": "United States Dollar"}
            })),
            "live" => Ok(json!({
                "success": true,
                "timestamp": 1747256405,
                "source": "USD",
                "quotes": {"USDEUR": 0.89499}
            })),
            "convert" => Ok(json!({
                "success": true,
                "query": {"from": "USD", "to": "EUR", "amount": 2.0},
                "info": {"timestamp": 1747255923, "quote": 0.89507},
                "result": 1.79014
            })),
            _ => Err(CurrencyError::Upstream),
        }
    }
}

/// Provider whose upstream always answers with `success: false`
struct RejectingProvider;

#[async_trait]
impl RateProvider for RejectingProvider {
    async fn fetch(&self, _path: &str, _params: &[(&str, String)]) -> CurrencyResult<Value> {
        Ok(json!({"success": false, "error": {"code": 101}}))
    }
}

fn app_with(provider: Arc<dyn RateProvider>) -> Router {
    let auth_state = Arc::new(AuthState {
        service: AuthService::new(
            Arc::new(InMemoryCredentialStore::new()),
            TokenCodec::new(SECRET),
            TokenTtls::default(),
        ),
    });
    build_router(auth_state, provider)
}

fn app() -> Router {
    app_with(Arc::new(MockProvider))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn form_login(username: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/token")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(format!("username={username}&password={password}")))
        .unwrap()
}

fn get_with_bearer(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn alice_registration() -> Value {
    json!({
        "first_name": "Alice",
        "last_name": "Smith",
        "username": "alice",
        "email": "alice@x.com",
        "password": "pw123"
    })
}

/// Register alice and log her in, returning (access, refresh)
async fn register_and_login(app: &Router) -> (String, String) {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/register", alice_registration()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.clone().oneshot(form_login("alice", "pw123")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["token_type"], "Bearer");

    (
        body["access_token"].as_str().unwrap().to_string(),
        body["refresh_token"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn health_and_welcome() {
    let app = app();

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");

    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_login_refresh_scenario() {
    let app = app();

    // Register alice
    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/register", alice_registration()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["transaction"], "Successful");

    // Same username again: 400
    let response = app
        .clone()
        .oneshot(json_request("POST", "/auth/register", alice_registration()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Login: two tokens
    let response = app.clone().oneshot(form_login("alice", "pw123")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

    // Wrong password: 401
    let response = app.clone().oneshot(form_login("alice", "nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Refresh: new pair
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/refresh",
            json!({"refresh_token": refresh_token}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_ne!(body["refresh_token"].as_str().unwrap(), refresh_token);

    // Replaying the original refresh token: 401
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/auth/refresh",
            json!({"refresh_token": refresh_token}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn read_current_user() {
    let app = app();
    let (access, refresh) = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(get_with_bearer("/auth/read_current_user", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@x.com");
    assert_eq!(body["is_active"], true);
    assert!(body.get("password_hash").is_none());

    // A refresh token is not an access token
    let response = app
        .clone()
        .oneshot(get_with_bearer("/auth/read_current_user", &refresh))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // No header at all
    let response = app
        .oneshot(
            Request::get("/auth/read_current_user")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn currency_endpoints_require_auth() {
    let app = app();

    for uri in [
        "/currencies/",
        "/currencies/rates?source=USD",
        "/currencies/convert?amount=2&from_currency=USD&to_currency=EUR",
    ] {
        let response = app
            .clone()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {uri}");
    }
}

#[tokio::test]
async fn currency_proxy_happy_path() {
    let app = app();
    let (access, _) = register_and_login(&app).await;

    let response = app
        .clone()
        .oneshot(get_with_bearer("/currencies/", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["currencies"]["EUR"], "Euro");

    let response = app
        .clone()
        .oneshot(get_with_bearer("/currencies/rates?currencies=EUR", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["source"], "USD");
    assert_eq!(body["quotes"]["USDEUR"], 0.89499);

    let response = app
        .clone()
        .oneshot(get_with_bearer(
            "/currencies/convert?amount=2&from_currency=USD&to_currency=EUR",
            &access,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["result"], 1.79014);
}

#[tokio::test]
async fn currency_convert_validates_amount() {
    let app = app();
    let (access, _) = register_and_login(&app).await;

    let response = app
        .oneshot(get_with_bearer(
            "/currencies/convert?amount=0&from_currency=USD&to_currency=EUR",
            &access,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn currency_provider_rejection_maps_to_bad_request() {
    let app = app_with(Arc::new(RejectingProvider));
    let (access, _) = register_and_login(&app).await;

    let response = app
        .oneshot(get_with_bearer("/currencies/", &access))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["code"], 400);
}
