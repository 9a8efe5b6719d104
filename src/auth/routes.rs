//! Auth HTTP Routes
//!
//! Thin handlers over the AuthService: registration, login, refresh,
//! and current-user resolution. Error kinds map to status codes here
//! and nowhere deeper.

use std::sync::Arc;

use axum::{
    extract::{Form, Json, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use super::errors::AuthError;
use super::service::{AuthService, Registration, TokenPair};
use super::store::{InMemoryCredentialStore, User};

/// Shared auth state
pub struct AuthState {
    pub service: AuthService<InMemoryCredentialStore>,
}

/// Auth routes with shared state
pub fn auth_routes(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/register", post(register_handler))
        .route("/token", post(login_handler))
        .route("/refresh", post(refresh_handler))
        .route("/read_current_user", get(current_user_handler))
        .with_state(state)
}

// ==================
// Request/Response Types
// ==================

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub transaction: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            is_active: user.is_active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        Self {
            error: err.to_string(),
            code: err.status_code(),
        }
    }
}

pub(crate) type ApiError = (StatusCode, Json<ErrorResponse>);

pub(crate) fn into_api_error(err: AuthError) -> ApiError {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ErrorResponse::from(err)))
}

/// Extract the bearer token from an Authorization header
pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix("Bearer "))
}

// ==================
// Handlers
// ==================

/// Register a new user
async fn register_handler(
    State(state): State<Arc<AuthState>>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    state
        .service
        .register(registration)
        .map_err(into_api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            transaction: "Successful".to_string(),
        }),
    ))
}

/// Authenticate and issue an access+refresh pair (form-encoded)
async fn login_handler(
    State(state): State<Arc<AuthState>>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenPair>, ApiError> {
    state
        .service
        .login(&form.username, &form.password)
        .map(Json)
        .map_err(into_api_error)
}

/// Rotate a refresh token into a new pair
async fn refresh_handler(
    State(state): State<Arc<AuthState>>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<TokenPair>, ApiError> {
    state
        .service
        .refresh(&request.refresh_token)
        .map(Json)
        .map_err(into_api_error)
}

/// Return the user behind the presented access token
async fn current_user_handler(
    State(state): State<Arc<AuthState>>,
    headers: HeaderMap,
) -> Result<Json<UserResponse>, ApiError> {
    let token = bearer_token(&headers).ok_or_else(|| into_api_error(AuthError::AuthFailed))?;

    let user = state.service.current_user(token).map_err(into_api_error)?;
    Ok(Json(UserResponse::from(&user)))
}
