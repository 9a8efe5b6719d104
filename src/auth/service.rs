//! # Auth Service
//!
//! Orchestrates the refresh-token lifecycle over the token codec and the
//! credential store: login issues a pair, refresh rotates single-use
//! tokens, current-user resolves an access token back to its user.
//!
//! ## Invariants
//! - A refresh token is consumed (revoked) before its replacement exists
//! - The persisted row is the authority for revocation; the signed expiry
//!   is the authority for bearer validity and is checked first
//! - Login failures are indistinguishable to the caller (absent user,
//!   wrong password, inactive account)

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::crypto::{hash_password, verify_password};
use super::errors::{AuthError, AuthResult};
use super::store::{NewRefreshToken, NewUser, RefreshTokenStore, User, UserStore};
use super::token::{TokenCodec, TokenKind};

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Access + refresh token pair returned on login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
}

/// Token lifetimes, fixed at process configuration
#[derive(Debug, Clone)]
pub struct TokenTtls {
    pub access: Duration,
    pub refresh: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            access: Duration::minutes(15),
            refresh: Duration::days(7),
        }
    }
}

/// Auth service over a credential store and a token codec
pub struct AuthService<S: UserStore + RefreshTokenStore> {
    store: Arc<S>,
    codec: TokenCodec,
    ttls: TokenTtls,
}

impl<S: UserStore + RefreshTokenStore> AuthService<S> {
    pub fn new(store: Arc<S>, codec: TokenCodec, ttls: TokenTtls) -> Self {
        Self { store, codec, ttls }
    }

    /// Register a new user
    pub fn register(&self, registration: Registration) -> AuthResult<User> {
        if self
            .store
            .find_by_username_or_email(&registration.username, &registration.email)?
            .is_some()
        {
            return Err(AuthError::AlreadyExists);
        }

        let password_hash = hash_password(&registration.password)?;
        let user = self.store.insert_user(NewUser {
            first_name: registration.first_name,
            last_name: registration.last_name,
            username: registration.username,
            email: registration.email,
            password_hash,
        })?;

        info!(user_id = user.id, username = %user.username, "user registered");
        Ok(user)
    }

    /// Authenticate by username and password and issue a token pair
    pub fn login(&self, username: &str, password: &str) -> AuthResult<TokenPair> {
        let user = match self.store.find_by_username(username)? {
            Some(user) if user.is_active && verify_password(password, &user.password_hash) => user,
            _ => {
                warn!(username, "login rejected");
                return Err(AuthError::AuthFailed);
            }
        };

        self.issue_pair(&user)
    }

    /// Rotate a refresh token: consume the old one, issue a new pair
    ///
    /// The signed token is verified before storage is consulted, so an
    /// expired bearer credential is rejected without a lookup. The row
    /// is found and revoked in one store critical section, before the
    /// replacement is issued: of two concurrent rotations of the same
    /// token, exactly one gets the row and the loser fails here.
    pub fn refresh(&self, refresh_token: &str) -> AuthResult<TokenPair> {
        self.codec.verify(refresh_token, TokenKind::Refresh)?;

        let row = self
            .store
            .consume_active_by_token(refresh_token)?
            .ok_or(AuthError::TokenNotRecognized)?;

        // The row expiry is checked independently of the embedded one;
        // the store is the authority for revocation decisions. The row
        // is already burned, which is the safe direction.
        if row.expires_at < Utc::now() {
            warn!(token_id = row.id, user_id = row.user_id, "refresh row expired");
            return Err(AuthError::TokenExpired);
        }

        let user = self
            .store
            .find_by_id(row.user_id)?
            .filter(|u| u.is_active)
            .ok_or(AuthError::AuthFailed)?;

        info!(user_id = user.id, old_token_id = row.id, "refresh token rotated");
        self.issue_pair(&user)
    }

    /// Resolve an access token to its active user
    pub fn current_user(&self, access_token: &str) -> AuthResult<User> {
        let claims = self.codec.verify(access_token, TokenKind::Access)?;

        self.store
            .find_by_id(claims.uid)?
            .filter(|u| u.is_active)
            .ok_or(AuthError::AuthFailed)
    }

    /// Sign an access+refresh pair and persist the refresh row
    fn issue_pair(&self, user: &User) -> AuthResult<TokenPair> {
        let access_token =
            self.codec
                .sign(&user.username, user.id, TokenKind::Access, self.ttls.access)?;
        let refresh_token =
            self.codec
                .sign(&user.username, user.id, TokenKind::Refresh, self.ttls.refresh)?;

        self.store.insert_refresh_token(NewRefreshToken {
            user_id: user.id,
            token: refresh_token.clone(),
            expires_at: Utc::now() + self.ttls.refresh,
        })?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
        })
    }
}
