//! # Credential Store
//!
//! User and refresh-token records plus the storage traits the auth
//! service is written against.
//!
//! ## Invariants
//! - Usernames and emails are unique across users
//! - Deleting a user deletes its refresh-token rows in the same operation
//! - Consuming a token (find + revoke) is one critical section under the
//!   store's write lock, so of two concurrent rotations of the same token
//!   exactly one gets the row; the loser observes `is_revoked == true`

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};

/// Persisted user record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,

    /// Unique login name
    pub username: String,

    /// Unique email address
    pub email: String,

    /// Argon2id password hash (never plaintext)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Deactivated users cannot authenticate or refresh
    pub is_active: bool,
}

/// User fields prior to id assignment
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

/// Persisted refresh-token row
///
/// The `token` column holds the signed refresh string itself; the row is
/// the authority for revocation. Only mutation ever applied is setting
/// `is_revoked` to true.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshToken {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub is_revoked: bool,
}

/// Refresh-token fields prior to id assignment
#[derive(Debug, Clone)]
pub struct NewRefreshToken {
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Storage operations for users
pub trait UserStore: Send + Sync {
    /// Find a user by their id
    fn find_by_id(&self, id: i64) -> AuthResult<Option<User>>;

    /// Find a user by their username
    fn find_by_username(&self, username: &str) -> AuthResult<Option<User>>;

    /// Find a user matching either the username or the email
    fn find_by_username_or_email(&self, username: &str, email: &str) -> AuthResult<Option<User>>;

    /// Insert a new user, assigning its id
    ///
    /// Fails with `AlreadyExists` if the username or email is taken.
    fn insert_user(&self, user: NewUser) -> AuthResult<User>;

    /// Mark a user inactive, disabling all future authentication
    fn deactivate_user(&self, id: i64) -> AuthResult<()>;

    /// Delete a user and, in the same operation, all of its refresh rows
    fn delete_user(&self, id: i64) -> AuthResult<()>;
}

/// Storage operations for refresh tokens
pub trait RefreshTokenStore: Send + Sync {
    /// Insert a new refresh-token row, assigning its id
    fn insert_refresh_token(&self, token: NewRefreshToken) -> AuthResult<RefreshToken>;

    /// Find the row for this signed token string, if present and not revoked
    fn find_active_by_token(&self, token: &str) -> AuthResult<Option<RefreshToken>>;

    /// Atomically find the non-revoked row for this signed token string
    /// and set `is_revoked`, returning the consumed row
    ///
    /// Find and revoke must happen under one write lock: of two
    /// concurrent calls for the same token, exactly one gets the row.
    fn consume_active_by_token(&self, token: &str) -> AuthResult<Option<RefreshToken>>;

    /// Set `is_revoked` on the row with this id
    fn revoke_refresh_token(&self, id: i64) -> AuthResult<()>;
}

#[derive(Debug, Default)]
struct StoreInner {
    users: Vec<User>,
    tokens: Vec<RefreshToken>,
    next_user_id: i64,
    next_token_id: i64,
}

/// In-memory credential store
///
/// Users and refresh tokens live behind one lock, which is what makes
/// the cascade delete and the revoke-then-insert rotation atomic with
/// respect to concurrent requests.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    inner: RwLock<StoreInner>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryCredentialStore {
    fn find_by_id(&self, id: i64) -> AuthResult<Option<User>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;
        Ok(inner.users.iter().find(|u| u.id == id).cloned())
    }

    fn find_by_username(&self, username: &str) -> AuthResult<Option<User>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;
        Ok(inner.users.iter().find(|u| u.username == username).cloned())
    }

    fn find_by_username_or_email(&self, username: &str, email: &str) -> AuthResult<Option<User>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;
        Ok(inner
            .users
            .iter()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    fn insert_user(&self, user: NewUser) -> AuthResult<User> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        if inner
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AuthError::AlreadyExists);
        }

        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_active: true,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    fn deactivate_user(&self, id: i64) -> AuthResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        match inner.users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.is_active = false;
                Ok(())
            }
            None => Err(AuthError::StorageError("User not found".to_string())),
        }
    }

    fn delete_user(&self, id: i64) -> AuthResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        let len_before = inner.users.len();
        inner.users.retain(|u| u.id != id);
        if inner.users.len() == len_before {
            return Err(AuthError::StorageError("User not found".to_string()));
        }

        // Cascade: dependent refresh rows go in the same critical section
        inner.tokens.retain(|t| t.user_id != id);
        Ok(())
    }
}

impl RefreshTokenStore for InMemoryCredentialStore {
    fn insert_refresh_token(&self, token: NewRefreshToken) -> AuthResult<RefreshToken> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        if inner.tokens.iter().any(|t| t.token == token.token) {
            return Err(AuthError::StorageError(
                "Duplicate refresh token".to_string(),
            ));
        }

        inner.next_token_id += 1;
        let token = RefreshToken {
            id: inner.next_token_id,
            user_id: token.user_id,
            token: token.token,
            expires_at: token.expires_at,
            is_revoked: false,
        };
        inner.tokens.push(token.clone());
        Ok(token)
    }

    fn find_active_by_token(&self, token: &str) -> AuthResult<Option<RefreshToken>> {
        let inner = self
            .inner
            .read()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;
        Ok(inner
            .tokens
            .iter()
            .find(|t| t.token == token && !t.is_revoked)
            .cloned())
    }

    fn consume_active_by_token(&self, token: &str) -> AuthResult<Option<RefreshToken>> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        match inner
            .tokens
            .iter_mut()
            .find(|t| t.token == token && !t.is_revoked)
        {
            Some(row) => {
                row.is_revoked = true;
                Ok(Some(row.clone()))
            }
            None => Ok(None),
        }
    }

    fn revoke_refresh_token(&self, id: i64) -> AuthResult<()> {
        let mut inner = self
            .inner
            .write()
            .map_err(|_| AuthError::StorageError("Lock poisoned".to_string()))?;

        match inner.tokens.iter_mut().find(|t| t.id == id) {
            Some(token) => {
                token.is_revoked = true;
                Ok(())
            }
            None => Err(AuthError::StorageError("Token not found".to_string())),
        }
    }
}
