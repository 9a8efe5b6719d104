//! # Auth Errors
//!
//! Error types for authentication, token verification, and rotation.

use thiserror::Error;

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Authentication and token lifecycle errors
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Bad credentials or inactive user (generic - don't leak which check failed)
    #[error("Invalid authentication credentials")]
    AuthFailed,

    /// Username or email already registered
    #[error("User already exists")]
    AlreadyExists,

    /// Refresh token has no matching active row in the store
    #[error("Refresh token not found or revoked")]
    TokenNotRecognized,

    /// Token has expired (embedded expiry or persisted row expiry)
    #[error("Token expired")]
    TokenExpired,

    /// Token signature does not verify
    #[error("Invalid token signature")]
    SignatureInvalid,

    /// Access token presented where refresh expected, or vice versa
    #[error("Invalid authentication credentials")]
    KindMismatch,

    /// Token could not be decoded at all
    #[error("Invalid authentication credentials")]
    MalformedToken,

    /// Password hashing failed
    #[error("Internal error: password hashing failed")]
    HashingFailed,

    /// Token signing failed
    #[error("Internal error: token signing failed")]
    SigningFailed,

    /// Credential store operation failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

impl AuthError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            AuthError::AlreadyExists => 400,

            // 401 Unauthorized
            AuthError::AuthFailed => 401,
            AuthError::TokenNotRecognized => 401,
            AuthError::TokenExpired => 401,
            AuthError::SignatureInvalid => 401,
            AuthError::KindMismatch => 401,
            AuthError::MalformedToken => 401,

            // 500 Internal Server Error
            AuthError::HashingFailed => 500,
            AuthError::SigningFailed => 500,
            AuthError::StorageError(_) => 500,
        }
    }

    /// Returns whether this error should be logged at warn level
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
