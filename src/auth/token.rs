//! # Token Codec
//!
//! Signs and verifies compact, expiring, typed bearer tokens. Access and
//! refresh tokens share one codec and are distinguished by an embedded
//! kind tag, so a refresh token can never be used as an access token.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::errors::{AuthError, AuthResult};

/// Marker distinguishing access from refresh tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Signed token payload
///
/// Signed, not encrypted: integrity only, no secrets inside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Subject user id
    pub uid: i64,

    /// Expiration timestamp (Unix epoch seconds)
    pub exp: i64,

    /// Token kind tag
    pub kind: TokenKind,

    /// Unique token id; `exp` has second granularity, so without it two
    /// tokens signed for the same subject in the same second would be
    /// byte-identical
    pub jti: String,
}

/// Token codec for signing and verifying typed bearer tokens
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenCodec {
    /// Create a codec from the symmetric signing secret (HS256)
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Sign a token for the given subject, expiring `ttl` from now
    pub fn sign(&self, username: &str, user_id: i64, kind: TokenKind, ttl: Duration) -> AuthResult<String> {
        let claims = Claims {
            sub: username.to_string(),
            uid: user_id,
            exp: (Utc::now() + ttl).timestamp(),
            kind,
            jti: format!("{:032x}", rand::random::<u128>()),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|_| AuthError::SigningFailed)
    }

    /// Verify a token and check its kind tag
    ///
    /// Expiry is exclusive: a token whose `exp` equals the current second
    /// is still valid. Expiry is checked before the kind tag, so either
    /// failure rejects the token without revealing the other.
    pub fn verify(&self, token: &str, expected_kind: TokenKind) -> AuthResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let token_data =
            decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
                match e.kind() {
                    jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                    jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                        AuthError::SignatureInvalid
                    }
                    _ => AuthError::MalformedToken,
                }
            })?;

        if token_data.claims.kind != expected_kind {
            return Err(AuthError::KindMismatch);
        }

        Ok(token_data.claims)
    }
}
