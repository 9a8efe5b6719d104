//! # Auth Module
//!
//! User registration, login, and the JWT access/refresh token lifecycle:
//! issuance, single-use rotation, revocation, and expiry validation
//! against the credential store.

pub mod crypto;
pub mod errors;
pub mod routes;
pub mod service;
pub mod store;
pub mod token;

pub use errors::{AuthError, AuthResult};
pub use service::{AuthService, TokenPair, TokenTtls};
pub use store::{InMemoryCredentialStore, RefreshToken, RefreshTokenStore, User, UserStore};
pub use token::{Claims, TokenCodec, TokenKind};
