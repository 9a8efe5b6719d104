//! Application Configuration
//!
//! Process-wide immutable configuration, read from the environment once
//! at startup and passed by reference into the token codec, auth
//! service, and currency client.

use chrono::Duration;

use crate::auth::TokenTtls;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to (default: "0.0.0.0")
    pub host: String,

    /// Port to bind to (default: 8000)
    pub port: u16,

    /// Symmetric JWT signing secret
    pub jwt_secret: String,

    /// Access token lifetime in minutes (default: 15)
    pub access_token_minutes: i64,

    /// Refresh token lifetime in days (default: 7)
    pub refresh_token_days: i64,

    /// Base URL of the external currency API
    pub currency_api_url: String,

    /// API key sent to the currency provider
    pub currency_api_key: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            jwt_secret: "CHANGE_THIS_SECRET_IN_PRODUCTION".to_string(),
            access_token_minutes: 15,
            refresh_token_days: 7,
            currency_api_url: "https://api.apilayer.com/currency_data".to_string(),
            currency_api_key: String::new(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from environment variables, falling back
    /// to defaults for anything unset or unparsable
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env_or("HOST", defaults.host),
            port: env_parse_or("PORT", defaults.port),
            jwt_secret: env_or("JWT_SECRET_KEY", defaults.jwt_secret),
            access_token_minutes: env_parse_or(
                "ACCESS_TOKEN_EXPIRE_MINUTES",
                defaults.access_token_minutes,
            ),
            refresh_token_days: env_parse_or(
                "REFRESH_TOKEN_EXPIRE_DAYS",
                defaults.refresh_token_days,
            ),
            currency_api_url: env_or("CURRENCY_API_URL", defaults.currency_api_url),
            currency_api_key: env_or("CURRENCY_API_KEY", defaults.currency_api_key),
        }
    }

    /// Token lifetimes as chrono durations
    pub fn token_ttls(&self) -> TokenTtls {
        TokenTtls {
            access: Duration::minutes(self.access_token_minutes),
            refresh: Duration::days(self.refresh_token_days),
        }
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
