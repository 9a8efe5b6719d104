//! fxgate - currency exchange API gateway with JWT access/refresh auth

pub mod auth;
pub mod config;
pub mod currency;
pub mod server;
