//! # Currency Module
//!
//! Proxy layer over the external currency-exchange API: list currencies,
//! live rates, and amount conversion, all gated behind access-token auth.

pub mod client;
pub mod errors;
pub mod routes;
pub mod service;

pub use client::{HttpRateProvider, RateProvider};
pub use errors::{CurrencyError, CurrencyResult};
pub use service::{Conversion, CurrencyList, CurrencyService, LiveRates};
