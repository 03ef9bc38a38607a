//! Bitfinex v1 REST client
//!
//! - Signed (HMAC-SHA384) and public requests over a swappable HTTP transport
//! - Typed wrappers for the order, account, lending and market data endpoints
//! - YAML config and structured logging for the bundled binaries

pub mod adapters;
pub mod bin_utils;
pub mod config;
pub mod error;

pub use adapters::bitfinex::BitfinexClient;
pub use error::AppError;
