//! Bitfinex Exchange Adapter
//!
//! REST client for the Bitfinex v1 API.
//! Authenticated calls are POSTs carrying a base64 JSON payload signed with
//! HMAC-SHA384; public market data is plain GET.
//!
//! This module is organized into submodules:
//! - `config` - Credentials, base URL and environment loading
//! - `nonce` - Strictly increasing request nonce
//! - `signing` - Payload encoding and HMAC-SHA384 signature
//! - `endpoints` - Operation → path table
//! - `dispatcher` - Signed/public request sending and status policy
//! - `types` - Request payloads and response shapes
//! - `client` - Main BitfinexClient implementation

mod client;
mod config;
mod dispatcher;
mod endpoints;
mod nonce;
pub mod signing;
pub mod types;

// Re-export public items
pub use client::BitfinexClient;
pub use config::{BitfinexConfig, DEFAULT_BASE_URL};
pub use dispatcher::{Dispatcher, EXCHANGE_NAME};
pub use endpoints::{Endpoint, PublicEndpoint};
pub use nonce::NonceGenerator;
pub use signing::{hmac_sha384_hex, Signer};
pub use types::{
    Currency, DepositMethod, HistoryRequest, NewOffer, NewOrder, OfferDirection, OrderSide,
    OrderType, Pair, PublicCall, Wallet,
};
