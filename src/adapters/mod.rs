//! Exchange adapters
//!
//! Shared HTTP plumbing (transport trait, reqwest client, error taxonomy)
//! and the Bitfinex v1 REST adapter built on it.

pub mod bitfinex;
pub mod errors;
pub mod http;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use bitfinex::{BitfinexClient, BitfinexConfig};
pub use errors::{ExchangeError, ExchangeResult};
pub use http::{HttpConfig, ReqwestTransport};
pub use traits::HttpTransport;
pub use types::RawResponse;
