//! HTTP transport trait
//!
//! The exchange client never talks to `reqwest` directly; it goes through
//! `HttpTransport`, so the wire layer can be swapped (recording transports in
//! tests, a proxying client in production).

use async_trait::async_trait;

use crate::adapters::errors::ExchangeResult;
use crate::adapters::types::RawResponse;

/// Minimal HTTP capability the exchange client needs
///
/// Implementations must return `Ok` for every completed HTTP exchange,
/// whatever the status code. Only transport-level failures (no response at
/// all) map to `Err`.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Plain GET without extra headers
    async fn get(&self, url: &str) -> ExchangeResult<RawResponse>;

    /// POST with the given headers and an empty body
    async fn post(&self, url: &str, headers: &[(&'static str, String)])
        -> ExchangeResult<RawResponse>;

    /// Short name used in log fields
    fn name(&self) -> &'static str {
        "http"
    }
}
