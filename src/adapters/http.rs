//! Shared HTTP client builder and the reqwest-backed transport

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::traits::HttpTransport;
use crate::adapters::types::RawResponse;

// =============================================================================
// HTTP Client Constants
// =============================================================================

/// Default request timeout (milliseconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default connection timeout (milliseconds)
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 3_000;
/// Max idle connections per host in connection pool
const HTTP_POOL_MAX_IDLE: usize = 5;
/// How long idle connections stay in the pool (seconds)
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 60;
/// TCP keepalive interval (seconds)
const HTTP_TCP_KEEPALIVE_SECS: u64 = 30;

/// Timeouts applied to every request issued by a client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Whole-request timeout in milliseconds
    pub timeout_ms: u64,
    /// TCP/TLS connect timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
        }
    }
}

/// Create a pooled HTTP client for exchange REST calls
pub fn create_http_client(exchange_name: &str, http: &HttpConfig) -> reqwest::Client {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_millis(http.timeout_ms))
        .connect_timeout(Duration::from_millis(http.connect_timeout_ms))
        .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE)
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .tcp_keepalive(Duration::from_secs(HTTP_TCP_KEEPALIVE_SECS))
        .tcp_nodelay(true)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new());
    tracing::info!(
        phase = "init",
        exchange = %exchange_name,
        timeout_ms = http.timeout_ms,
        connect_timeout_ms = http.connect_timeout_ms,
        pool_max_idle = HTTP_POOL_MAX_IDLE,
        pool_idle_timeout_s = HTTP_POOL_IDLE_TIMEOUT_SECS,
        tcp_keepalive_s = HTTP_TCP_KEEPALIVE_SECS,
        "HTTP client configured"
    );
    client
}

// =============================================================================
// ReqwestTransport
// =============================================================================

/// `HttpTransport` over a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    timeout_ms: u64,
}

impl ReqwestTransport {
    pub fn new(exchange_name: &str, http: &HttpConfig) -> Self {
        Self::from_client(create_http_client(exchange_name, http), http.timeout_ms)
    }

    /// Wrap an already configured client; `timeout_ms` is only used for error reporting
    pub fn from_client(client: reqwest::Client, timeout_ms: u64) -> Self {
        Self { client, timeout_ms }
    }

    fn map_error(&self, err: reqwest::Error) -> ExchangeError {
        if err.is_timeout() {
            ExchangeError::NetworkTimeout(self.timeout_ms)
        } else {
            ExchangeError::ConnectionFailed(err.to_string())
        }
    }

    async fn into_raw(&self, response: reqwest::Response) -> ExchangeResult<RawResponse> {
        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| self.map_error(e))?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> ExchangeResult<RawResponse> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;
        self.into_raw(response).await
    }

    async fn post(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
    ) -> ExchangeResult<RawResponse> {
        let mut request = self.client.post(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }
        let response = request.send().await.map_err(|e| self.map_error(e))?;
        self.into_raw(response).await
    }

    fn name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let http = HttpConfig::default();
        assert_eq!(http.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(http.connect_timeout_ms, DEFAULT_CONNECT_TIMEOUT_MS);
    }

    #[test]
    fn test_http_config_partial_yaml() {
        let http: HttpConfig = serde_yaml::from_str("timeout_ms: 2500").unwrap();
        assert_eq!(http.timeout_ms, 2500);
        assert_eq!(http.connect_timeout_ms, DEFAULT_CONNECT_TIMEOUT_MS);
    }

    #[tokio::test]
    async fn test_get_returns_non_success_status_as_ok() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/pubticker/btcusd")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let transport = ReqwestTransport::new("test", &HttpConfig::default());
        let raw = transport
            .get(&format!("{}/v1/pubticker/btcusd", server.url()))
            .await
            .unwrap();

        assert_eq!(raw, RawResponse::new(503, "maintenance"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_sends_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/balances")
            .match_header("X-Test", "yes")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let transport = ReqwestTransport::new("test", &HttpConfig::default());
        let raw = transport
            .post(
                &format!("{}/v1/balances", server.url()),
                &[("X-Test", "yes".to_string())],
            )
            .await
            .unwrap();

        assert_eq!(raw.status, 200);
        assert_eq!(raw.body, "[]");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_from_client_keeps_client_settings() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/symbols_details")
            .match_header("user-agent", "custom-agent/1.0")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let client = reqwest::Client::builder()
            .user_agent("custom-agent/1.0")
            .build()
            .unwrap();
        let transport = ReqwestTransport::from_client(client, 1_000);
        let raw = transport
            .get(&format!("{}/v1/symbols_details", server.url()))
            .await
            .unwrap();

        assert!(raw.is_success());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let transport = ReqwestTransport::new("test", &HttpConfig::default());
        let err = transport.get("http://127.0.0.1:1/v1/symbols").await.unwrap_err();
        assert!(err.is_transport(), "Got: {}", err);
    }
}
