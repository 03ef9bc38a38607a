//! Bitfinex Request Dispatcher
//!
//! One place that turns an operation into an HTTP exchange:
//! nonce → envelope → signature → POST, or a plain GET for public data.
//! Status policy and body decoding live here too, so every catalog method
//! fails the same way.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapters::bitfinex::config::BitfinexConfig;
use crate::adapters::bitfinex::endpoints::{Endpoint, PublicEndpoint};
use crate::adapters::bitfinex::nonce::NonceGenerator;
use crate::adapters::bitfinex::signing::{SignedPayload, Signer};
use crate::adapters::bitfinex::types::ErrorResponse;
use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::traits::HttpTransport;
use crate::adapters::types::RawResponse;

/// Exchange name used in log fields
pub const EXCHANGE_NAME: &str = "bitfinex";

/// Signs and sends requests for one credential set
#[derive(Clone)]
pub struct Dispatcher {
    config: BitfinexConfig,
    signer: Signer,
    nonce: Arc<NonceGenerator>,
    transport: Arc<dyn HttpTransport>,
}

impl Dispatcher {
    pub fn new(
        config: BitfinexConfig,
        nonce: Arc<NonceGenerator>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        let signer = Signer::new(config.api_key.clone(), config.api_secret.clone());
        if let Some(seed) = config.nonce_seed {
            nonce.advance_to(seed);
        }
        Self {
            config,
            signer,
            nonce,
            transport,
        }
    }

    pub fn config(&self) -> &BitfinexConfig {
        &self.config
    }

    pub fn nonce_generator(&self) -> &Arc<NonceGenerator> {
        &self.nonce
    }

    pub(crate) fn set_nonce_generator(&mut self, nonce: Arc<NonceGenerator>) {
        if let Some(seed) = self.config.nonce_seed {
            nonce.advance_to(seed);
        }
        self.nonce = nonce;
    }

    pub(crate) fn set_transport(&mut self, transport: Arc<dyn HttpTransport>) {
        self.transport = transport;
    }

    // =========================================================================
    // Wire
    // =========================================================================

    /// Sign `fields` for `endpoint` and POST it; any HTTP status is `Ok`
    pub async fn send_signed<T: Serialize>(
        &self,
        endpoint: Endpoint,
        fields: &T,
    ) -> ExchangeResult<RawResponse> {
        if !self.config.has_credentials() {
            return Err(ExchangeError::AuthenticationFailed(format!(
                "API key and secret required for {}",
                endpoint
            )));
        }

        let path = endpoint.path();
        let nonce = self.nonce.next();
        let payload = SignedPayload::new(path, nonce, fields);
        let signed = self.signer.sign(&payload)?;
        let url = self.config.url(path);

        tracing::debug!(
            exchange = EXCHANGE_NAME,
            endpoint = path,
            nonce,
            payload = %signed.json,
            "POST {}",
            url
        );

        let raw = self.transport.post(&url, &self.signer.headers(&signed)).await?;

        tracing::debug!(
            exchange = EXCHANGE_NAME,
            endpoint = path,
            status = raw.status,
            bytes = raw.body.len(),
            "Response received"
        );
        Ok(raw)
    }

    /// Unsigned GET; any HTTP status is `Ok`
    pub async fn get_public(&self, endpoint: &PublicEndpoint) -> ExchangeResult<RawResponse> {
        let url = self.config.url(&endpoint.path());
        tracing::debug!(exchange = EXCHANGE_NAME, transport = self.transport.name(), "GET {}", url);

        let raw = self.transport.get(&url).await?;

        tracing::debug!(
            exchange = EXCHANGE_NAME,
            endpoint = %endpoint,
            status = raw.status,
            bytes = raw.body.len(),
            "Response received"
        );
        Ok(raw)
    }

    // =========================================================================
    // Status policy / decoding
    // =========================================================================

    /// 2xx → body; 400 → `Rejected` with the exchange message; else `UnexpectedStatus`
    pub fn check_status(path: &str, raw: RawResponse) -> ExchangeResult<String> {
        if raw.is_success() {
            return Ok(raw.body);
        }

        if raw.status == 400 {
            let message = serde_json::from_str::<ErrorResponse>(&raw.body)
                .map(|e| e.message)
                .unwrap_or_else(|_| raw.body.trim().to_string());
            tracing::error!(
                exchange = EXCHANGE_NAME,
                endpoint = %path,
                status = raw.status,
                message = %message,
                "Bitfinex rejected request"
            );
            return Err(ExchangeError::Rejected {
                status: raw.status,
                message,
            });
        }

        tracing::error!(
            exchange = EXCHANGE_NAME,
            endpoint = %path,
            status = raw.status,
            body = %raw.body,
            "Bitfinex returned unexpected status"
        );
        Err(ExchangeError::UnexpectedStatus {
            status: raw.status,
            body: raw.body,
        })
    }

    /// Parse a 2xx body into `T`
    pub fn decode<T: DeserializeOwned>(path: &str, body: &str) -> ExchangeResult<T> {
        serde_json::from_str(body).map_err(|e| {
            tracing::warn!(
                exchange = EXCHANGE_NAME,
                endpoint = %path,
                error = %e,
                body = %body,
                "Failed to decode response"
            );
            ExchangeError::Decode {
                endpoint: path.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// `send_signed` + `check_status`: the body of a successful signed call
    pub async fn signed_body<T: Serialize>(
        &self,
        endpoint: Endpoint,
        fields: &T,
    ) -> ExchangeResult<String> {
        let raw = self.send_signed(endpoint, fields).await?;
        Self::check_status(endpoint.path(), raw)
    }

    /// `signed_body` + `decode`
    pub async fn signed_json<T: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        fields: &T,
    ) -> ExchangeResult<R> {
        let body = self.signed_body(endpoint, fields).await?;
        Self::decode(endpoint.path(), &body)
    }

    /// `get_public` + `check_status` + `decode`
    pub async fn public_json<R: DeserializeOwned>(
        &self,
        endpoint: &PublicEndpoint,
    ) -> ExchangeResult<R> {
        let path = endpoint.path();
        let raw = self.get_public(endpoint).await?;
        let body = Self::check_status(&path, raw)?;
        Self::decode(&path, &body)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("config", &self.config)
            .field("transport", &self.transport.name())
            .field("last_nonce", &self.nonce.last_issued())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::bitfinex::config::{TEST_API_KEY, TEST_API_SECRET};
    use crate::adapters::bitfinex::signing::{NoFields, SIGNATURE_HEADER, PAYLOAD_HEADER, API_KEY_HEADER};
    use crate::adapters::http::{HttpConfig, ReqwestTransport};
    use mockito::Matcher;

    fn dispatcher_for(base_url: &str) -> Dispatcher {
        let config = BitfinexConfig::new(TEST_API_KEY, TEST_API_SECRET).with_base_url(base_url);
        Dispatcher::new(
            config,
            Arc::new(NonceGenerator::new()),
            Arc::new(ReqwestTransport::new("test", &HttpConfig::default())),
        )
    }

    #[test]
    fn test_nonce_seed_advances_injected_generator() {
        let seed = 9_000_000_000_000_000;
        let config = BitfinexConfig::new(TEST_API_KEY, TEST_API_SECRET).with_nonce_seed(seed);
        let mut dispatcher = Dispatcher::new(
            config,
            Arc::new(NonceGenerator::new()),
            Arc::new(ReqwestTransport::new("test", &HttpConfig::default())),
        );
        assert_eq!(dispatcher.nonce_generator().next(), seed + 1);

        dispatcher.set_nonce_generator(Arc::new(NonceGenerator::new()));
        assert_eq!(dispatcher.nonce_generator().next(), seed + 1);
    }

    #[test]
    fn test_check_status_success_passes_body() {
        let body = Dispatcher::check_status("/v1/balances", RawResponse::new(200, "[]")).unwrap();
        assert_eq!(body, "[]");
    }

    #[test]
    fn test_check_status_400_structured_message() {
        let err = Dispatcher::check_status(
            "/v1/order/new",
            RawResponse::new(400, r#"{"message":"Invalid order: not enough balance"}"#),
        )
        .unwrap_err();
        assert_eq!(
            err.exchange_message(),
            Some("Invalid order: not enough balance")
        );
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_check_status_400_unstructured_body_becomes_message() {
        let err = Dispatcher::check_status("/v1/orders", RawResponse::new(400, "bad request\n"))
            .unwrap_err();
        assert_eq!(err.exchange_message(), Some("bad request"));
    }

    #[test]
    fn test_check_status_other_status_keeps_body() {
        let err = Dispatcher::check_status("/v1/orders", RawResponse::new(500, "oops")).unwrap_err();
        match err {
            ExchangeError::UnexpectedStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "oops");
            }
            other => panic!("Expected UnexpectedStatus, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_error_names_endpoint() {
        let err = Dispatcher::decode::<Vec<u32>>("/v1/balances", "not json").unwrap_err();
        match err {
            ExchangeError::Decode { endpoint, .. } => assert_eq!(endpoint, "/v1/balances"),
            other => panic!("Expected Decode, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_send_signed_posts_auth_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/balances")
            .match_header(API_KEY_HEADER, TEST_API_KEY)
            .match_header(PAYLOAD_HEADER, Matcher::Regex("^[A-Za-z0-9+/]+=*$".into()))
            .match_header(SIGNATURE_HEADER, Matcher::Regex("^[0-9a-f]{96}$".into()))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let dispatcher = dispatcher_for(&server.url());
        let raw = dispatcher.send_signed(Endpoint::Balances, &NoFields {}).await.unwrap();

        assert_eq!(raw.status, 200);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_signed_body_invalid_nonce_rejected() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/orders")
            .with_status(400)
            .with_body(r#"{"message":"Nonce is too small."}"#)
            .create_async()
            .await;

        let dispatcher = dispatcher_for(&server.url());
        let err = dispatcher.signed_body(Endpoint::ActiveOrders, &NoFields {}).await.unwrap_err();
        assert_eq!(err.exchange_message(), Some("Nonce is too small."));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_network() {
        // Unroutable base URL: reaching the transport would surface a connection error
        let config = BitfinexConfig::public("http://127.0.0.1:1");
        let dispatcher = Dispatcher::new(
            config,
            Arc::new(NonceGenerator::new()),
            Arc::new(ReqwestTransport::new("test", &HttpConfig::default())),
        );
        let err = dispatcher.send_signed(Endpoint::Balances, &NoFields {}).await.unwrap_err();
        assert!(matches!(err, ExchangeError::AuthenticationFailed(_)), "Got: {}", err);
    }

    #[tokio::test]
    async fn test_public_json_get() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/stats/btcusd")
            .with_status(200)
            .with_body(r#"[{"period":1,"volume":"7967.96766158"}]"#)
            .create_async()
            .await;

        let dispatcher = dispatcher_for(&server.url());
        let stats: Vec<serde_json::Value> = dispatcher
            .public_json(&PublicEndpoint::stats("BTCUSD").unwrap())
            .await
            .unwrap();
        assert_eq!(stats[0]["period"], 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_nonce_increases_between_calls() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/balances")
            .with_status(200)
            .with_body("[]")
            .expect(2)
            .create_async()
            .await;

        let dispatcher = dispatcher_for(&server.url());
        dispatcher.send_signed(Endpoint::Balances, &NoFields {}).await.unwrap();
        let first = dispatcher.nonce_generator().last_issued();
        dispatcher.send_signed(Endpoint::Balances, &NoFields {}).await.unwrap();
        assert!(dispatcher.nonce_generator().last_issued() > first);
    }
}
