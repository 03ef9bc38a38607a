//! Bitfinex Configuration
//!
//! Credentials, base URL and HTTP timeouts, with environment loading.

use std::fmt;

use crate::adapters::errors::{ExchangeError, ExchangeResult};
use crate::adapters::http::HttpConfig;

/// Production REST origin
pub const DEFAULT_BASE_URL: &str = "https://api.bitfinex.com";

// =============================================================================
// Test Constants (fixture credentials, not a real account)
// =============================================================================

#[cfg(test)]
pub const TEST_API_KEY: &str = "test_key";

#[cfg(test)]
pub const TEST_API_SECRET: &str = "test_secret";

// =============================================================================
// Configuration
// =============================================================================

/// Configuration for a Bitfinex client instance
#[derive(Clone)]
pub struct BitfinexConfig {
    /// Public key identifier, sent as `X-BFX-APIKEY`
    pub api_key: String,
    /// HMAC secret, never sent over the wire
    pub api_secret: String,
    /// REST origin without trailing slash
    pub base_url: String,
    pub http: HttpConfig,
    /// Floor for issued nonces, for keys that already saw larger values
    pub nonce_seed: Option<u64>,
}

impl BitfinexConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            ..Default::default()
        }
    }

    /// Credential-less configuration for public market data only
    pub fn public(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_http(mut self, http: HttpConfig) -> Self {
        self.http = http;
        self
    }

    pub fn with_nonce_seed(mut self, seed: u64) -> Self {
        self.nonce_seed = Some(seed);
        self
    }

    /// Create configuration from environment variables
    ///
    /// Required: `BITFINEX_API_KEY`, `BITFINEX_API_SECRET`.
    /// Optional: `BITFINEX_BASE_URL`, `BITFINEX_TIMEOUT_MS`, `BITFINEX_NONCE_SEED`.
    ///
    /// Nonces are wall-clock microseconds. A key that was previously used by a
    /// client issuing larger nonces (e.g. milliseconds scaled by 1e6, roughly
    /// 1000x today's microseconds) rejects them with "Nonce is too small." until
    /// `BITFINEX_NONCE_SEED` is set to at least the largest nonce it accepted.
    pub fn from_env() -> ExchangeResult<Self> {
        let api_key = std::env::var("BITFINEX_API_KEY")
            .map_err(|_| ExchangeError::AuthenticationFailed("BITFINEX_API_KEY not set".into()))?;
        if api_key.is_empty() {
            return Err(ExchangeError::AuthenticationFailed("BITFINEX_API_KEY is empty".into()));
        }

        let api_secret = std::env::var("BITFINEX_API_SECRET").map_err(|_| {
            ExchangeError::AuthenticationFailed("BITFINEX_API_SECRET not set".into())
        })?;
        if api_secret.is_empty() {
            return Err(ExchangeError::AuthenticationFailed(
                "BITFINEX_API_SECRET is empty".into(),
            ));
        }

        let base_url = std::env::var("BITFINEX_BASE_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut http = HttpConfig::default();
        if let Some(timeout_ms) = std::env::var("BITFINEX_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
        {
            http.timeout_ms = timeout_ms;
        }

        let nonce_seed = match std::env::var("BITFINEX_NONCE_SEED") {
            Ok(v) if !v.trim().is_empty() => Some(v.trim().parse::<u64>().map_err(|_| {
                ExchangeError::InvalidRequest(format!("BITFINEX_NONCE_SEED is not a valid u64: {}", v))
            })?),
            _ => None,
        };

        Ok(Self {
            nonce_seed,
            ..Self::new(api_key, api_secret)
                .with_base_url(base_url)
                .with_http(http)
        })
    }

    /// True when both key and secret are present
    pub fn has_credentials(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }

    /// Short, log-safe form of the API key
    pub fn key_hint(&self) -> String {
        let prefix: String = self.api_key.chars().take(4).collect();
        if prefix.is_empty() {
            "<none>".to_string()
        } else {
            format!("{}…", prefix)
        }
    }

    /// Full URL for a path starting with `/`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for BitfinexConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: HttpConfig::default(),
            nonce_seed: None,
        }
    }
}

impl fmt::Debug for BitfinexConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitfinexConfig")
            .field("api_key", &self.key_hint())
            .field("api_secret", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("http", &self.http)
            .field("nonce_seed", &self.nonce_seed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_bitfinex_env() {
        std::env::remove_var("BITFINEX_API_KEY");
        std::env::remove_var("BITFINEX_API_SECRET");
        std::env::remove_var("BITFINEX_BASE_URL");
        std::env::remove_var("BITFINEX_TIMEOUT_MS");
        std::env::remove_var("BITFINEX_NONCE_SEED");
    }

    #[test]
    fn test_default_config() {
        let config = BitfinexConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(!config.has_credentials());
        assert_eq!(config.key_hint(), "<none>");
    }

    #[test]
    fn test_url_join_strips_trailing_slash() {
        let config = BitfinexConfig::public("http://localhost:1234/");
        assert_eq!(config.url("/v1/balances"), "http://localhost:1234/v1/balances");
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = BitfinexConfig::new("abcdefgh", "super-secret-value");
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret-value"), "Got: {}", debug);
        assert!(!debug.contains("abcdefgh"), "Got: {}", debug);
        assert!(debug.contains("abcd"));
    }

    #[test]
    #[serial(env)]
    fn test_from_env_missing_key() {
        clear_bitfinex_env();
        let result = BitfinexConfig::from_env();
        assert!(matches!(result, Err(ExchangeError::AuthenticationFailed(_))));
    }

    #[test]
    #[serial(env)]
    fn test_from_env_empty_secret() {
        clear_bitfinex_env();
        std::env::set_var("BITFINEX_API_KEY", "key");
        std::env::set_var("BITFINEX_API_SECRET", "");
        let err = BitfinexConfig::from_env().unwrap_err();
        assert!(err.to_string().contains("BITFINEX_API_SECRET is empty"));
        clear_bitfinex_env();
    }

    #[test]
    #[serial(env)]
    fn test_from_env_full() {
        clear_bitfinex_env();
        std::env::set_var("BITFINEX_API_KEY", "key");
        std::env::set_var("BITFINEX_API_SECRET", "secret");
        std::env::set_var("BITFINEX_BASE_URL", "http://127.0.0.1:9000/");
        std::env::set_var("BITFINEX_TIMEOUT_MS", "1500");

        let config = BitfinexConfig::from_env().unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.api_secret, "secret");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.http.timeout_ms, 1500);
        assert_eq!(config.nonce_seed, None);

        clear_bitfinex_env();
    }

    #[test]
    #[serial(env)]
    fn test_from_env_nonce_seed() {
        clear_bitfinex_env();
        std::env::set_var("BITFINEX_API_KEY", "key");
        std::env::set_var("BITFINEX_API_SECRET", "secret");
        std::env::set_var("BITFINEX_NONCE_SEED", "1700000000000000000");

        let config = BitfinexConfig::from_env().unwrap();
        assert_eq!(config.nonce_seed, Some(1_700_000_000_000_000_000));

        std::env::set_var("BITFINEX_NONCE_SEED", "not-a-number");
        let err = BitfinexConfig::from_env().unwrap_err();
        assert!(matches!(err, ExchangeError::InvalidRequest(_)));
        assert!(err.to_string().contains("BITFINEX_NONCE_SEED"));

        clear_bitfinex_env();
    }
}
