//! Configuration types for the market snapshot binary and client setup
//!
//! `AppConfig` is loaded from YAML; credentials never live here, they come
//! from the environment (see `BitfinexConfig::from_env`).

use serde::{Deserialize, Serialize};

use crate::adapters::bitfinex::{BitfinexConfig, Pair, DEFAULT_BASE_URL};
use crate::adapters::http::HttpConfig;
use crate::error::AppError;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Root application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// REST origin, overridable for testnets and local mocks
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// HTTP timeouts
    #[serde(default)]
    pub http: HttpConfig,
    /// Pairs to report on
    pub pairs: Vec<Pair>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            http: HttpConfig::default(),
            pairs: vec![Pair::BtcUsd],
        }
    }
}

impl AppConfig {
    /// Validate all configuration rules
    pub fn validate(&self) -> Result<(), AppError> {
        // Rule: base_url must be an http(s) origin
        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(AppError::Config(format!(
                "base_url must start with http:// or https:// (got '{}')",
                self.base_url
            )));
        }

        // Rule: timeouts must be positive
        if self.http.timeout_ms == 0 || self.http.connect_timeout_ms == 0 {
            return Err(AppError::Config(format!(
                "http timeouts must be > 0 (got timeout_ms={}, connect_timeout_ms={})",
                self.http.timeout_ms, self.http.connect_timeout_ms
            )));
        }

        // Rule: At least one pair must be configured
        if self.pairs.is_empty() {
            return Err(AppError::Config(
                "Configuration must contain at least one pair".to_string(),
            ));
        }

        // Rule: No duplicate pairs
        let mut seen = std::collections::HashSet::new();
        for pair in &self.pairs {
            if !seen.insert(pair) {
                return Err(AppError::Config(format!("Duplicate pair: '{}'", pair)));
            }
        }

        Ok(())
    }

    /// Client configuration carrying this file's URL and timeouts
    ///
    /// Credentials are left empty; fill them with `BitfinexConfig::from_env`
    /// or use the result for public calls only.
    pub fn bitfinex_config(&self) -> BitfinexConfig {
        BitfinexConfig::public(self.base_url.clone()).with_http(self.http)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> AppConfig {
        AppConfig {
            base_url: "https://api.bitfinex.com".to_string(),
            http: HttpConfig::default(),
            pairs: vec![Pair::BtcUsd, Pair::EthUsd],
        }
    }

    #[test]
    fn test_valid_config() {
        assert!(valid().validate().is_ok());
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_scheme() {
        let config = AppConfig {
            base_url: "ftp://api.bitfinex.com".to_string(),
            ..valid()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("base_url"));
    }

    #[test]
    fn test_zero_timeout() {
        let config = AppConfig {
            http: HttpConfig {
                timeout_ms: 0,
                connect_timeout_ms: 100,
            },
            ..valid()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_and_duplicate_pairs() {
        let empty = AppConfig {
            pairs: vec![],
            ..valid()
        };
        assert!(empty.validate().unwrap_err().to_string().contains("at least one pair"));

        let duplicate = AppConfig {
            pairs: vec![Pair::BtcUsd, Pair::BtcUsd],
            ..valid()
        };
        assert!(duplicate.validate().unwrap_err().to_string().contains("Duplicate pair: 'btcusd'"));
    }

    #[test]
    fn test_bitfinex_config_has_no_credentials() {
        let config = AppConfig {
            base_url: "http://localhost:8080/".to_string(),
            ..valid()
        };
        let bfx = config.bitfinex_config();
        assert_eq!(bfx.base_url, "http://localhost:8080");
        assert!(!bfx.has_credentials());
    }
}
