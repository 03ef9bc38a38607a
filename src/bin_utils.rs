//! Shared bootstrap utilities for binary entry points
//!
//! Used by the `bitfinex_api` market snapshot and `test_bitfinex_account`.

use std::path::Path;

use tracing::{info, warn};

use crate::adapters::bitfinex::BitfinexClient;
use crate::config::{self, AppConfig};
use crate::error::AppError;

/// Default configuration file, relative to the working directory
pub const CONFIG_PATH: &str = "config.yaml";

/// Initialize dotenv and logging only (no config.yaml needed).
pub fn boot_minimal() {
    dotenvy::dotenv().ok();
    config::init_logging();
}

/// Initialize dotenv and logging, then load `path`.
///
/// A missing file falls back to `AppConfig::default()`; a file that exists
/// but does not parse or validate is an error.
pub fn boot(path: &Path) -> Result<AppConfig, AppError> {
    boot_minimal();

    if !path.exists() {
        warn!(
            phase = "init",
            path = %path.display(),
            "Config file not found, using defaults"
        );
        return Ok(AppConfig::default());
    }

    let cfg = config::load_config(path)?;
    info!(
        phase = "init",
        path = %path.display(),
        base_url = %cfg.base_url,
        pairs = cfg.pairs.len(),
        "Configuration loaded"
    );
    Ok(cfg)
}

/// Public-only client for the configured base URL and timeouts
pub fn public_client(cfg: &AppConfig) -> BitfinexClient {
    BitfinexClient::new(cfg.bitfinex_config())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_boot_missing_file_uses_defaults() {
        let cfg = boot(Path::new("/nonexistent/bitfinex/config.yaml")).unwrap();
        assert_eq!(cfg.pairs, AppConfig::default().pairs);
    }

    #[test]
    fn test_boot_invalid_file_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"pairs: []").unwrap();
        file.flush().unwrap();
        assert!(matches!(boot(file.path()), Err(AppError::Config(_))));
    }

    #[test]
    fn test_public_client_uses_config_url() {
        let cfg = AppConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..AppConfig::default()
        };
        let client = public_client(&cfg);
        assert_eq!(client.config().base_url, "http://127.0.0.1:9");
        assert!(!client.config().has_credentials());
    }
}
