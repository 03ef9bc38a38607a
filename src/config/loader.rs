//! Configuration loader for YAML files

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::error::AppError;

use super::types::AppConfig;

/// Load configuration from a YAML file
///
/// This function:
/// 1. Checks if the file exists
/// 2. Parses the YAML content
/// 3. Validates the configuration rules
///
/// # Example
/// ```ignore
/// use std::path::Path;
/// use bitfinex_api::config::load_config;
///
/// let config = load_config(Path::new("config.yaml"))?;
/// ```
pub fn load_config(path: &Path) -> Result<AppConfig, AppError> {
    if !path.exists() {
        return Err(AppError::Config(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let config: AppConfig = serde_yaml::from_reader(reader).map_err(|e| {
        AppError::Config(format!(
            "YAML parse error in '{}': {}",
            path.display(),
            e
        ))
    })?;

    config.validate()?;

    Ok(config)
}

/// Load configuration from a YAML string (useful for testing)
pub fn load_config_from_str(yaml_content: &str) -> Result<AppConfig, AppError> {
    let config: AppConfig = serde_yaml::from_str(yaml_content).map_err(|e| {
        AppError::Config(format!("YAML parse error: {}", e))
    })?;

    config.validate()?;

    Ok(config)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::bitfinex::{Pair, DEFAULT_BASE_URL};
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG_YAML: &str = r#"
base_url: https://api.bitfinex.com
http:
  timeout_ms: 5000
  connect_timeout_ms: 1500
pairs:
  - btcusd
  - ethusd
"#;

    #[test]
    fn test_load_config_from_str_valid() {
        let config = load_config_from_str(VALID_CONFIG_YAML).unwrap();
        assert_eq!(config.pairs, vec![Pair::BtcUsd, Pair::EthUsd]);
        assert_eq!(config.http.timeout_ms, 5000);
        assert_eq!(config.http.connect_timeout_ms, 1500);
    }

    #[test]
    fn test_defaults_applied() {
        let config = load_config_from_str("pairs: [ltcbtc]").unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.http.timeout_ms, crate::adapters::http::DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_load_config_from_str_invalid_yaml() {
        let result = load_config_from_str("invalid: yaml: content: [");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }

    #[test]
    fn test_unknown_pair_rejected() {
        let result = load_config_from_str("pairs: [dogeusd]");
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }

    #[test]
    fn test_load_config_from_str_validation_failure() {
        let result = load_config_from_str("pairs: [btcusd, btcusd]");
        assert!(result.unwrap_err().to_string().contains("Duplicate pair"));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config(Path::new("/nonexistent/path/config.yaml"));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Configuration file not found"));
    }

    #[test]
    fn test_load_config_from_file_valid() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(VALID_CONFIG_YAML.as_bytes()).unwrap();
        temp_file.flush().unwrap();

        let config = load_config(temp_file.path()).unwrap();
        assert_eq!(config.pairs.len(), 2);
    }

    #[test]
    fn test_load_config_from_file_invalid_yaml() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"invalid: [yaml: content").unwrap();
        temp_file.flush().unwrap();

        let result = load_config(temp_file.path());
        assert!(result.unwrap_err().to_string().contains("YAML parse error"));
    }
}
