//! Application-wide error types using thiserror
//!
//! Library calls return `ExchangeResult`; binaries and config loading wrap
//! those in `AppError`.

use thiserror::Error;
use crate::adapters::errors::ExchangeError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_error_converts() {
        let err: AppError = ExchangeError::NetworkTimeout(250).into();
        assert_eq!(err.to_string(), "Exchange error: Network timeout after 250ms");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: AppError = io.into();
        assert!(matches!(err, AppError::Io(_)));
    }
}
