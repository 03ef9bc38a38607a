//! Exchange adapter error types
//!
//! Every network-touching operation returns `ExchangeResult<T>`, so callers
//! can tell a dead connection from an exchange rejection from a body that
//! did not decode.

use thiserror::Error;

/// Exchange-specific error types for adapter operations
#[derive(Error, Debug)]
pub enum ExchangeError {
    /// Connection to exchange failed (DNS, refused, TLS, reset)
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Network operation timed out
    #[error("Network timeout after {0}ms")]
    NetworkTimeout(u64),

    /// Credentials missing or unusable
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Exchange answered 400 with a structured `{"message": ...}` body
    #[error("Exchange rejected request ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Any other non-2xx status, body kept verbatim
    #[error("Unexpected HTTP status {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// 2xx response whose body did not match the expected shape
    #[error("Invalid response from {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// Request could not be built from the caller's arguments
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ExchangeError {
    /// True when the request never got an HTTP answer
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ExchangeError::ConnectionFailed(_) | ExchangeError::NetworkTimeout(_)
        )
    }

    /// Message reported by the exchange, if it sent one
    pub fn exchange_message(&self) -> Option<&str> {
        match self {
            ExchangeError::Rejected { message, .. } => Some(message),
            _ => None,
        }
    }

    /// HTTP status attached to the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ExchangeError::Rejected { status, .. }
            | ExchangeError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for exchange operations
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
