//! Bitfinex Signing
//!
//! Authenticated v1 requests carry their whole payload in headers:
//! 1. serialize `{request, nonce, ..fields}` to JSON
//! 2. base64-encode the JSON bytes → `X-BFX-PAYLOAD`
//! 3. HMAC-SHA384(secret, payload_b64) as lowercase hex → `X-BFX-SIGNATURE`

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use serde::Serialize;
use sha2::Sha384;

use crate::adapters::errors::{ExchangeError, ExchangeResult};

type HmacSha384 = Hmac<Sha384>;

pub const API_KEY_HEADER: &str = "X-BFX-APIKEY";
pub const PAYLOAD_HEADER: &str = "X-BFX-PAYLOAD";
pub const SIGNATURE_HEADER: &str = "X-BFX-SIGNATURE";

/// Hex length of an HMAC-SHA384 digest (48 bytes)
pub const SIGNATURE_HEX_LEN: usize = 96;

// =============================================================================
// Envelope
// =============================================================================

/// Signed request envelope: path echo and nonce first, then operation fields
#[derive(Debug, Serialize)]
pub struct SignedPayload<'a, T: Serialize> {
    pub request: &'a str,
    pub nonce: String,
    #[serde(flatten)]
    pub fields: &'a T,
}

impl<'a, T: Serialize> SignedPayload<'a, T> {
    pub fn new(request: &'a str, nonce: u64, fields: &'a T) -> Self {
        Self {
            request,
            nonce: nonce.to_string(),
            fields,
        }
    }
}

/// Operation without extra fields (balances, active orders, ...)
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct NoFields {}

/// Output of signing one envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// JSON text that was encoded, kept for logging
    pub json: String,
    pub payload_b64: String,
    pub signature: String,
}

// =============================================================================
// Signer
// =============================================================================

/// HMAC-SHA384 signer bound to one key pair
#[derive(Clone)]
pub struct Signer {
    api_key: String,
    api_secret: String,
}

impl Signer {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        }
    }

    /// Serialize and sign an envelope
    pub fn sign<T: Serialize>(&self, payload: &T) -> ExchangeResult<SignedRequest> {
        let json = serde_json::to_string(payload).map_err(|e| {
            ExchangeError::InvalidRequest(format!("Payload serialization failed: {}", e))
        })?;
        let payload_b64 = BASE64.encode(json.as_bytes());
        let signature = hmac_sha384_hex(self.api_secret.as_bytes(), payload_b64.as_bytes())?;
        Ok(SignedRequest {
            json,
            payload_b64,
            signature,
        })
    }

    /// The three authentication headers for a signed request
    pub fn headers(&self, signed: &SignedRequest) -> Vec<(&'static str, String)> {
        vec![
            (API_KEY_HEADER, self.api_key.clone()),
            (PAYLOAD_HEADER, signed.payload_b64.clone()),
            (SIGNATURE_HEADER, signed.signature.clone()),
        ]
    }
}

impl std::fmt::Debug for Signer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signer")
            .field("api_key", &self.api_key.chars().take(4).collect::<String>())
            .finish_non_exhaustive()
    }
}

/// Lowercase hex HMAC-SHA384 of `message` under `secret`
pub fn hmac_sha384_hex(secret: &[u8], message: &[u8]) -> ExchangeResult<String> {
    let mut mac = HmacSha384::new_from_slice(secret)
        .map_err(|e| ExchangeError::AuthenticationFailed(format!("Invalid HMAC key: {}", e)))?;
    mac.update(message);
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Decode an `X-BFX-PAYLOAD` header back to its JSON value
pub fn decode_payload(payload_b64: &str) -> ExchangeResult<serde_json::Value> {
    let bytes = BASE64
        .decode(payload_b64)
        .map_err(|e| ExchangeError::InvalidRequest(format!("Payload is not base64: {}", e)))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ExchangeError::InvalidRequest(format!("Payload is not JSON: {}", e)))
}
