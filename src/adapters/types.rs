//! Core data types shared by the HTTP transport and the exchange client

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

// =============================================================================
// Raw HTTP Response
// =============================================================================

/// Status code and body text of a completed HTTP exchange
///
/// No status interpretation happens at this level; see
/// `Dispatcher::check_status` for the error policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

// =============================================================================
// Timestamp Helpers
// =============================================================================

/// Current wall-clock time in microseconds since the Unix epoch
/// Returns 0 if system time is before Unix epoch (should never happen)
pub fn current_time_micros() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

/// Seconds since the Unix epoch as a float, the format Bitfinex uses for
/// `since`/`until`/`timestamp` request fields
pub fn unix_timestamp_secs(dt: DateTime<Utc>) -> f64 {
    dt.timestamp() as f64 + f64::from(dt.timestamp_subsec_micros()) / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_raw_response_success_range() {
        assert!(RawResponse::new(200, "[]").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(400, "{}").is_success());
        assert!(!RawResponse::new(302, "").is_success());
    }

    #[test]
    fn test_current_time_micros() {
        let micros = current_time_micros();
        assert!(micros > 1_700_000_000_000_000); // after 2023
        assert!(current_time_micros() >= micros);
    }

    #[test]
    fn test_unix_timestamp_secs() {
        let dt = Utc.with_ymd_and_hms(2015, 10, 8, 0, 0, 0).unwrap();
        assert_eq!(unix_timestamp_secs(dt), 1_444_262_400.0);

        let with_fraction = dt + chrono::Duration::milliseconds(500);
        assert!((unix_timestamp_secs(with_fraction) - 1_444_262_400.5).abs() < 1e-6);
    }
}
