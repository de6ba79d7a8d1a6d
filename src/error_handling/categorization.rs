//! Retry classification and backoff schedule.
//!
//! This module decides which failures the transport retries and how long it
//! waits between attempts.

use std::time::Duration;

use reqwest::{Method, StatusCode};

use crate::config::{RETRY_MAX_BACKOFF, RETRY_METHODS, RETRY_STATUS_CODES};

/// Creates the exponential backoff schedule for a session.
///
/// Yields one delay per retry: `backoff_factor * 2^(n-1)` seconds before retry
/// `n`, capped at `RETRY_MAX_BACKOFF`. The iterator length is the retry budget,
/// so it can be handed to `tokio_retry::RetryIf` directly.
pub fn backoff_schedule(retries: u32, backoff_factor: f64) -> impl Iterator<Item = Duration> {
    // NaN.max(0.0) is 0.0, so garbage factors degrade to immediate retries
    let factor = backoff_factor.max(0.0);
    (0..retries).map(move |n| {
        let secs = factor * 2f64.powi(n.min(62) as i32);
        Duration::try_from_secs_f64(secs)
            .unwrap_or(RETRY_MAX_BACKOFF)
            .min(RETRY_MAX_BACKOFF)
    })
}

/// Whether requests with this method may be retried at all.
pub fn is_retryable_method(method: &Method) -> bool {
    RETRY_METHODS.contains(&method.as_str())
}

/// Whether a response status should trigger a retry.
pub fn is_retryable_status(status: StatusCode) -> bool {
    RETRY_STATUS_CODES.contains(&status.as_u16())
}

/// Whether a request error is transient (worth another attempt).
///
/// Connection failures and timeouts are; builder, redirect, body and decode
/// errors are permanent.
pub fn is_transient_error(error: &reqwest::Error) -> bool {
    if error.is_builder() || error.is_redirect() || error.is_decode() || error.is_body() {
        return false;
    }
    error.is_connect() || error.is_timeout()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule_doubles() {
        let delays: Vec<Duration> = backoff_schedule(3, 0.5).collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_millis(500),
                Duration::from_millis(1000),
                Duration::from_millis(2000)
            ]
        );
    }

    #[test]
    fn test_backoff_schedule_length_is_retry_budget() {
        assert_eq!(backoff_schedule(0, 0.5).count(), 0);
        assert_eq!(backoff_schedule(5, 0.5).count(), 5);
    }

    #[test]
    fn test_backoff_schedule_zero_and_invalid_factor() {
        assert!(backoff_schedule(3, 0.0).all(|d| d.is_zero()));
        assert!(backoff_schedule(3, -1.0).all(|d| d.is_zero()));
        assert!(backoff_schedule(3, f64::NAN).all(|d| d.is_zero()));
    }

    #[test]
    fn test_backoff_schedule_is_capped() {
        let last = backoff_schedule(100, 0.5).last().unwrap();
        assert_eq!(last, RETRY_MAX_BACKOFF);
    }

    #[test]
    fn test_retryable_methods() {
        assert!(is_retryable_method(&Method::GET));
        assert!(is_retryable_method(&Method::HEAD));
        assert!(is_retryable_method(&Method::OPTIONS));
        assert!(is_retryable_method(&Method::POST));
        assert!(!is_retryable_method(&Method::PUT));
        assert!(!is_retryable_method(&Method::DELETE));
        assert!(!is_retryable_method(&Method::PATCH));
    }

    #[test]
    fn test_retryable_statuses() {
        for code in [429u16, 500, 502, 503, 504] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(is_retryable_status(status), "{} should be retried", code);
        }
        for code in [200u16, 301, 400, 401, 403, 404, 501] {
            let status = StatusCode::from_u16(code).unwrap();
            assert!(!is_retryable_status(status), "{} should not be retried", code);
        }
    }
}
