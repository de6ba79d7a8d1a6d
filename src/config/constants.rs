//! Configuration constants.
//!
//! This module defines the defaults used when the environment does not
//! override them: service endpoints, policy lists, timeouts and the retry
//! parameters of the transport.

use std::time::Duration;

// Signal services
/// Primary geolocation service (ip-api response shape)
pub const DEFAULT_IP_API_URL: &str = "http://ip-api.com/json";
/// Secondary geolocation service (ipinfo response shape)
pub const DEFAULT_IPINFO_URL: &str = "https://ipinfo.io/json";
/// Reputation service URL template; `{ip}` is replaced with the resolved address
pub const DEFAULT_REPUTATION_URL: &str = "https://scamalytics.com/ip/{ip}";
/// Placeholder substituted in the reputation URL template
pub const REPUTATION_URL_PLACEHOLDER: &str = "{ip}";

/// Per-request timeout for signal fetches in seconds
pub const DEFAULT_SIGNAL_TIMEOUT_SECS: u64 = 5;
/// Interval between evaluations in watch mode
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 300;

// Policy defaults
pub const DEFAULT_SAFE_COUNTRY_CODES: &[&str] = &["US"];
pub const DEFAULT_DANGEROUS_ISP_KEYWORDS: &[&str] =
    &["Google", "Amazon", "Microsoft", "Datacenter", "Cloud"];
pub const DEFAULT_ALLOWED_CONNECTION_TYPES: &[&str] = &["ISP", "Residential"];
pub const DEFAULT_BLOCKED_CONNECTION_TYPES: &[&str] = &["Hosting", "Business"];
/// Highest reputation score still considered acceptable (0-100, higher = worse)
pub const DEFAULT_MAX_REPUTATION_SCORE: u8 = 30;
/// Upper bound of the reputation scale
pub const MAX_REPUTATION_SCALE: u8 = 100;

// Sentinels for absent geolocation fields
pub const UNKNOWN_COUNTRY_CODE: &str = "XX";
pub const UNKNOWN_ISP: &str = "Unknown";
pub const UNKNOWN_CITY: &str = "Unknown";

// Retry strategy
/// Number of retries after the initial attempt
pub const DEFAULT_RETRIES: u32 = 3;
/// Base of the exponential backoff schedule in seconds
pub const DEFAULT_BACKOFF_FACTOR: f64 = 0.5;
/// Longest single wait between retries
pub const RETRY_MAX_BACKOFF: Duration = Duration::from_secs(120);
/// Request timeout applied by `request_with_retry` when the caller gives none
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
/// HTTP statuses that are retried for retryable methods
pub const RETRY_STATUS_CODES: &[u16] = &[429, 500, 502, 503, 504];
/// Methods that are retried on transient failure
pub const RETRY_METHODS: &[&str] = &["HEAD", "GET", "OPTIONS", "POST"];

// Maximum response body size in bytes (1MB)
// Signal payloads are small; anything larger is treated as malformed
pub const MAX_SIGNAL_BODY_SIZE: usize = 1024 * 1024;
