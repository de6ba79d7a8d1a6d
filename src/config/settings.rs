//! Environment-sourced gate settings.
//!
//! Settings are read once at startup and never mutated afterwards. Values are
//! taken verbatim from the environment (or a `.env` file loaded by the binary);
//! validation of the policy part happens when a [`Policy`](crate::gate::Policy)
//! is built from them.

use std::time::Duration;

use log::warn;

use crate::config::constants::*;

/// Raw gate configuration as loaded from the environment.
///
/// # Examples
///
/// ```no_run
/// use egress_gate::config::GateSettings;
///
/// let settings = GateSettings {
///     allowed_countries: vec!["US".into(), "CA".into()],
///     max_reputation_score: 20,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Master switch; when false every evaluation passes without network calls
    pub enabled: bool,
    /// Country codes allowed to operate from (upper-case ISO-3166 alpha-2)
    pub allowed_countries: Vec<String>,
    /// Case-insensitive substrings that mark an ISP as unacceptable
    pub blocked_isp_keywords: Vec<String>,
    /// Connection types allowed when non-empty
    pub allowed_connection_types: Vec<String>,
    /// Connection types always rejected
    pub blocked_connection_types: Vec<String>,
    /// Highest acceptable reputation score; kept signed so bad input reaches validation
    pub max_reputation_score: i64,
    /// Primary geolocation endpoint
    pub ip_api_url: String,
    /// Secondary geolocation endpoint
    pub ipinfo_url: String,
    /// Optional token for the secondary geolocation endpoint
    pub ipinfo_token: Option<String>,
    /// Reputation URL template containing `{ip}`
    pub reputation_url: String,
    /// Per-request timeout for signal fetches
    pub signal_timeout: Duration,
    /// Interval between evaluations in watch mode
    pub check_interval: Duration,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_countries: to_owned_list(DEFAULT_SAFE_COUNTRY_CODES),
            blocked_isp_keywords: to_owned_list(DEFAULT_DANGEROUS_ISP_KEYWORDS),
            allowed_connection_types: to_owned_list(DEFAULT_ALLOWED_CONNECTION_TYPES),
            blocked_connection_types: to_owned_list(DEFAULT_BLOCKED_CONNECTION_TYPES),
            max_reputation_score: i64::from(DEFAULT_MAX_REPUTATION_SCORE),
            ip_api_url: DEFAULT_IP_API_URL.to_string(),
            ipinfo_url: DEFAULT_IPINFO_URL.to_string(),
            ipinfo_token: None,
            reputation_url: DEFAULT_REPUTATION_URL.to_string(),
            signal_timeout: Duration::from_secs(DEFAULT_SIGNAL_TIMEOUT_SECS),
            check_interval: Duration::from_secs(DEFAULT_CHECK_INTERVAL_SECS),
        }
    }
}

impl GateSettings {
    /// Loads settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads settings through an arbitrary key lookup.
    ///
    /// Missing, empty or unparseable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| clean_env_value(lookup(key).as_deref());

        let enabled = match get("IP_CHECK_ENABLED") {
            text if text.is_empty() => defaults.enabled,
            text => text.eq_ignore_ascii_case("true"),
        };

        let ipinfo_token = Some(get("IPINFO_TOKEN")).filter(|t| !t.is_empty());

        Self {
            enabled,
            allowed_countries: env_csv(&get("SAFE_COUNTRY_CODES"), DEFAULT_SAFE_COUNTRY_CODES)
                .into_iter()
                .map(|c| c.to_uppercase())
                .collect(),
            blocked_isp_keywords: env_csv(
                &get("DANGEROUS_ISP_KEYWORDS"),
                DEFAULT_DANGEROUS_ISP_KEYWORDS,
            ),
            allowed_connection_types: env_csv(
                &get("IPINFO_ALLOWED_TYPES"),
                DEFAULT_ALLOWED_CONNECTION_TYPES,
            ),
            blocked_connection_types: env_csv(
                &get("IPINFO_BLOCKED_TYPES"),
                DEFAULT_BLOCKED_CONNECTION_TYPES,
            ),
            max_reputation_score: env_int(
                "IP_SCAMALYTICS_MAX_SCORE",
                &get("IP_SCAMALYTICS_MAX_SCORE"),
                defaults.max_reputation_score,
            ),
            ip_api_url: non_empty_or(get("IP_API_URL"), defaults.ip_api_url),
            ipinfo_url: non_empty_or(get("IPINFO_URL"), defaults.ipinfo_url),
            ipinfo_token,
            reputation_url: non_empty_or(get("IP_REPUTATION_URL"), defaults.reputation_url),
            signal_timeout: env_secs("IP_API_TIMEOUT", &get("IP_API_TIMEOUT"), defaults.signal_timeout),
            check_interval: env_secs(
                "IP_CHECK_INTERVAL_SEC",
                &get("IP_CHECK_INTERVAL_SEC"),
                defaults.check_interval,
            ),
        }
    }
}

/// Trims a raw value and strips one pair of matching surrounding quotes.
///
/// `.env` files often carry `KEY='value'` or `KEY="value"`.
pub fn clean_env_value(value: Option<&str>) -> String {
    let Some(value) = value else {
        return String::new();
    };
    let text = value.trim();
    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));
    if quoted {
        text[1..text.len() - 1].trim().to_string()
    } else {
        text.to_string()
    }
}

fn env_csv(text: &str, default: &[&str]) -> Vec<String> {
    if text.is_empty() {
        return to_owned_list(default);
    }
    text.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_int(key: &str, text: &str, default: i64) -> i64 {
    if text.is_empty() {
        return default;
    }
    match text.parse::<i64>() {
        Ok(value) => value,
        Err(e) => {
            warn!("Ignoring {}={:?} ({}), using default {}", key, text, e, default);
            default
        }
    }
}

fn env_secs(key: &str, text: &str, default: Duration) -> Duration {
    match env_int(key, text, default.as_secs() as i64) {
        secs if secs > 0 => Duration::from_secs(secs as u64),
        secs => {
            warn!(
                "Ignoring {}={} (must be positive), using default {}s",
                key,
                secs,
                default.as_secs()
            );
            default
        }
    }
}

fn non_empty_or(value: String, default: String) -> String {
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
