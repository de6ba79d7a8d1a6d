//! Signal and verdict types.

use serde::Serialize;

use crate::config::{UNKNOWN_CITY, UNKNOWN_COUNTRY_CODE, UNKNOWN_ISP};
use crate::error_handling::{FailureKind, SignalError};

/// Result of a geolocation/ISP lookup for the current egress address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeoSignal {
    /// ISO-3166 alpha-2 code, or `"XX"` when unknown
    pub country_code: String,
    pub isp: String,
    /// Resolved egress address; empty when the service did not report one
    pub address: String,
    pub city: String,
    /// Lower-cased connection category ("isp", "hosting", ...); empty when unknown
    pub connection_type: String,
    /// Sources that failed while at least one other answered
    #[serde(skip)]
    pub partial_failures: Vec<FailureKind>,
}

impl GeoSignal {
    pub fn new(country_code: impl Into<String>, isp: impl Into<String>) -> Self {
        Self {
            country_code: country_code.into(),
            isp: isp.into(),
            address: String::new(),
            city: UNKNOWN_CITY.to_string(),
            connection_type: String::new(),
            partial_failures: Vec::new(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }

    pub fn with_connection_type(mut self, connection_type: impl Into<String>) -> Self {
        self.connection_type = connection_type.into().trim().to_lowercase();
        self
    }

    pub fn with_partial_failure(mut self, kind: FailureKind) -> Self {
        self.partial_failures.push(kind);
        self
    }
}

impl Default for GeoSignal {
    fn default() -> Self {
        Self::new(UNKNOWN_COUNTRY_CODE, UNKNOWN_ISP)
    }
}

/// Fraud/risk score (0-100, higher = worse) for an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReputationSignal {
    pub score: u8,
}

/// Which check rejected the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    Country,
    IspKeyword,
    ConnectionType,
    Reputation,
}

/// How a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictKind {
    /// Checks are switched off
    Disabled,
    /// The geolocation signal could not be obtained
    FailOpen,
    /// Every available signal passed
    Passed,
    Rejected(RejectReason),
}

/// The gate's decision plus a human-readable explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    pub safe: bool,
    pub reason: String,
    pub kind: VerdictKind,
}

impl Verdict {
    pub fn disabled() -> Self {
        Self {
            safe: true,
            reason: "IP check disabled".to_string(),
            kind: VerdictKind::Disabled,
        }
    }

    /// Safe verdict for a geolocation fetch that could not complete.
    pub fn geo_unavailable(error: &SignalError) -> Self {
        let reason = match error {
            SignalError::Timeout => "IP check timed out (failing open)".to_string(),
            other => format!("IP check failed: {} (failing open)", other),
        };
        Self {
            safe: true,
            reason,
            kind: VerdictKind::FailOpen,
        }
    }

    pub fn rejected(reason: RejectReason, message: String) -> Self {
        Self {
            safe: false,
            reason: message,
            kind: VerdictKind::Rejected(reason),
        }
    }

    /// Positive confirmation naming the address, ISP and score.
    ///
    /// `missing` is the reputation failure, if that signal could not be read.
    pub fn passed(geo: &GeoSignal, score: Option<u8>, missing: Option<&SignalError>) -> Self {
        let address = if geo.address.is_empty() {
            "N/A"
        } else {
            geo.address.as_str()
        };
        let score = match (score, missing) {
            (Some(score), _) => score.to_string(),
            (None, Some(e)) => format!("N/A (reputation unavailable: {})", e),
            (None, None) => "N/A".to_string(),
        };
        Self {
            safe: true,
            reason: format!(
                "Environment safe | IP: {} | ISP: {} | Score: {}",
                address, geo.isp, score
            ),
            kind: VerdictKind::Passed,
        }
    }

    /// UI status color: green when safe, red otherwise.
    pub fn status_color(&self) -> &'static str {
        if self.safe {
            "green"
        } else {
            "red"
        }
    }

    pub fn into_tuple(self) -> (bool, String) {
        (self.safe, self.reason)
    }
}
