//! Signal sources feeding the trust gate.

mod extract;
mod http;

use async_trait::async_trait;

use crate::error_handling::SignalError;
use crate::gate::types::{GeoSignal, ReputationSignal};

pub use extract::{extract_score, geo_from_payload, merge_payloads, parse_json_object};
pub use http::{HttpSignalSource, SourceConfig};

/// Provider of the signals the gate evaluates.
///
/// Implementations must not panic on bad upstream data; every failure is
/// reported as a [`SignalError`] so the gate can fail open.
#[async_trait]
pub trait SignalSource: Send + Sync {
    /// Looks up geolocation and ISP data for the current egress address.
    async fn fetch_geo(&self) -> Result<GeoSignal, SignalError>;

    /// Looks up the reputation score of `address`.
    async fn fetch_reputation(&self, address: &str) -> Result<ReputationSignal, SignalError>;
}
