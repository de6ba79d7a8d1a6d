//! Environment trust gate.
//!
//! This module provides:
//! - Signal types and the [`Verdict`] returned to callers
//! - The validated [`Policy`]
//! - Signal sources (the [`SignalSource`] seam and its HTTP implementation)
//! - [`TrustGate`], which combines the two into one verdict
//! - [`check_ip_safety`], a blocking entry point returning `(safe, reason)`

mod evaluate;
mod policy;
mod sources;
mod types;

use log::warn;
use tokio::runtime::{Builder, Handle};

use crate::config::GateSettings;
use crate::error_handling::PolicyError;

// Re-export public API
pub use evaluate::TrustGate;
pub use policy::Policy;
pub use sources::{
    extract_score, geo_from_payload, merge_payloads, parse_json_object, HttpSignalSource,
    SignalSource, SourceConfig,
};
pub use types::{GeoSignal, RejectReason, ReputationSignal, Verdict, VerdictKind};

/// Runs one evaluation and blocks until it completes.
///
/// Outside a runtime the evaluation runs on a current-thread runtime built for
/// the call. Called from inside a tokio runtime it runs on a separate thread
/// with its own runtime, and the calling thread blocks until it is done; async
/// callers should prefer [`TrustGate::evaluate`].
///
/// # Errors
///
/// Only an invalid policy is an error. If no runtime can be started, or the
/// evaluation thread dies, the check fails open and says so in the reason.
pub fn check_ip_safety(settings: &GateSettings) -> Result<(bool, String), PolicyError> {
    let gate = TrustGate::from_settings(settings)?;

    if Handle::try_current().is_err() {
        return Ok(evaluate_blocking(&gate));
    }

    // block_on panics on a thread that already drives a runtime
    let outcome = std::thread::scope(|scope| scope.spawn(|| evaluate_blocking(&gate)).join());
    Ok(outcome.unwrap_or_else(|_| {
        warn!("IP check thread panicked, failing open");
        fail_open("evaluation thread panicked")
    }))
}

fn evaluate_blocking<S: SignalSource>(gate: &TrustGate<S>) -> (bool, String) {
    match Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime.block_on(gate.evaluate()).into_tuple(),
        Err(e) => {
            warn!("Failed to start runtime for IP check: {}", e);
            fail_open(&e.to_string())
        }
    }
}

fn fail_open(cause: &str) -> (bool, String) {
    (true, format!("IP check failed: {} (failing open)", cause))
}
