//! egress_gate library: environment trust gate over a resilient HTTP transport
//!
//! This library decides whether the current network egress point is safe to
//! operate from. It fetches geolocation/ISP data and a reputation score from
//! external services, evaluates them against a static policy, and returns one
//! verdict with a human-readable reason. Failures to obtain a signal fail open;
//! policy violations are hard rejections.
//!
//! # Example
//!
//! ```no_run
//! use egress_gate::{GateSettings, TrustGate};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = GateSettings {
//!     allowed_countries: vec!["US".into(), "CA".into()],
//!     ..GateSettings::from_env()
//! };
//!
//! let gate = TrustGate::from_settings(&settings)?;
//! let verdict = gate.evaluate().await;
//! println!("safe={} reason={}", verdict.safe, verdict.reason);
//! # Ok(())
//! # }
//! ```
//!
//! Callers without a runtime can use [`check_ip_safety`], which returns
//! `(safe, reason)`.

pub mod app;
pub mod config;
pub mod error_handling;
pub mod gate;
pub mod initialization;
pub mod transport;

// Re-export public API
pub use config::{GateSettings, LogFormat, LogLevel, Opt};
pub use error_handling::{GateStats, NetworkError, PolicyError, SignalError};
pub use gate::{check_ip_safety, Policy, TrustGate, Verdict, VerdictKind};
pub use transport::{create_session, request_with_retry, RequestOptions, SessionOptions};
