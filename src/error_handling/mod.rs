//! Error handling and gate statistics.
//!
//! This module provides:
//! - Error type definitions for the transport, the signals and the policy
//! - Retry classification and the backoff schedule
//! - Counters for absorbed failures and evaluation outcomes
//!
//! Failures split into two families:
//! - **Policy errors**: invalid configuration, fatal at construction time
//! - **Signal errors**: anything that goes wrong fetching a signal, always
//!   absorbed by the gate as a fail-open verdict

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::{
    backoff_schedule, is_retryable_method, is_retryable_status, is_transient_error,
};
pub use stats::GateStats;
pub use types::{
    FailureKind, InitializationError, NetworkError, PolicyError, SignalError, TransportFailure,
};
