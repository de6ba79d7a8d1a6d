//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (service endpoints, timeouts, retry parameters)
//! - Environment-sourced gate settings
//! - CLI option types and parsing

mod constants;
mod settings;
mod types;

// Re-export all constants
pub use constants::*;
pub use settings::{clean_env_value, GateSettings};
pub use types::{LogFormat, LogLevel, Opt};
