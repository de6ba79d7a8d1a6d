//! Main application modules.
//!
//! This module provides the watch loop and statistics printing used by the
//! binary.

pub mod statistics;
pub mod watch;

// Re-export public API
pub use statistics::print_gate_statistics;
pub use watch::watch;
