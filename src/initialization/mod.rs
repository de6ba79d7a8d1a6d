//! Application initialization.
//!
//! This module provides the logger setup used by the binary. HTTP clients are
//! not initialized here: every transport session builds and owns its own.

mod logger;

// Re-export public API
pub use logger::init_logger_with;
