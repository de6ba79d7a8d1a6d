//! Resilient HTTP transport.
//!
//! This module provides:
//! - Retrying sessions with exponential backoff (`create_session`)
//! - Fixed-at-creation browser identity selection from a pool
//! - A one-shot convenience wrapper that scopes a session to one request
//!   (`request_with_retry`)

mod identity;
mod request;
mod session;

// Re-export public API
pub use identity::{pick_identity, IDENTITY_CHROME_VERSION, IDENTITY_POOL};
pub use request::{request_with_retry, request_with_session_options};
pub use session::{
    create_session, create_session_with_rng, RequestOptions, Session, SessionOptions,
};
