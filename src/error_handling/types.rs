//! Error type definitions.
//!
//! This module defines the error types used throughout the crate and the
//! categories used to count and describe fail-open outcomes.

use log::SetLoggerError;
use reqwest::{Method, StatusCode};
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing the HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] reqwest::Error),
}

/// Why a request through the resilient transport failed for good.
#[derive(Error, Debug)]
pub enum TransportFailure {
    /// The session could not be created.
    #[error("{0}")]
    Setup(#[from] InitializationError),

    /// A retryable status was still returned once the retry budget ran out.
    #[error("status {0} persisted after retries")]
    StatusExhausted(StatusCode),

    /// The request itself failed (connect, timeout, body, ...).
    #[error("{0}")]
    Http(#[from] reqwest::Error),
}

/// Unrecoverable failure of a request issued through the resilient transport.
///
/// Carries the method and URL so log lines and verdict reasons identify the
/// call without the caller threading that context through.
#[derive(Error, Debug)]
#[error("Network request failed [{method} {url}]: {cause}")]
pub struct NetworkError {
    pub method: Method,
    pub url: String,
    #[source]
    pub cause: TransportFailure,
}

impl NetworkError {
    pub fn new(method: Method, url: impl Into<String>, cause: impl Into<TransportFailure>) -> Self {
        Self {
            method,
            url: url.into(),
            cause: cause.into(),
        }
    }

    /// True when the underlying failure was a request timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(&self.cause, TransportFailure::Http(e) if e.is_timeout())
    }

    /// True when the underlying failure was a connection failure.
    pub fn is_connect(&self) -> bool {
        matches!(&self.cause, TransportFailure::Http(e) if e.is_connect())
    }
}

/// Failure to obtain one signal. Never fatal: the gate turns it into a
/// fail-open verdict.
#[derive(Error, Debug)]
pub enum SignalError {
    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Transport(#[from] NetworkError),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("signal unavailable: {0}")]
    Unavailable(String),

    /// Every source for the signal failed.
    #[error("{primary}; secondary source: {secondary}")]
    AllSourcesFailed {
        primary: Box<SignalError>,
        secondary: Box<SignalError>,
    },
}

impl SignalError {
    /// Builds the error from a transport failure, lifting timeouts into
    /// their own variant so reasons can say "timed out" plainly.
    pub fn from_network(error: NetworkError) -> Self {
        if error.is_timeout() {
            SignalError::Timeout
        } else {
            SignalError::Transport(error)
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            SignalError::Timeout => FailureKind::Timeout,
            SignalError::Transport(e) if e.is_connect() => FailureKind::Connect,
            SignalError::Transport(e) => match &e.cause {
                TransportFailure::StatusExhausted(_) => FailureKind::Status,
                _ => FailureKind::Other,
            },
            SignalError::Status(_) => FailureKind::Status,
            SignalError::Malformed(_) => FailureKind::Malformed,
            SignalError::Unavailable(_) => FailureKind::Other,
            SignalError::AllSourcesFailed { primary, .. } => primary.kind(),
        }
    }

    /// Categories of every underlying failure, one per failed source.
    pub fn kinds(&self) -> Vec<FailureKind> {
        match self {
            SignalError::AllSourcesFailed { primary, secondary } => {
                let mut kinds = primary.kinds();
                kinds.extend(secondary.kinds());
                kinds
            }
            other => vec![other.kind()],
        }
    }
}

/// Invalid policy values. The only error the gate treats as fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("max reputation score must be within 0..=100, got {0}")]
    ScoreOutOfRange(i64),

    #[error("blank entry in {0}")]
    BlankEntry(&'static str),
}

/// Categories of signal failure, used for counting and for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum FailureKind {
    Timeout,
    Connect,
    Status,
    Malformed,
    Other,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Connect => "connection failure",
            FailureKind::Status => "HTTP status",
            FailureKind::Malformed => "malformed response",
            FailureKind::Other => "other failure",
        }
    }
}
