//! Retrying HTTP sessions.
//!
//! A [`Session`] owns a `reqwest::Client` (and with it a connection pool) plus
//! the retry policy applied to every request issued through it. Dropping the
//! session releases the pool, so scoping a session to a block or function is
//! all the release discipline callers need.

use std::time::Duration;

use log::debug;
use rand::Rng;
use reqwest::{ClientBuilder, Method, Response, StatusCode};
use tokio_retry::RetryIf;

use crate::config::{DEFAULT_BACKOFF_FACTOR, DEFAULT_REQUEST_TIMEOUT, DEFAULT_RETRIES};
use crate::error_handling::{
    backoff_schedule, is_retryable_method, is_retryable_status, is_transient_error,
    InitializationError, NetworkError, TransportFailure,
};
use crate::transport::identity::pick_identity;

/// Session construction parameters.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Retries after the initial attempt
    pub retries: u32,
    /// Base of the exponential backoff, in seconds
    pub backoff_factor: f64,
    /// Timeout `request_with_retry` applies when the caller gives none.
    /// [`Session::execute`] itself only honours per-request timeouts.
    pub timeout: Duration,
    /// Pick a browser identity from the pool at creation time
    pub randomize_identity: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            randomize_identity: true,
        }
    }
}

/// Per-request parameters.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Total time allowed for one attempt
    pub timeout: Option<Duration>,
    /// Query string pairs appended to the URL
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }
}

/// A reusable HTTP session with bounded automatic retry.
#[derive(Debug)]
pub struct Session {
    client: reqwest::Client,
    retries: u32,
    backoff_factor: f64,
    timeout: Duration,
    identity: Option<&'static str>,
}

/// Outcome of a single attempt that may be retried.
#[derive(Debug)]
enum AttemptError {
    Status(StatusCode),
    Http(reqwest::Error),
}

impl AttemptError {
    fn is_transient(&self) -> bool {
        match self {
            AttemptError::Status(_) => true,
            AttemptError::Http(e) => is_transient_error(e),
        }
    }
}

impl From<AttemptError> for TransportFailure {
    fn from(e: AttemptError) -> Self {
        match e {
            AttemptError::Status(status) => TransportFailure::StatusExhausted(status),
            AttemptError::Http(e) => TransportFailure::Http(e),
        }
    }
}

impl std::fmt::Display for AttemptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttemptError::Status(status) => write!(f, "status {}", status),
            AttemptError::Http(e) => write!(f, "{}", e),
        }
    }
}

/// Creates a session, drawing the identity from the thread-local RNG.
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if the HTTP client cannot be
/// built (TLS backend initialization failure).
pub fn create_session(options: SessionOptions) -> Result<Session, InitializationError> {
    create_session_with_rng(options, &mut rand::rng())
}

/// Creates a session, drawing the identity from `rng`.
pub fn create_session_with_rng<R: Rng>(
    options: SessionOptions,
    rng: &mut R,
) -> Result<Session, InitializationError> {
    let identity = if options.randomize_identity {
        Some(pick_identity(rng))
    } else {
        None
    };

    let mut builder = ClientBuilder::new();
    if let Some(user_agent) = identity {
        builder = builder.user_agent(user_agent);
    }
    let client = builder.build()?;

    debug!(
        "Created session (retries={}, backoff_factor={}, identity={})",
        options.retries,
        options.backoff_factor,
        identity.unwrap_or("<default>")
    );

    Ok(Session {
        client,
        retries: options.retries,
        backoff_factor: options.backoff_factor,
        timeout: options.timeout,
        identity,
    })
}

impl Session {
    /// The identity header chosen at creation, if any.
    pub fn identity(&self) -> Option<&'static str> {
        self.identity
    }

    /// The default timeout callers should apply.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retries(&self) -> u32 {
        self.retries
    }

    /// Issues one logical request, retrying transient failures.
    ///
    /// Methods outside {HEAD, GET, OPTIONS, POST} get exactly one attempt.
    /// Statuses outside {429, 500, 502, 503, 504} are returned as-is, whatever
    /// their class; only exhausting the retry budget turns a response into an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns `NetworkError` carrying the method, URL and final cause.
    pub async fn execute(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
    ) -> Result<Response, NetworkError> {
        let retryable = is_retryable_method(&method);
        let budget = if retryable { self.retries } else { 0 };
        let session = self;
        let action_method = method.clone();
        let log_method = method.clone();
        let mut attempt = 0u32;

        let result = RetryIf::spawn(
            backoff_schedule(budget, self.backoff_factor),
            move || {
                attempt += 1;
                let method = action_method.clone();
                let number = attempt;
                async move {
                    if number > 1 {
                        debug!("Attempt {} for {} {}", number, method, url);
                    }
                    session.attempt(method, url, options, retryable).await
                }
            },
            move |err: &AttemptError| {
                let retry = err.is_transient();
                if retry {
                    debug!("Retrying {} {} after {}", log_method, url, err);
                }
                retry
            },
        )
        .await;

        result.map_err(|e| {
            debug!("{} {} gave up: {}", method, url, e);
            NetworkError::new(method, url, e)
        })
    }

    /// Shorthand for `execute(Method::GET, ...)`.
    pub async fn get(&self, url: &str, options: &RequestOptions) -> Result<Response, NetworkError> {
        self.execute(Method::GET, url, options).await
    }

    async fn attempt(
        &self,
        method: Method,
        url: &str,
        options: &RequestOptions,
        retryable: bool,
    ) -> Result<Response, AttemptError> {
        let mut request = self.client.request(method, url);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(AttemptError::Http)?;
        let status = response.status();
        if retryable && is_retryable_status(status) {
            return Err(AttemptError::Status(status));
        }
        Ok(response)
    }
}
