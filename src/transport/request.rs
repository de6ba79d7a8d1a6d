//! One-shot retrying requests.

use log::debug;
use reqwest::{Method, Response};

use crate::error_handling::NetworkError;
use crate::transport::session::{create_session, RequestOptions, SessionOptions};

/// Issues a single logical request through a short-lived default session.
///
/// The session is created for this call only and dropped before the function
/// returns, on success and on failure alike. `options.timeout` overrides the
/// session's default timeout (15s).
///
/// # Errors
///
/// Returns `NetworkError` once the retry budget is exhausted or on a permanent
/// failure; no partial result is ever returned. The failure is only logged at
/// debug level; how loudly to report it is up to the caller.
pub async fn request_with_retry(
    method: Method,
    url: &str,
    options: RequestOptions,
) -> Result<Response, NetworkError> {
    request_with_session_options(&SessionOptions::default(), method, url, options).await
}

/// Like [`request_with_retry`], with explicit session parameters.
pub async fn request_with_session_options(
    session_options: &SessionOptions,
    method: Method,
    url: &str,
    options: RequestOptions,
) -> Result<Response, NetworkError> {
    let session = create_session(session_options.clone())
        .map_err(|e| NetworkError::new(method.clone(), url, e))?;

    let options = RequestOptions {
        timeout: Some(options.timeout.unwrap_or(session.timeout())),
        ..options
    };

    let result = session.execute(method, url, &options).await;
    if let Err(e) = &result {
        debug!("{}", e);
    }
    result
}
