//! HTTP-backed signal source.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Method, Response};
use serde_json::Value;
use url::Url;

use crate::config::{GateSettings, MAX_SIGNAL_BODY_SIZE, REPUTATION_URL_PLACEHOLDER};
use crate::error_handling::{NetworkError, SignalError};
use crate::gate::sources::extract::{
    extract_score, geo_from_payload, merge_payloads, parse_json_object, JsonObject,
};
use crate::gate::sources::SignalSource;
use crate::gate::types::{GeoSignal, ReputationSignal};
use crate::transport::{request_with_session_options, RequestOptions, SessionOptions};

/// Endpoints and transport parameters for [`HttpSignalSource`].
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Primary geolocation endpoint (ip-api shape)
    pub ip_api_url: String,
    /// Secondary geolocation endpoint (ipinfo shape); skipped when `None`
    pub ipinfo_url: Option<String>,
    pub ipinfo_token: Option<String>,
    /// Reputation endpoint; `{ip}` is replaced by the address
    pub reputation_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    pub session: SessionOptions,
}

impl From<&GateSettings> for SourceConfig {
    fn from(settings: &GateSettings) -> Self {
        Self {
            ip_api_url: settings.ip_api_url.clone(),
            ipinfo_url: Some(settings.ipinfo_url.clone()).filter(|u| !u.trim().is_empty()),
            ipinfo_token: settings.ipinfo_token.clone(),
            reputation_url: settings.reputation_url.clone(),
            timeout: settings.signal_timeout,
            session: SessionOptions::default(),
        }
    }
}

/// Fetches signals from the configured web services through the resilient
/// transport. Each request runs in its own short-lived session.
#[derive(Debug, Clone)]
pub struct HttpSignalSource {
    config: SourceConfig,
}

impl HttpSignalSource {
    pub fn new(config: SourceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    async fn get_text(&self, url: &str, options: RequestOptions) -> Result<String, SignalError> {
        let options = options.with_timeout(self.config.timeout);
        let response = request_with_session_options(&self.config.session, Method::GET, url, options)
            .await
            .map_err(SignalError::from_network)?;
        read_body(response, url).await
    }

    async fn fetch_primary(&self) -> Result<JsonObject, SignalError> {
        let payload = parse_json_object(
            &self
                .get_text(&self.config.ip_api_url, RequestOptions::default())
                .await?,
        )?;
        // ip-api answers 200 with {"status": "fail", "message": ...} for lookups it refuses
        if payload.get("status").and_then(Value::as_str) == Some("fail") {
            let message = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("lookup failed");
            return Err(SignalError::Unavailable(message.to_string()));
        }
        Ok(payload)
    }

    async fn fetch_secondary(&self, url: &str) -> Result<JsonObject, SignalError> {
        let mut options = RequestOptions::default();
        if let Some(token) = &self.config.ipinfo_token {
            options = options.with_query("token", token.as_str());
        }
        parse_json_object(&self.get_text(url, options).await?)
    }

    fn reputation_url(&self, address: &str) -> Result<String, SignalError> {
        let template = self.config.reputation_url.trim();
        let url = if template.contains(REPUTATION_URL_PLACEHOLDER) {
            template.replace(REPUTATION_URL_PLACEHOLDER, address)
        } else {
            format!("{}/{}", template.trim_end_matches('/'), address)
        };
        Url::parse(&url)
            .map(String::from)
            .map_err(|e| SignalError::Unavailable(format!("invalid reputation URL {}: {}", url, e)))
    }
}

#[async_trait]
impl SignalSource for HttpSignalSource {
    async fn fetch_geo(&self) -> Result<GeoSignal, SignalError> {
        let primary = self.fetch_primary();
        let secondary = async {
            match &self.config.ipinfo_url {
                Some(url) => Some(self.fetch_secondary(url).await),
                None => None,
            }
        };
        let (primary, secondary) = tokio::join!(primary, secondary);

        let (payload, failed) = match (primary, secondary) {
            (Ok(primary), None) => (primary, None),
            (Ok(primary), Some(Ok(secondary))) => (merge_payloads([primary, secondary]), None),
            (Ok(primary), Some(Err(e))) => {
                warn!("Secondary geolocation lookup failed: {}", e);
                (primary, Some(e))
            }
            (Err(e), Some(Ok(secondary))) => {
                warn!("Primary geolocation lookup failed: {}", e);
                (secondary, Some(e))
            }
            (Err(primary), Some(Err(secondary))) => {
                return Err(SignalError::AllSourcesFailed {
                    primary: Box::new(primary),
                    secondary: Box::new(secondary),
                })
            }
            (Err(e), None) => return Err(e),
        };

        let mut geo = geo_from_payload(&payload);
        if let Some(e) = failed {
            for kind in e.kinds() {
                geo = geo.with_partial_failure(kind);
            }
        }
        Ok(geo)
    }

    async fn fetch_reputation(&self, address: &str) -> Result<ReputationSignal, SignalError> {
        let url = self.reputation_url(address)?;
        let body = self.get_text(&url, RequestOptions::default()).await?;
        let score = extract_score(&body)?;
        debug!("Reputation score for {}: {}", address, score);
        Ok(ReputationSignal { score })
    }
}

async fn read_body(response: Response, url: &str) -> Result<String, SignalError> {
    let status = response.status();
    if !status.is_success() {
        return Err(SignalError::Status(status));
    }
    if let Some(length) = response.content_length() {
        if length > MAX_SIGNAL_BODY_SIZE as u64 {
            return Err(SignalError::Malformed(format!(
                "body of {} bytes exceeds limit",
                length
            )));
        }
    }
    let text = response
        .text()
        .await
        .map_err(|e| SignalError::from_network(NetworkError::new(Method::GET, url, e)))?;
    if text.len() > MAX_SIGNAL_BODY_SIZE {
        return Err(SignalError::Malformed(format!(
            "body of {} bytes exceeds limit",
            text.len()
        )));
    }
    Ok(text)
}
