//! Signal payload parsing.
//!
//! Geolocation services answer with flat JSON objects whose key names differ
//! per provider; reputation services may answer with JSON or with an HTML page.
//! Absent fields become sentinels instead of failing the parse.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::config::{MAX_REPUTATION_SCALE, UNKNOWN_CITY, UNKNOWN_COUNTRY_CODE, UNKNOWN_ISP};
use crate::error_handling::SignalError;
use crate::gate::types::GeoSignal;

const FRAUD_SCORE_PATTERN: &str = r"(?i)Fraud\s*Score\s*[:>\s]*([0-9]{1,3})(?:[^0-9]|$)";
const SCORE_KEYS: &[&str] = &["score", "fraud_score"];

/// Compiles a regex pattern, panicking on failure.
///
/// Only used for hardcoded patterns; a failure is a programming error.
fn compile_regex_unsafe(pattern: &str, context: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| {
        panic!(
            "Failed to compile regex pattern '{}' in {}: {}. This is a programming error.",
            pattern, context, e
        )
    })
}

static FRAUD_SCORE_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_regex_unsafe(FRAUD_SCORE_PATTERN, "FRAUD_SCORE_RE"));

pub type JsonObject = Map<String, Value>;

/// Parses a response body that must be a JSON object.
pub fn parse_json_object(body: &str) -> Result<JsonObject, SignalError> {
    match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(SignalError::Malformed(format!(
            "expected a JSON object, got {}",
            json_type_name(&other)
        ))),
        Err(e) => Err(SignalError::Malformed(e.to_string())),
    }
}

/// Merges provider payloads; later payloads override keys of earlier ones.
pub fn merge_payloads(payloads: impl IntoIterator<Item = JsonObject>) -> JsonObject {
    let mut merged = JsonObject::new();
    for payload in payloads {
        merged.extend(payload);
    }
    merged
}

/// Resolves a [`GeoSignal`] from a merged payload.
///
/// Understands the ip-api shape (`countryCode`, `isp`, `query`) and the ipinfo
/// shape (`country`, `org`, `ip`, `type`, `privacy.service`).
pub fn geo_from_payload(payload: &JsonObject) -> GeoSignal {
    let country_code = first_str(payload, &["countryCode", "country"])
        .map(|c| c.to_uppercase())
        .unwrap_or_else(|| UNKNOWN_COUNTRY_CODE.to_string());
    let isp = first_str(payload, &["isp", "org"]).unwrap_or(UNKNOWN_ISP);
    let address = first_str(payload, &["query", "ip"]).unwrap_or_default();
    let city = first_str(payload, &["city"]).unwrap_or(UNKNOWN_CITY);

    let privacy_service = payload
        .get("privacy")
        .and_then(|p| p.get("service"))
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let connection_type = privacy_service
        .or_else(|| first_str(payload, &["type"]))
        .unwrap_or_default();

    GeoSignal::new(country_code, isp)
        .with_address(address)
        .with_city(city)
        .with_connection_type(connection_type)
}

/// Extracts a 0-100 score from a reputation response body.
///
/// JSON bodies are searched for a numeric `score` or `fraud_score`; anything
/// else is scanned for a "Fraud Score: NN" fragment.
pub fn extract_score(body: &str) -> Result<u8, SignalError> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(value) = SCORE_KEYS.iter().find_map(|key| map.get(*key)) {
            return score_from_value(value);
        }
    }

    let captured = FRAUD_SCORE_RE
        .captures(body)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| SignalError::Malformed("no fraud score in response".to_string()))?;
    let score: u16 = captured
        .as_str()
        .parse()
        .map_err(|e| SignalError::Malformed(format!("unreadable fraud score: {}", e)))?;
    check_scale(u64::from(score))
}

fn score_from_value(value: &Value) -> Result<u8, SignalError> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .ok_or_else(|| SignalError::Malformed(format!("negative score {}", n)))
            .and_then(check_scale),
        Value::String(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| SignalError::Malformed(format!("non-numeric score {:?}", s)))
            .and_then(check_scale),
        other => Err(SignalError::Malformed(format!(
            "score is a {}",
            json_type_name(other)
        ))),
    }
}

fn check_scale(score: u64) -> Result<u8, SignalError> {
    u8::try_from(score)
        .ok()
        .filter(|s| *s <= MAX_REPUTATION_SCALE)
        .ok_or_else(|| SignalError::Malformed(format!("score {} outside 0..=100", score)))
}

fn first_str<'a>(payload: &'a JsonObject, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|key| payload.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|value| !value.is_empty())
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
