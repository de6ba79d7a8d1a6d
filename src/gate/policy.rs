//! Trust policy: validated, immutable thresholds and lists.
//!
//! A [`Policy`] is built once from [`GateSettings`] and only read afterwards.
//! All comparisons are case-insensitive; the stored lists are normalized at
//! construction so the checks do not re-normalize them on every evaluation.

use std::collections::HashSet;

use crate::config::{GateSettings, MAX_REPUTATION_SCALE};
use crate::error_handling::PolicyError;
use crate::gate::types::{GeoSignal, RejectReason, ReputationSignal, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Policy {
    enabled: bool,
    allowed_countries: HashSet<String>,
    blocked_isp_keywords: Vec<String>,
    allowed_connection_types: HashSet<String>,
    blocked_connection_types: HashSet<String>,
    max_reputation_score: u8,
}

impl Policy {
    /// Validates settings and builds the policy.
    ///
    /// # Errors
    ///
    /// - `PolicyError::ScoreOutOfRange` if the max score is outside 0..=100
    /// - `PolicyError::BlankEntry` if any list contains an empty entry
    pub fn from_settings(settings: &GateSettings) -> Result<Self, PolicyError> {
        let max_reputation_score = u8::try_from(settings.max_reputation_score)
            .ok()
            .filter(|score| *score <= MAX_REPUTATION_SCALE)
            .ok_or(PolicyError::ScoreOutOfRange(settings.max_reputation_score))?;

        Ok(Self {
            enabled: settings.enabled,
            allowed_countries: normalize(&settings.allowed_countries, "allowed countries", true)?
                .into_iter()
                .collect(),
            blocked_isp_keywords: normalize(
                &settings.blocked_isp_keywords,
                "blocked ISP keywords",
                false,
            )?,
            allowed_connection_types: normalize(
                &settings.allowed_connection_types,
                "allowed connection types",
                false,
            )?
            .into_iter()
            .collect(),
            blocked_connection_types: normalize(
                &settings.blocked_connection_types,
                "blocked connection types",
                false,
            )?
            .into_iter()
            .collect(),
            max_reputation_score,
        })
    }

    /// A policy that lets everything through without looking.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            allowed_countries: HashSet::new(),
            blocked_isp_keywords: Vec::new(),
            allowed_connection_types: HashSet::new(),
            blocked_connection_types: HashSet::new(),
            max_reputation_score: MAX_REPUTATION_SCALE,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn max_reputation_score(&self) -> u8 {
        self.max_reputation_score
    }

    /// Applies the geolocation checks in order: country, ISP keyword,
    /// connection type. Returns the first rejection, if any.
    pub fn check_geo(&self, geo: &GeoSignal) -> Option<Verdict> {
        self.check_country(geo)
            .or_else(|| self.check_isp(geo))
            .or_else(|| self.check_connection_type(geo))
    }

    /// Rejects scores strictly above the configured maximum.
    pub fn check_reputation(&self, reputation: &ReputationSignal) -> Option<Verdict> {
        (reputation.score > self.max_reputation_score).then(|| {
            Verdict::rejected(
                RejectReason::Reputation,
                format!(
                    "Reputation score too high: {} (max {})",
                    reputation.score, self.max_reputation_score
                ),
            )
        })
    }

    // Empty allow-list means no country restriction
    fn check_country(&self, geo: &GeoSignal) -> Option<Verdict> {
        if self.allowed_countries.is_empty()
            || self
                .allowed_countries
                .contains(&geo.country_code.trim().to_uppercase())
        {
            return None;
        }
        Some(Verdict::rejected(
            RejectReason::Country,
            format!(
                "Country not allowed: {} (city: {})",
                geo.country_code, geo.city
            ),
        ))
    }

    fn check_isp(&self, geo: &GeoSignal) -> Option<Verdict> {
        let isp = geo.isp.to_lowercase();
        self.blocked_isp_keywords
            .iter()
            .find(|keyword| isp.contains(keyword.as_str()))
            .map(|keyword| {
                Verdict::rejected(
                    RejectReason::IspKeyword,
                    format!(
                        "Datacenter ISP detected: {} (matched \"{}\")",
                        geo.isp, keyword
                    ),
                )
            })
    }

    // Blocked wins over allowed when a type is in both sets
    fn check_connection_type(&self, geo: &GeoSignal) -> Option<Verdict> {
        let connection_type = geo.connection_type.trim().to_lowercase();
        if connection_type.is_empty() {
            return None;
        }
        if self.blocked_connection_types.contains(&connection_type) {
            return Some(Verdict::rejected(
                RejectReason::ConnectionType,
                format!("Connection type blocked: {}", connection_type),
            ));
        }
        if !self.allowed_connection_types.is_empty()
            && !self.allowed_connection_types.contains(&connection_type)
        {
            return Some(Verdict::rejected(
                RejectReason::ConnectionType,
                format!("Connection type not allowed: {}", connection_type),
            ));
        }
        None
    }
}

fn normalize(
    items: &[String],
    list: &'static str,
    upper: bool,
) -> Result<Vec<String>, PolicyError> {
    items
        .iter()
        .map(|item| {
            let item = item.trim();
            if item.is_empty() {
                Err(PolicyError::BlankEntry(list))
            } else if upper {
                Ok(item.to_uppercase())
            } else {
                Ok(item.to_lowercase())
            }
        })
        .collect()
}
