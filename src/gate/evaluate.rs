//! Verdict evaluation.

use std::sync::Arc;

use log::{debug, info, warn};

use crate::config::GateSettings;
use crate::error_handling::{GateStats, PolicyError, SignalError};
use crate::gate::policy::Policy;
use crate::gate::sources::{HttpSignalSource, SignalSource, SourceConfig};
use crate::gate::types::Verdict;

/// Decides whether the current egress point is acceptable.
///
/// Policy violations are hard rejections. Failures to obtain a signal never
/// escape [`evaluate`](TrustGate::evaluate): a missing geolocation signal fails
/// open, a missing reputation signal is noted in the success reason.
///
/// The gate holds no mutable state of its own and can be shared across tasks
/// (wrap it in an `Arc`).
pub struct TrustGate<S = HttpSignalSource> {
    policy: Policy,
    source: S,
    stats: Option<Arc<GateStats>>,
}

impl TrustGate<HttpSignalSource> {
    /// Builds an HTTP-backed gate from settings.
    ///
    /// # Errors
    ///
    /// Returns `PolicyError` if the policy part of the settings is invalid.
    pub fn from_settings(settings: &GateSettings) -> Result<Self, PolicyError> {
        let policy = Policy::from_settings(settings)?;
        let source = HttpSignalSource::new(SourceConfig::from(settings));
        Ok(Self::new(policy, source))
    }
}

impl<S: SignalSource> TrustGate<S> {
    pub fn new(policy: Policy, source: S) -> Self {
        Self {
            policy,
            source,
            stats: None,
        }
    }

    /// Attaches counters for evaluations, rejections and absorbed failures.
    pub fn with_stats(mut self, stats: Arc<GateStats>) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn stats(&self) -> Option<&Arc<GateStats>> {
        self.stats.as_ref()
    }

    /// Fetches the signals and applies the policy.
    pub async fn evaluate(&self) -> Verdict {
        if !self.policy.enabled() {
            return Verdict::disabled();
        }
        if let Some(stats) = &self.stats {
            stats.record_evaluation();
        }

        let geo = match self.source.fetch_geo().await {
            Ok(geo) => geo,
            Err(e) => {
                warn!("Geolocation check failed, failing open: {}", e);
                self.record_failure(&e);
                if let Some(stats) = &self.stats {
                    stats.record_fail_open();
                }
                return Verdict::geo_unavailable(&e);
            }
        };
        debug!(
            "Geolocation: country={} isp={} address={} type={}",
            geo.country_code, geo.isp, geo.address, geo.connection_type
        );
        if let Some(stats) = &self.stats {
            for kind in &geo.partial_failures {
                stats.increment_failure(*kind);
            }
        }

        if let Some(verdict) = self.policy.check_geo(&geo) {
            return self.reject(verdict);
        }

        let reputation = if geo.address.is_empty() {
            Err(SignalError::Unavailable(
                "no address resolved for reputation lookup".to_string(),
            ))
        } else {
            self.source.fetch_reputation(&geo.address).await
        };

        match reputation {
            Ok(reputation) => match self.policy.check_reputation(&reputation) {
                Some(verdict) => self.reject(verdict),
                None => Verdict::passed(&geo, Some(reputation.score), None),
            },
            Err(e) => {
                warn!("Reputation check skipped: {}", e);
                self.record_failure(&e);
                Verdict::passed(&geo, None, Some(&e))
            }
        }
    }

    fn reject(&self, verdict: Verdict) -> Verdict {
        info!("Environment rejected: {}", verdict.reason);
        if let Some(stats) = &self.stats {
            stats.record_rejection();
        }
        verdict
    }

    fn record_failure(&self, error: &SignalError) {
        if let Some(stats) = &self.stats {
            for kind in error.kinds() {
                stats.increment_failure(kind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::FailureKind;
    use crate::gate::types::{GeoSignal, RejectReason, ReputationSignal, VerdictKind};
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    type GeoResult = fn() -> Result<GeoSignal, SignalError>;
    type ReputationResult = fn() -> Result<ReputationSignal, SignalError>;

    struct MockSource {
        geo: GeoResult,
        reputation: ReputationResult,
        geo_calls: AtomicUsize,
        reputation_calls: AtomicUsize,
        last_address: Mutex<Option<String>>,
    }

    impl MockSource {
        fn new(geo: GeoResult, reputation: ReputationResult) -> Self {
            Self {
                geo,
                reputation,
                geo_calls: AtomicUsize::new(0),
                reputation_calls: AtomicUsize::new(0),
                last_address: Mutex::new(None),
            }
        }

        fn calls(&self) -> (usize, usize) {
            (
                self.geo_calls.load(Ordering::SeqCst),
                self.reputation_calls.load(Ordering::SeqCst),
            )
        }
    }

    #[async_trait]
    impl SignalSource for MockSource {
        async fn fetch_geo(&self) -> Result<GeoSignal, SignalError> {
            self.geo_calls.fetch_add(1, Ordering::SeqCst);
            (self.geo)()
        }

        async fn fetch_reputation(&self, address: &str) -> Result<ReputationSignal, SignalError> {
            self.reputation_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_address.lock().unwrap() = Some(address.to_string());
            (self.reputation)()
        }
    }

    fn policy() -> Policy {
        Policy::from_settings(&GateSettings {
            enabled: true,
            allowed_countries: vec!["US".into()],
            blocked_isp_keywords: vec!["datacenter".into(), "cloud".into()],
            max_reputation_score: 30,
            ..Default::default()
        })
        .unwrap()
    }

    fn comcast() -> Result<GeoSignal, SignalError> {
        Ok(GeoSignal::new("US", "Comcast Cable").with_address("73.1.2.3"))
    }

    fn score(value: u8) -> Result<ReputationSignal, SignalError> {
        Ok(ReputationSignal { score: value })
    }

    #[tokio::test]
    async fn test_disabled_policy_makes_no_calls() {
        let gate = TrustGate::new(Policy::disabled(), MockSource::new(comcast, || score(99)));
        let verdict = gate.evaluate().await;
        assert!(verdict.safe);
        assert_eq!(verdict.kind, VerdictKind::Disabled);
        assert_eq!(gate.source.calls(), (0, 0));
    }

    #[tokio::test]
    async fn test_disallowed_country_is_rejected() {
        let source = MockSource::new(
            || Ok(GeoSignal::new("CN", "China Telecom").with_city("Beijing")),
            || score(0),
        );
        let gate = TrustGate::new(policy(), source);
        let verdict = gate.evaluate().await;
        assert!(!verdict.safe);
        assert!(verdict.reason.contains("CN"));
        assert_eq!(gate.source.calls(), (1, 0));
    }

    #[tokio::test]
    async fn test_blocked_isp_is_rejected() {
        let source = MockSource::new(
            || Ok(GeoSignal::new("US", "Amazon DataCenter LLC").with_address("3.3.3.3")),
            || score(0),
        );
        let verdict = TrustGate::new(policy(), source).evaluate().await;
        assert!(!verdict.safe);
        assert_eq!(verdict.kind, VerdictKind::Rejected(RejectReason::IspKeyword));
    }

    #[tokio::test]
    async fn test_high_reputation_score_is_rejected() {
        let gate = TrustGate::new(policy(), MockSource::new(comcast, || score(80)));
        let verdict = gate.evaluate().await;
        assert!(!verdict.safe);
        assert!(verdict.reason.contains("80"));
        assert_eq!(verdict.kind, VerdictKind::Rejected(RejectReason::Reputation));
        assert_eq!(
            gate.source.last_address.lock().unwrap().as_deref(),
            Some("73.1.2.3")
        );
    }

    #[tokio::test]
    async fn test_low_reputation_score_passes() {
        let verdict = TrustGate::new(policy(), MockSource::new(comcast, || score(10)))
            .evaluate()
            .await;
        assert!(verdict.safe);
        assert_eq!(verdict.kind, VerdictKind::Passed);
        assert!(verdict.reason.contains("73.1.2.3"));
        assert!(verdict.reason.contains("Comcast Cable"));
        assert!(verdict.reason.contains("10"));
    }

    #[tokio::test]
    async fn test_geo_timeout_fails_open() {
        let stats = Arc::new(GateStats::new());
        let gate = TrustGate::new(
            policy(),
            MockSource::new(|| Err(SignalError::Timeout), || score(99)),
        )
        .with_stats(Arc::clone(&stats));

        let verdict = gate.evaluate().await;
        assert!(verdict.safe);
        assert!(verdict.reason.contains("timed out"));
        assert_eq!(verdict.kind, VerdictKind::FailOpen);
        assert_eq!(gate.source.calls(), (1, 0));
        assert_eq!(stats.get_failure_count(FailureKind::Timeout), 1);
        assert_eq!(stats.fail_opens(), 1);
    }

    #[tokio::test]
    async fn test_malformed_geo_fails_open() {
        let verdict = TrustGate::new(
            policy(),
            MockSource::new(
                || Err(SignalError::Malformed("expected a JSON object".into())),
                || score(0),
            ),
        )
        .evaluate()
        .await;
        assert!(verdict.safe);
        assert!(verdict.reason.contains("IP check failed"));
    }

    #[tokio::test]
    async fn test_reputation_failure_passes_with_note() {
        let stats = Arc::new(GateStats::new());
        let gate = TrustGate::new(
            policy(),
            MockSource::new(comcast, || {
                Err(SignalError::Status(StatusCode::SERVICE_UNAVAILABLE))
            }),
        )
        .with_stats(Arc::clone(&stats));

        let verdict = gate.evaluate().await;
        assert!(verdict.safe);
        assert_eq!(verdict.kind, VerdictKind::Passed);
        assert!(verdict.reason.contains("reputation unavailable"));
        assert_eq!(stats.get_failure_count(FailureKind::Status), 1);
        assert_eq!(stats.fail_opens(), 0);
    }

    #[tokio::test]
    async fn test_missing_address_skips_reputation_fetch() {
        let gate = TrustGate::new(
            policy(),
            MockSource::new(|| Ok(GeoSignal::new("US", "Comcast Cable")), || score(99)),
        );
        let verdict = gate.evaluate().await;
        assert!(verdict.safe);
        assert!(verdict.reason.contains("IP: N/A"));
        assert!(verdict.reason.contains("reputation unavailable"));
        assert_eq!(gate.source.calls(), (1, 0));
    }

    #[tokio::test]
    async fn test_every_failed_geo_source_is_counted() {
        let stats = Arc::new(GateStats::new());
        let gate = TrustGate::new(
            policy(),
            MockSource::new(
                || {
                    Err(SignalError::AllSourcesFailed {
                        primary: Box::new(SignalError::Timeout),
                        secondary: Box::new(SignalError::Status(StatusCode::FORBIDDEN)),
                    })
                },
                || score(0),
            ),
        )
        .with_stats(Arc::clone(&stats));

        let verdict = gate.evaluate().await;
        assert!(verdict.safe);
        assert!(verdict.reason.contains("timed out"));
        assert!(verdict.reason.contains("403"));
        assert_eq!(stats.get_failure_count(FailureKind::Timeout), 1);
        assert_eq!(stats.get_failure_count(FailureKind::Status), 1);
        assert_eq!(stats.fail_opens(), 1);
    }

    #[tokio::test]
    async fn test_partial_geo_failure_is_counted() {
        let stats = Arc::new(GateStats::new());
        let gate = TrustGate::new(
            policy(),
            MockSource::new(
                || {
                    Ok(GeoSignal::new("US", "Comcast Cable")
                        .with_address("73.1.2.3")
                        .with_partial_failure(FailureKind::Malformed))
                },
                || score(10),
            ),
        )
        .with_stats(Arc::clone(&stats));

        let verdict = gate.evaluate().await;
        assert!(verdict.safe);
        assert_eq!(stats.get_failure_count(FailureKind::Malformed), 1);
        assert_eq!(stats.fail_opens(), 0);
    }

    #[tokio::test]
    async fn test_stats_count_rejections() {
        let stats = Arc::new(GateStats::new());
        let gate = TrustGate::new(policy(), MockSource::new(comcast, || score(80)))
            .with_stats(Arc::clone(&stats));
        gate.evaluate().await;
        gate.evaluate().await;
        assert_eq!(stats.evaluations(), 2);
        assert_eq!(stats.rejections(), 2);
        assert_eq!(stats.total_failures(), 0);
    }

    #[test]
    fn test_from_settings_rejects_invalid_policy() {
        let result = TrustGate::from_settings(&GateSettings {
            max_reputation_score: 250,
            ..Default::default()
        });
        assert!(matches!(result, Err(PolicyError::ScoreOutOfRange(250))));
    }
}
