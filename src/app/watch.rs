//! Periodic re-evaluation.

use std::time::Duration;

use log::{info, warn};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::gate::{SignalSource, TrustGate, Verdict};

const MIN_WATCH_INTERVAL: Duration = Duration::from_millis(10);

/// Evaluates the gate now and then every `every` until `cancel` fires.
///
/// Each verdict is logged and handed to `on_verdict`. An evaluation still in
/// flight when the token is cancelled is abandoned. Returns the number of
/// completed evaluations.
pub async fn watch<S, F>(
    gate: &TrustGate<S>,
    every: Duration,
    cancel: CancellationToken,
    mut on_verdict: F,
) -> usize
where
    S: SignalSource,
    F: FnMut(&Verdict),
{
    let mut ticker = interval(every.max(MIN_WATCH_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut completed = 0usize;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let verdict = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            verdict = gate.evaluate() => verdict,
        };
        completed += 1;

        if verdict.safe {
            info!("Environment check: {}", verdict.reason);
        } else {
            warn!("Environment check: {}", verdict.reason);
        }
        on_verdict(&verdict);
    }

    info!("Watch stopped after {} evaluation(s)", completed);
    completed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::SignalError;
    use crate::gate::{GeoSignal, Policy, ReputationSignal};
    use async_trait::async_trait;

    struct FixedSource;

    #[async_trait]
    impl SignalSource for FixedSource {
        async fn fetch_geo(&self) -> Result<GeoSignal, SignalError> {
            Ok(GeoSignal::new("US", "Comcast Cable").with_address("73.1.2.3"))
        }

        async fn fetch_reputation(&self, _address: &str) -> Result<ReputationSignal, SignalError> {
            Ok(ReputationSignal { score: 5 })
        }
    }

    struct StalledSource;

    #[async_trait]
    impl SignalSource for StalledSource {
        async fn fetch_geo(&self) -> Result<GeoSignal, SignalError> {
            std::future::pending().await
        }

        async fn fetch_reputation(&self, _address: &str) -> Result<ReputationSignal, SignalError> {
            std::future::pending().await
        }
    }

    fn enabled_policy() -> Policy {
        Policy::from_settings(&crate::config::GateSettings::default()).unwrap()
    }

    #[tokio::test]
    async fn test_watch_runs_until_cancelled() {
        let gate = TrustGate::new(enabled_policy(), FixedSource);
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        let mut seen = Vec::new();

        let completed = watch(&gate, Duration::from_millis(10), cancel, |verdict| {
            seen.push(verdict.safe);
            if seen.len() == 3 {
                stop.cancel();
            }
        })
        .await;

        assert_eq!(completed, 3);
        assert_eq!(seen, vec![true, true, true]);
    }

    #[tokio::test]
    async fn test_watch_abandons_evaluation_in_flight() {
        let gate = TrustGate::new(enabled_policy(), StalledSource);
        let cancel = CancellationToken::new();
        let stop = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            stop.cancel();
        });

        let completed = watch(&gate, Duration::from_secs(60), cancel, |_| {}).await;
        assert_eq!(completed, 0);
    }

    #[tokio::test]
    async fn test_watch_with_cancelled_token_does_nothing() {
        let gate = TrustGate::new(enabled_policy(), FixedSource);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let completed = watch(&gate, Duration::ZERO, cancel, |_| {}).await;
        assert_eq!(completed, 0);
    }
}
