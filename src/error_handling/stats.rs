//! Gate statistics tracking.
//!
//! This module provides thread-safe counters for evaluation outcomes and for
//! the signal failures that were absorbed by the fail-open policy.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use strum::IntoEnumIterator;

use super::types::FailureKind;

/// Thread-safe evaluation statistics tracker.
///
/// A fail-open verdict hides the underlying failure from the caller's control
/// flow; these counters keep it observable. Share one instance across gates or
/// tasks with `Arc`.
pub struct GateStats {
    failures: HashMap<FailureKind, AtomicUsize>,
    evaluations: AtomicUsize,
    rejections: AtomicUsize,
    fail_opens: AtomicUsize,
}

impl GateStats {
    pub fn new() -> Self {
        let mut failures = HashMap::new();
        for kind in FailureKind::iter() {
            failures.insert(kind, AtomicUsize::new(0));
        }

        GateStats {
            failures,
            evaluations: AtomicUsize::new(0),
            rejections: AtomicUsize::new(0),
            fail_opens: AtomicUsize::new(0),
        }
    }

    /// Records an absorbed signal failure.
    pub fn increment_failure(&self, kind: FailureKind) {
        if let Some(counter) = self.failures.get(&kind) {
            counter.fetch_add(1, Ordering::SeqCst);
        }
    }

    pub fn record_evaluation(&self) {
        self.evaluations.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_rejection(&self) {
        self.rejections.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_fail_open(&self) {
        self.fail_opens.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get_failure_count(&self, kind: FailureKind) -> usize {
        self.failures
            .get(&kind)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    pub fn total_failures(&self) -> usize {
        self.failures.values().map(|c| c.load(Ordering::SeqCst)).sum()
    }

    pub fn evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }

    pub fn rejections(&self) -> usize {
        self.rejections.load(Ordering::SeqCst)
    }

    pub fn fail_opens(&self) -> usize {
        self.fail_opens.load(Ordering::SeqCst)
    }
}

impl Default for GateStats {
    fn default() -> Self {
        Self::new()
    }
}
