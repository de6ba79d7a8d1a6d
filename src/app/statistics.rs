//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{FailureKind, GateStats};

/// Prints evaluation counts and absorbed signal failures to the log.
pub fn print_gate_statistics(stats: &GateStats) {
    info!(
        "Evaluations: {} ({} rejected, {} failed open)",
        stats.evaluations(),
        stats.rejections(),
        stats.fail_opens()
    );

    let total_failures = stats.total_failures();
    if total_failures > 0 {
        info!("Signal Failures ({} total):", total_failures);
        for kind in FailureKind::iter() {
            let count = stats.get_failure_count(kind);
            if count > 0 {
                info!("   {}: {}", kind.as_str(), count);
            }
        }
    }
}
