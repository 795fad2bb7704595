//! Engine-wide observability counters.
//!
//! Process-lifetime monotonic counters; they reset on restart, matching the
//! in-memory stores they describe.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counters for attestation activity.
///
/// Duress approvals count toward both `verify_approved` and
/// `duress_signals`: from the caller's perspective they are approvals.
#[derive(Default)]
pub struct EngineStats {
    challenges_issued: AtomicU64,
    verify_total: AtomicU64,
    verify_approved: AtomicU64,
    verify_denied: AtomicU64,
    duress_signals: AtomicU64,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_challenge_issued(&self) {
        self.challenges_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_verify_attempt(&self) {
        self.verify_total.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_approved(&self) {
        self.verify_approved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_denied(&self) {
        self.verify_denied.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_duress(&self) {
        self.duress_signals.fetch_add(1, Ordering::Relaxed);
    }

    /// A point-in-time copy of every counter.
    pub fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            challenges_issued: self.challenges_issued.load(Ordering::Relaxed),
            verify_total: self.verify_total.load(Ordering::Relaxed),
            verify_approved: self.verify_approved.load(Ordering::Relaxed),
            verify_denied: self.verify_denied.load(Ordering::Relaxed),
            duress_signals: self.duress_signals.load(Ordering::Relaxed),
        }
    }
}

/// Serializable snapshot of [`EngineStats`], in wire (camelCase) naming.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStatsSnapshot {
    pub challenges_issued: u64,
    pub verify_total: u64,
    pub verify_approved: u64,
    pub verify_denied: u64,
    pub duress_signals: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let stats = EngineStats::new();
        stats.record_challenge_issued();
        stats.record_verify_attempt();
        stats.record_verify_attempt();
        stats.record_approved();
        stats.record_denied();
        stats.record_duress();

        let snap = stats.snapshot();
        assert_eq!(snap.challenges_issued, 1);
        assert_eq!(snap.verify_total, 2);
        assert_eq!(snap.verify_approved, 1);
        assert_eq!(snap.verify_denied, 1);
        assert_eq!(snap.duress_signals, 1);
    }
}
