//! Append-only usage audit log.
//!
//! Every attestation-relevant event (challenge issuance, verification
//! outcomes, duress signals, admin mutations) is appended here. The core
//! never mutates or deletes entries; retention is an operator concern.

use serde::Serialize;
use std::sync::Mutex;
use vigil_types::{ApiKey, Timestamp};

/// The kind of event a log entry records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageAction {
    ChallengeIssued,
    Verify,
    DuressSignal,
    Admin,
}

/// One write-once audit record.
#[derive(Clone, Debug, Serialize)]
pub struct UsageLogEntry {
    pub timestamp: Timestamp,
    pub owner_key: ApiKey,
    pub action: UsageAction,
    pub result: String,
    pub details: String,
}

/// Append-only in-memory audit trail.
pub struct UsageLog {
    entries: Mutex<Vec<UsageLogEntry>>,
}

impl UsageLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Append an entry. Entries are never mutated or removed afterwards.
    pub fn record(
        &self,
        now: Timestamp,
        owner_key: ApiKey,
        action: UsageAction,
        result: impl Into<String>,
        details: impl Into<String>,
    ) {
        let entry = UsageLogEntry {
            timestamp: now,
            owner_key,
            action,
            result: result.into(),
            details: details.into(),
        };
        self.entries.lock().expect("usage log lock poisoned").push(entry);
    }

    /// All entries, oldest first.
    pub fn entries(&self) -> Vec<UsageLogEntry> {
        self.entries.lock().expect("usage log lock poisoned").clone()
    }

    /// Entries for one tenant, oldest first.
    pub fn entries_for(&self, key: &ApiKey) -> Vec<UsageLogEntry> {
        self.entries
            .lock()
            .expect("usage log lock poisoned")
            .iter()
            .filter(|e| &e.owner_key == key)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().expect("usage log lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for UsageLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_accumulate_in_order() {
        let log = UsageLog::new();
        let key = ApiKey::new("vk_a");
        log.record(
            Timestamp::new(1),
            key.clone(),
            UsageAction::ChallengeIssued,
            "ok",
            "",
        );
        log.record(Timestamp::new(2), key, UsageAction::Verify, "approved", "");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, UsageAction::ChallengeIssued);
        assert_eq!(entries[1].action, UsageAction::Verify);
        assert!(entries[0].timestamp < entries[1].timestamp);
    }

    #[test]
    fn per_tenant_filter() {
        let log = UsageLog::new();
        let a = ApiKey::new("vk_a");
        let b = ApiKey::new("vk_b");
        log.record(Timestamp::new(1), a.clone(), UsageAction::Verify, "ok", "");
        log.record(Timestamp::new(2), b, UsageAction::Verify, "ok", "");
        log.record(Timestamp::new(3), a.clone(), UsageAction::DuressSignal, "ok", "");

        let for_a = log.entries_for(&a);
        assert_eq!(for_a.len(), 2);
        assert!(for_a.iter().all(|e| e.owner_key == a));
    }

    #[test]
    fn empty_log() {
        let log = UsageLog::new();
        assert!(log.is_empty());
        assert!(log.entries().is_empty());
    }
}
