//! Pending-challenge store with atomic one-time consumption.
//!
//! The table is guarded by one mutex; `consume` removes the entry inside a
//! single critical section, which is the linearization point for the
//! one-time-use guarantee: of any number of concurrent verifies racing on
//! the same nonce, exactly one gets the challenge and the rest observe
//! [`ConsumeError::InvalidNonce`].

use crate::challenge::{Challenge, ChallengeCode};
use crate::error::ConsumeError;
use std::collections::HashMap;
use std::sync::Mutex;
use vigil_types::{ApiKey, EntropySource, Nonce, Timestamp};

/// Store of challenges awaiting verification, keyed by nonce.
pub struct NonceStore {
    pending: Mutex<HashMap<Nonce, Challenge>>,
}

impl NonceStore {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<Nonce, Challenge>> {
        self.pending.lock().expect("nonce store lock poisoned")
    }

    /// Issue a fresh challenge for `owner`: a random code and a random
    /// nonce, valid for `ttl_secs` from `now`.
    pub fn issue(
        &self,
        entropy: &dyn EntropySource,
        owner: &ApiKey,
        now: Timestamp,
        ttl_secs: u64,
    ) -> Challenge {
        let challenge = Challenge {
            nonce: Nonce::generate(entropy),
            code: ChallengeCode::generate(entropy),
            issued_at: now,
            expiry: now.plus(ttl_secs),
            used: false,
            owner_key: owner.clone(),
        };
        let previous = self
            .table()
            .insert(challenge.nonce.clone(), challenge.clone());
        debug_assert!(previous.is_none(), "128-bit nonce collision");
        challenge
    }

    /// Atomically consume the challenge bound to `nonce`.
    ///
    /// The lookup, ownership check, expiry check, and removal happen in one
    /// critical section. Ownership mismatches leave the entry intact for
    /// its rightful owner; expired entries are evicted on sight.
    pub fn consume(
        &self,
        nonce: &Nonce,
        owner: &ApiKey,
        now: Timestamp,
    ) -> Result<Challenge, ConsumeError> {
        let mut table = self.table();
        let Some(challenge) = table.remove(nonce) else {
            return Err(ConsumeError::InvalidNonce);
        };
        if challenge.owner_key != *owner {
            table.insert(nonce.clone(), challenge);
            return Err(ConsumeError::OwnerMismatch);
        }
        if challenge.expiry.is_past(now) {
            return Err(ConsumeError::Expired);
        }
        let mut challenge = challenge;
        challenge.used = true;
        Ok(challenge)
    }

    /// Evict every expired challenge. Returns the eviction count.
    pub fn sweep(&self, now: Timestamp) -> usize {
        let mut table = self.table();
        let before = table.len();
        table.retain(|_, challenge| !challenge.expiry.is_past(now));
        before - table.len()
    }

    /// Number of challenges awaiting verification.
    pub fn pending_count(&self) -> usize {
        self.table().len()
    }

    /// Whether a nonce is currently pending. Diagnostic/test helper.
    pub fn contains(&self, nonce: &Nonce) -> bool {
        self.table().contains_key(nonce)
    }
}

impl Default for NonceStore {
    fn default() -> Self {
        Self::new()
    }
}
