//! Issued-session store with lazy expiry eviction.

use std::collections::HashMap;
use std::sync::Mutex;
use vigil_types::{ApiKey, DeviceId, EntropySource, Nonce, RiskScore, SessionToken, Timestamp};

/// A session minted by a successful attestation.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: SessionToken,
    pub device_id: DeviceId,
    pub owner_key: ApiKey,
    pub risk: RiskScore,
    pub source_nonce: Nonce,
    pub issued_at: Timestamp,
    pub expiry: Timestamp,
}

/// Outcome of validating a session token.
///
/// `Invalid` means the token never existed or was already evicted;
/// `Expired` means it existed but timed out (and has now been evicted).
/// These are the only two negative outcomes exposed.
#[derive(Clone, Debug)]
pub enum SessionValidation {
    Valid(Session),
    Invalid,
    Expired,
}

/// Store of live sessions, keyed by token.
pub struct SessionStore {
    active: Mutex<HashMap<SessionToken, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
        }
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<SessionToken, Session>> {
        self.active.lock().expect("session store lock poisoned")
    }

    /// Mint a session valid for `ttl_secs` from `now`. Duress sessions
    /// (risk `Critical`) get the distinct token prefix.
    #[allow(clippy::too_many_arguments)]
    pub fn issue(
        &self,
        entropy: &dyn EntropySource,
        owner: &ApiKey,
        device: DeviceId,
        risk: RiskScore,
        source_nonce: Nonce,
        now: Timestamp,
        ttl_secs: u64,
    ) -> Session {
        let token = if risk.is_duress() {
            SessionToken::generate_duress(entropy)
        } else {
            SessionToken::generate(entropy)
        };
        let session = Session {
            token: token.clone(),
            device_id: device,
            owner_key: owner.clone(),
            risk,
            source_nonce,
            issued_at: now,
            expiry: now.plus(ttl_secs),
        };
        self.table().insert(token, session.clone());
        session
    }

    /// Validate a token. Expired sessions are evicted on sight and
    /// reported as `Expired`, never `Invalid`.
    pub fn validate(&self, token: &SessionToken, now: Timestamp) -> SessionValidation {
        let mut table = self.table();
        match table.get(token) {
            None => SessionValidation::Invalid,
            Some(session) if session.expiry.is_past(now) => {
                table.remove(token);
                SessionValidation::Expired
            }
            Some(session) => SessionValidation::Valid(session.clone()),
        }
    }

    /// Evict every expired session. Returns the eviction count.
    pub fn sweep(&self, now: Timestamp) -> usize {
        let mut table = self.table();
        let before = table.len();
        table.retain(|_, session| !session.expiry.is_past(now));
        before - table.len()
    }

    /// Number of live sessions.
    pub fn active_count(&self) -> usize {
        self.table().len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_types::SystemEntropy;

    fn issue_one(store: &SessionStore, risk: RiskScore, now: Timestamp) -> Session {
        store.issue(
            &SystemEntropy,
            &ApiKey::new("vk_a"),
            DeviceId::new("device-1"),
            risk,
            Nonce::new("cafe"),
            now,
            300,
        )
    }

    #[test]
    fn issue_and_validate() {
        let store = SessionStore::new();
        let now = Timestamp::new(1_000);
        let session = issue_one(&store, RiskScore::Low, now);

        match store.validate(&session.token, now.plus(100)) {
            SessionValidation::Valid(s) => {
                assert_eq!(s.risk, RiskScore::Low);
                assert_eq!(s.device_id.as_str(), "device-1");
                assert_eq!(s.expiry, now.plus(300));
            }
            other => panic!("expected valid session, got {other:?}"),
        }
    }

    #[test]
    fn unknown_token_is_invalid_not_expired() {
        let store = SessionStore::new();
        let verdict = store.validate(&SessionToken::new("vs_nope"), Timestamp::new(1));
        assert!(matches!(verdict, SessionValidation::Invalid));
    }

    #[test]
    fn expired_token_reports_expired_then_invalid() {
        let store = SessionStore::new();
        let now = Timestamp::new(1_000);
        let session = issue_one(&store, RiskScore::Medium, now);

        // First validation after expiry: Expired, and the entry is evicted
        let verdict = store.validate(&session.token, now.plus(301));
        assert!(matches!(verdict, SessionValidation::Expired));
        assert_eq!(store.active_count(), 0);

        // Second validation: the token no longer exists at all
        let verdict = store.validate(&session.token, now.plus(302));
        assert!(matches!(verdict, SessionValidation::Invalid));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let store = SessionStore::new();
        let now = Timestamp::new(1_000);
        let session = issue_one(&store, RiskScore::Low, now);
        assert!(matches!(
            store.validate(&session.token, now.plus(300)),
            SessionValidation::Valid(_)
        ));
    }

    #[test]
    fn duress_sessions_get_distinct_prefix() {
        let store = SessionStore::new();
        let now = Timestamp::new(1_000);
        let normal = issue_one(&store, RiskScore::High, now);
        let duress = issue_one(&store, RiskScore::Critical, now);
        assert!(normal.token.as_str().starts_with(SessionToken::PREFIX));
        assert!(duress.token.as_str().starts_with(SessionToken::DURESS_PREFIX));
    }

    #[test]
    fn sweep_evicts_only_expired() {
        let store = SessionStore::new();
        let old = issue_one(&store, RiskScore::Low, Timestamp::new(0));
        let fresh = issue_one(&store, RiskScore::Low, Timestamp::new(400));

        let evicted = store.sweep(Timestamp::new(350));
        assert_eq!(evicted, 1);
        assert!(matches!(
            store.validate(&old.token, Timestamp::new(350)),
            SessionValidation::Invalid
        ));
        assert!(matches!(
            store.validate(&fresh.token, Timestamp::new(350)),
            SessionValidation::Valid(_)
        ));
    }
}
