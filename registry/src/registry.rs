//! The client registry — tenant lookup, admission gate, quota accounting,
//! and admin lifecycle operations.
//!
//! All tenant state lives behind one mutex; every operation is a single
//! critical section. In particular `record_usage` re-runs the quota check
//! and increments inside the same lock acquisition, so the monthly limit
//! can never be exceeded by concurrent verifications.

use crate::client::Client;
use crate::error::{AdmitError, RegistryError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use vigil_types::{ApiKey, ClientStatus, EntropySource, Plan, Timestamp, YearMonth};

/// Default subscription length for newly provisioned tenants.
pub const DEFAULT_DURATION_DAYS: u32 = 30;

/// Registry of tenant accounts, keyed by API key.
pub struct ClientRegistry {
    clients: Mutex<HashMap<ApiKey, Client>>,
    entropy: Arc<dyn EntropySource>,
}

impl ClientRegistry {
    pub fn new(entropy: Arc<dyn EntropySource>) -> Self {
        Self {
            clients: Mutex::new(HashMap::new()),
            entropy,
        }
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<ApiKey, Client>> {
        self.clients.lock().expect("client registry lock poisoned")
    }

    /// Look up a tenant record by API key.
    pub fn lookup(&self, key: &ApiKey) -> Option<Client> {
        self.table().get(key).cloned()
    }

    /// The composite admission gate, run before any challenge or verify call.
    ///
    /// Checks, in order: key present, key known, account status, subscription
    /// expiry (transitioning active accounts to expired as a side effect),
    /// then the monthly quota after a lazy month-boundary reset.
    pub fn admit(&self, key: Option<&ApiKey>, now: Timestamp) -> Result<(), AdmitError> {
        let key = key.ok_or(AdmitError::NoKey)?;
        let mut table = self.table();
        let client = table.get_mut(key).ok_or(AdmitError::InvalidKey)?;

        match client.status {
            ClientStatus::Blocked => return Err(AdmitError::AccountBlocked),
            ClientStatus::Expired => return Err(AdmitError::AccountExpired),
            ClientStatus::Active => {}
        }

        if client.subscription_expired(now) {
            client.status = ClientStatus::Expired;
            tracing::info!(key = ?client.api_key, "subscription lapsed, account expired");
            return Err(AdmitError::SubscriptionExpired);
        }

        client.roll_month(now);
        if client.quota_exhausted() {
            return Err(AdmitError::LimitReached);
        }
        Ok(())
    }

    /// Record one successful verification for this tenant.
    ///
    /// Re-checks the quota and increments `used_this_month` and
    /// `total_verifications` in one critical section — this, not `admit`,
    /// is the authority that keeps usage within the monthly limit. Called
    /// at most once per successful verification.
    pub fn record_usage(&self, key: &ApiKey, now: Timestamp) -> Result<(), AdmitError> {
        let mut table = self.table();
        let client = table.get_mut(key).ok_or(AdmitError::InvalidKey)?;

        client.roll_month(now);
        if client.quota_exhausted() {
            return Err(AdmitError::LimitReached);
        }
        client.used_this_month += 1;
        client.total_verifications += 1;
        Ok(())
    }

    /// Provision a new tenant. Returns the full record including the
    /// freshly generated API key.
    pub fn create(
        &self,
        name: impl Into<String>,
        plan: Plan,
        monthly_limit: Option<u64>,
        duration_days: u32,
        now: Timestamp,
    ) -> Client {
        let client = Client {
            api_key: ApiKey::generate(self.entropy.as_ref()),
            name: name.into(),
            plan,
            status: ClientStatus::Active,
            created_at: now,
            expires_at: Some(now.plus(u64::from(duration_days) * 86_400)),
            monthly_limit: monthly_limit.unwrap_or_else(|| plan.default_monthly_limit()),
            used_this_month: 0,
            last_reset_month: YearMonth::from_timestamp(now),
            total_verifications: 0,
        };
        tracing::info!(key = ?client.api_key, name = %client.name, plan = plan.as_str(), "tenant created");
        self.table().insert(client.api_key.clone(), client.clone());
        client
    }

    /// Block a tenant. Only explicit admin action moves an account in or
    /// out of the blocked state.
    pub fn block(&self, key: &ApiKey) -> Result<Client, RegistryError> {
        let mut table = self.table();
        let client = table.get_mut(key).ok_or(RegistryError::UnknownKey)?;
        client.status = ClientStatus::Blocked;
        tracing::info!(key = ?client.api_key, "tenant blocked");
        Ok(client.clone())
    }

    /// Lift a block, returning the account to active.
    pub fn unblock(&self, key: &ApiKey) -> Result<Client, RegistryError> {
        let mut table = self.table();
        let client = table.get_mut(key).ok_or(RegistryError::UnknownKey)?;
        if client.status == ClientStatus::Blocked {
            client.status = ClientStatus::Active;
            tracing::info!(key = ?client.api_key, "tenant unblocked");
        }
        Ok(client.clone())
    }

    /// Extend a subscription by `duration_days` from whichever is later:
    /// now or the current expiry. Usage counters are preserved; an expired
    /// account becomes active again.
    pub fn renew(
        &self,
        key: &ApiKey,
        duration_days: u32,
        now: Timestamp,
    ) -> Result<Client, RegistryError> {
        let mut table = self.table();
        let client = table.get_mut(key).ok_or(RegistryError::UnknownKey)?;
        let base = client.expires_at.map_or(now, |end| end.max(now));
        client.expires_at = Some(base.plus(u64::from(duration_days) * 86_400));
        if client.status == ClientStatus::Expired {
            client.status = ClientStatus::Active;
        }
        tracing::info!(key = ?client.api_key, until = %client.expires_at.unwrap_or(Timestamp::EPOCH), "subscription renewed");
        Ok(client.clone())
    }

    /// Permanently remove a tenant record. Usage-log entries referring to
    /// the key are left in place.
    pub fn delete(&self, key: &ApiKey) -> Result<(), RegistryError> {
        self.table()
            .remove(key)
            .map(|_| tracing::info!(key = ?key, "tenant deleted"))
            .ok_or(RegistryError::UnknownKey)
    }

    /// All tenant records.
    pub fn list(&self) -> Vec<Client> {
        self.table().values().cloned().collect()
    }

    pub fn client_count(&self) -> usize {
        self.table().len()
    }
}
