//! Lifecycle and plan enums for tenant accounts.

use serde::{Deserialize, Serialize};

/// The lifecycle status of a tenant account.
///
/// `Active` ↔ `Blocked` transitions happen only through explicit admin
/// action; `Active` → `Expired` happens automatically when the subscription
/// end passes, and `renew` restores an expired account to `Active`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Blocked,
    Expired,
}

impl ClientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Blocked => "blocked",
            Self::Expired => "expired",
        }
    }

    /// Whether this account may issue challenges and verify responses.
    pub fn can_attest(&self) -> bool {
        matches!(self, Self::Active)
    }
}

/// Subscription plan, which sets the default monthly verification quota.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Starter,
    Business,
    Enterprise,
    Unlimited,
}

impl Plan {
    /// Default monthly verification quota for the plan. 0 means unlimited.
    pub fn default_monthly_limit(&self) -> u64 {
        match self {
            Self::Starter => 5_000,
            Self::Business => 20_000,
            Self::Enterprise => 100_000,
            Self::Unlimited => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Starter => "starter",
            Self::Business => "business",
            Self::Enterprise => "enterprise",
            Self::Unlimited => "unlimited",
        }
    }
}
