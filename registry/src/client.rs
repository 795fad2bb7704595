//! Tenant account records and their lifecycle rules.

use serde::Serialize;
use vigil_types::{ApiKey, ClientStatus, Plan, Timestamp, YearMonth};

/// A tenant account, keyed by its API key.
#[derive(Clone, Debug, Serialize)]
pub struct Client {
    pub api_key: ApiKey,
    pub name: String,
    pub plan: Plan,
    pub status: ClientStatus,
    pub created_at: Timestamp,
    /// Subscription end; `None` never expires.
    pub expires_at: Option<Timestamp>,
    /// Monthly verification quota. 0 means unlimited.
    pub monthly_limit: u64,
    pub used_this_month: u64,
    pub last_reset_month: YearMonth,
    pub total_verifications: u64,
}

impl Client {
    /// Whether the subscription end has passed.
    pub fn subscription_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|end| end.is_past(now))
    }

    /// Lazy monthly reset: zero the month counter exactly once when the
    /// observed calendar month moves past `last_reset_month`.
    pub fn roll_month(&mut self, now: Timestamp) {
        let current = YearMonth::from_timestamp(now);
        if current != self.last_reset_month {
            self.used_this_month = 0;
            self.last_reset_month = current;
        }
    }

    /// Whether the monthly quota is used up. Unlimited plans never exhaust.
    pub fn quota_exhausted(&self) -> bool {
        self.monthly_limit != 0 && self.used_this_month >= self.monthly_limit
    }
}
