//! Request and response bodies for every route. Wire names are camelCase.

use serde::{Deserialize, Serialize};
use vigil_attest::EngineStatsSnapshot;
use vigil_registry::{Client, UsageLogEntry};
use vigil_types::RiskScore;

// ── Challenge ────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub nonce: String,
    pub challenge_code: [u8; 3],
    pub expiry: u64,
}

// ── Verify ───────────────────────────────────────────────────────────────

/// Top-level fields are optional so their absence maps to the protocol's
/// MISSING_FIELDS rejection rather than a framework-level parse error.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyBody {
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub user_response: Option<Vec<u8>>,
    #[serde(default)]
    pub biometric_data: Option<BiometricBody>,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Individually optional scores: a missing score is treated as a
/// non-finite value and fails the biometric format check downstream.
#[derive(Deserialize)]
pub struct BiometricBody {
    #[serde(default)]
    pub motion: Option<f64>,
    #[serde(default)]
    pub touch: Option<f64>,
    #[serde(default)]
    pub pattern: Option<f64>,
}

/// Approval envelope. Duress approvals use the exact same shape — only
/// the risk score (and token prefix) differ.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyApprovedResponse {
    pub allowed: bool,
    pub risk_score: RiskScore,
    pub session_token: String,
    pub expires_at: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyDeniedResponse {
    pub allowed: bool,
    pub reasons: Vec<String>,
}

// ── Session ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionValidateBody {
    pub session_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionValidResponse {
    pub valid: bool,
    pub risk_score: RiskScore,
    pub device_id: String,
    pub issued_at: u64,
    pub expires_at: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInvalidResponse {
    pub valid: bool,
    /// `"INVALID"` or `"EXPIRED"`.
    pub status: &'static str,
}

// ── Admin: tenants ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientBody {
    pub name: String,
    pub plan: vigil_types::Plan,
    #[serde(default)]
    pub monthly_limit: Option<u64>,
    #[serde(default)]
    pub duration_days: Option<u32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewBody {
    pub duration_days: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientView {
    pub api_key: String,
    pub name: String,
    pub plan: vigil_types::Plan,
    pub status: vigil_types::ClientStatus,
    pub created_at: u64,
    pub expires_at: Option<u64>,
    pub monthly_limit: u64,
    pub used_this_month: u64,
    pub last_reset_month: String,
    pub total_verifications: u64,
}

impl From<Client> for ClientView {
    fn from(c: Client) -> Self {
        Self {
            api_key: c.api_key.as_str().to_string(),
            name: c.name,
            plan: c.plan,
            status: c.status,
            created_at: c.created_at.as_secs(),
            expires_at: c.expires_at.map(|t| t.as_secs()),
            monthly_limit: c.monthly_limit,
            used_this_month: c.used_this_month,
            last_reset_month: c.last_reset_month.to_string(),
            total_verifications: c.total_verifications,
        }
    }
}

#[derive(Serialize)]
pub struct DeletedResponse {
    pub deleted: bool,
}

// ── Admin: usage log & stats ─────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageQuery {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageEntryView {
    pub timestamp: u64,
    pub api_key: String,
    pub action: vigil_registry::UsageAction,
    pub result: String,
    pub details: String,
}

impl From<UsageLogEntry> for UsageEntryView {
    fn from(e: UsageLogEntry) -> Self {
        Self {
            timestamp: e.timestamp.as_secs(),
            api_key: e.owner_key.as_str().to_string(),
            action: e.action,
            result: e.result,
            details: e.details,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    #[serde(flatten)]
    pub counters: EngineStatsSnapshot,
    pub pending_challenges: usize,
    pub active_sessions: usize,
    pub client_count: usize,
}
