//! The attestation engine — challenge issuance and response verification.
//!
//! Verification order matters and is part of the protocol: the admission
//! gate runs first, then the atomic nonce consume, then the duress check
//! (before biometric validation — a duress response is approved no matter
//! what the sensor payload looks like), then code + sensor checks with risk
//! classification. Usage is recorded exactly once, only on approval.

use crate::challenge::ChallengeCode;
use crate::error::VerifyError;
use crate::nonce_store::NonceStore;
use crate::session_store::{Session, SessionStore, SessionValidation};
use crate::stats::{EngineStats, EngineStatsSnapshot};
use std::fmt;
use std::sync::Arc;
use vigil_registry::{AdmitError, ClientRegistry, UsageAction, UsageLog};
use vigil_types::{
    ApiKey, AttestParams, DeviceId, EntropySource, Nonce, RiskScore, SessionToken, Timestamp,
};

/// Behavioral sensor scores, as computed by the caller's device.
///
/// The engine treats these as opaque signal strengths and only applies
/// fixed thresholds; it is not a liveness model.
#[derive(Clone, Copy, Debug)]
pub struct BiometricReading {
    pub motion: f64,
    pub touch: f64,
    pub pattern: f64,
}

impl BiometricReading {
    /// All three scores are finite real numbers.
    pub fn is_finite(&self) -> bool {
        self.motion.is_finite() && self.touch.is_finite() && self.pattern.is_finite()
    }

    pub fn average(&self) -> f64 {
        (self.motion + self.touch + self.pattern) / 3.0
    }
}

/// A verification attempt against an issued challenge.
#[derive(Clone, Debug)]
pub struct VerifyRequest {
    pub nonce: Nonce,
    /// The digit sequence the user entered.
    pub response: Vec<u8>,
    pub biometric: BiometricReading,
    pub device_id: Option<DeviceId>,
}

/// A freshly issued challenge, as returned to the caller. The code is
/// shown to a human; its secrecy lies in the single-use tenant-scoped
/// nonce it is bound to.
#[derive(Clone, Debug)]
pub struct IssuedChallenge {
    pub nonce: Nonce,
    pub code: ChallengeCode,
    pub expires_at: Timestamp,
}

/// One failed verification check. Denials report every applicable reason
/// together, not just the first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    WrongCode,
    NoMotion,
    NoTouch,
    NoPattern,
}

impl DenyReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WrongCode => "wrong code",
            Self::NoMotion => "no motion",
            Self::NoTouch => "no touch",
            Self::NoPattern => "no pattern",
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a verification that ran to completion.
#[derive(Clone, Debug)]
pub enum VerifyOutcome {
    Approved { session: Session },
    Denied { reasons: Vec<DenyReason> },
}

/// The attestation engine. Owns the nonce and session stores; consults the
/// client registry for admission and quota accounting.
pub struct AttestationEngine {
    registry: Arc<ClientRegistry>,
    usage_log: Arc<UsageLog>,
    nonces: Arc<NonceStore>,
    sessions: Arc<SessionStore>,
    stats: EngineStats,
    entropy: Arc<dyn EntropySource>,
    params: AttestParams,
}

impl AttestationEngine {
    pub fn new(
        registry: Arc<ClientRegistry>,
        usage_log: Arc<UsageLog>,
        entropy: Arc<dyn EntropySource>,
        params: AttestParams,
    ) -> Self {
        Self {
            registry,
            usage_log,
            nonces: Arc::new(NonceStore::new()),
            sessions: Arc::new(SessionStore::new()),
            stats: EngineStats::new(),
            entropy,
            params,
        }
    }

    /// Issue a challenge for the tenant behind `api_key`.
    ///
    /// Safe for callers to retry: each call issues an independent
    /// challenge, and unverified ones simply expire.
    pub fn issue_challenge(
        &self,
        api_key: Option<&ApiKey>,
        now: Timestamp,
    ) -> Result<IssuedChallenge, AdmitError> {
        let key = api_key.ok_or(AdmitError::NoKey)?;
        self.registry.admit(Some(key), now)?;

        let challenge =
            self.nonces
                .issue(self.entropy.as_ref(), key, now, self.params.challenge_ttl_secs);
        self.stats.record_challenge_issued();
        self.usage_log
            .record(now, key.clone(), UsageAction::ChallengeIssued, "issued", "");
        tracing::debug!(owner = ?key, nonce = ?challenge.nonce, "challenge issued");

        Ok(IssuedChallenge {
            nonce: challenge.nonce,
            code: challenge.code,
            expires_at: challenge.expiry,
        })
    }

    /// Verify a response against its challenge. See the module docs for
    /// the protocol order. Not retryable: the nonce is consumed.
    pub fn verify(
        &self,
        api_key: Option<&ApiKey>,
        request: &VerifyRequest,
        now: Timestamp,
    ) -> Result<VerifyOutcome, VerifyError> {
        self.stats.record_verify_attempt();

        let key = api_key.ok_or(AdmitError::NoKey)?;
        self.registry.admit(Some(key), now)?;

        let digits: [u8; ChallengeCode::LENGTH] = request
            .response
            .as_slice()
            .try_into()
            .map_err(|_| VerifyError::MissingFields)?;
        let response = ChallengeCode::from_digits(digits).ok_or(VerifyError::MissingFields)?;

        let challenge = self.nonces.consume(&request.nonce, key, now)?;

        let server_code = challenge.code.joined();
        let user_code = response.joined();
        let panic_code = challenge.code.reversed().joined();

        let device = request
            .device_id
            .clone()
            .unwrap_or_else(|| DeviceId::new("unknown"));

        // Duress: the reversed code approves without ever looking at the
        // biometric payload, so the response is indistinguishable from a
        // normal approval. Palindromic codes cannot signal duress.
        if user_code == panic_code && panic_code != server_code {
            self.registry.record_usage(key, now)?;
            let session = self.sessions.issue(
                self.entropy.as_ref(),
                key,
                device.clone(),
                RiskScore::Critical,
                challenge.nonce.clone(),
                now,
                self.params.session_ttl_secs,
            );
            self.stats.record_approved();
            self.stats.record_duress();
            self.usage_log.record(
                now,
                key.clone(),
                UsageAction::DuressSignal,
                "approved",
                format!("device {}", device.as_str()),
            );
            tracing::warn!(owner = ?key, device = %device.as_str(), "duress code received, silent alarm raised");
            return Ok(VerifyOutcome::Approved { session });
        }

        if !request.biometric.is_finite() {
            return Err(VerifyError::BadBiometricFormat);
        }

        let motion_ok = request.biometric.motion > self.params.motion_threshold;
        let touch_ok = request.biometric.touch > self.params.touch_threshold;
        let pattern_ok = request.biometric.pattern > self.params.pattern_threshold;
        let active_sensors = [motion_ok, touch_ok, pattern_ok]
            .iter()
            .filter(|ok| **ok)
            .count();
        let code_ok = user_code == server_code;

        let mut reasons = Vec::new();
        if !code_ok {
            reasons.push(DenyReason::WrongCode);
        }
        if !motion_ok {
            reasons.push(DenyReason::NoMotion);
        }
        if !touch_ok {
            reasons.push(DenyReason::NoTouch);
        }
        if !pattern_ok {
            reasons.push(DenyReason::NoPattern);
        }

        if code_ok && active_sensors >= self.params.min_active_sensors {
            self.registry.record_usage(key, now)?;
            let risk = classify_risk(request.biometric.average(), &self.params);
            let session = self.sessions.issue(
                self.entropy.as_ref(),
                key,
                device,
                risk,
                challenge.nonce.clone(),
                now,
                self.params.session_ttl_secs,
            );
            self.stats.record_approved();
            self.usage_log.record(
                now,
                key.clone(),
                UsageAction::Verify,
                "approved",
                format!("risk {risk}"),
            );
            tracing::debug!(owner = ?key, risk = %risk, "attestation approved");
            Ok(VerifyOutcome::Approved { session })
        } else {
            self.stats.record_denied();
            let detail = reasons
                .iter()
                .map(DenyReason::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            self.usage_log
                .record(now, key.clone(), UsageAction::Verify, "denied", detail);
            tracing::debug!(owner = ?key, ?reasons, "attestation denied");
            Ok(VerifyOutcome::Denied { reasons })
        }
    }

    /// Validate a session token.
    pub fn validate_session(&self, token: &SessionToken, now: Timestamp) -> SessionValidation {
        self.sessions.validate(token, now)
    }

    pub fn registry(&self) -> &Arc<ClientRegistry> {
        &self.registry
    }

    pub fn usage_log(&self) -> &Arc<UsageLog> {
        &self.usage_log
    }

    pub fn nonce_store(&self) -> &Arc<NonceStore> {
        &self.nonces
    }

    pub fn session_store(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn stats(&self) -> EngineStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn params(&self) -> &AttestParams {
        &self.params
    }
}

/// Classify average signal strength into a risk score. Both floors are
/// exclusive: an average of exactly 0.7 is Medium, exactly 0.4 is High.
fn classify_risk(avg: f64, params: &AttestParams) -> RiskScore {
    if avg > params.low_risk_floor {
        RiskScore::Low
    } else if avg > params.medium_risk_floor {
        RiskScore::Medium
    } else {
        RiskScore::High
    }
}
