//! End-to-end tests of the attestation protocol: tenant admission →
//! challenge issuance → verification (normal, duress, replay, expiry) →
//! session validation → quota accounting.

use std::sync::Arc;

use vigil_attest::{
    AttestationEngine, BiometricReading, SessionValidation, VerifyError, VerifyOutcome,
    VerifyRequest,
};
use vigil_nullables::NullEntropy;
use vigil_registry::{AdmitError, ClientRegistry, UsageAction, UsageLog};
use vigil_types::{
    ApiKey, AttestParams, DeviceId, EntropySource, Plan, RiskScore, SessionToken, SystemEntropy,
    Timestamp,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn t0() -> Timestamp {
    Timestamp::new(1_700_000_000)
}

fn build_engine(
    monthly_limit: Option<u64>,
    entropy: Arc<dyn EntropySource>,
) -> (AttestationEngine, ApiKey) {
    let registry = Arc::new(ClientRegistry::new(Arc::new(SystemEntropy)));
    let client = registry.create("acme", Plan::Starter, monthly_limit, 90, t0());
    let engine = AttestationEngine::new(
        registry,
        Arc::new(UsageLog::new()),
        entropy,
        AttestParams::default(),
    );
    (engine, client.api_key)
}

/// Engine whose next challenge will carry the code 4-1-9.
fn engine_with_pinned_code() -> (AttestationEngine, ApiKey) {
    // Script entries feed fills in order: nonce, code, then session token.
    let entropy = NullEntropy::new(vec![vec![0x11], vec![4, 1, 9], vec![0x22]]);
    build_engine(None, Arc::new(entropy))
}

fn biometrics(motion: f64, touch: f64, pattern: f64) -> BiometricReading {
    BiometricReading {
        motion,
        touch,
        pattern,
    }
}

fn request(nonce: &vigil_types::Nonce, response: &[u8], bio: BiometricReading) -> VerifyRequest {
    VerifyRequest {
        nonce: nonce.clone(),
        response: response.to_vec(),
        biometric: bio,
        device_id: Some(DeviceId::new("device-1")),
    }
}

// ---------------------------------------------------------------------------
// Scenario: happy path
// ---------------------------------------------------------------------------

#[test]
fn happy_path_pins_the_low_risk_boundary() {
    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();
    assert_eq!(issued.code.digits(), [4, 1, 9]);
    assert_eq!(issued.expires_at, t0().plus(60));

    let outcome = engine
        .verify(
            Some(&key),
            &request(&issued.nonce, &[4, 1, 9], biometrics(0.5, 0.5, 0.5)),
            t0().plus(5),
        )
        .unwrap();

    // avg 0.5 is below the exclusive 0.7 floor: Medium, not Low
    match outcome {
        VerifyOutcome::Approved { session } => {
            assert_eq!(session.risk, RiskScore::Medium);
            assert!(session.token.as_str().starts_with(SessionToken::PREFIX));
            assert_eq!(session.expiry, t0().plus(5).plus(300));
        }
        other => panic!("expected approval, got {other:?}"),
    }

    // Usage recorded exactly once
    let stored = engine.registry().lookup(&key).unwrap();
    assert_eq!(stored.used_this_month, 1);
    assert_eq!(stored.total_verifications, 1);
}

// ---------------------------------------------------------------------------
// Scenario: duress
// ---------------------------------------------------------------------------

#[test]
fn reversed_code_approves_with_critical_risk() {
    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();

    let outcome = engine
        .verify(
            Some(&key),
            &request(&issued.nonce, &[9, 1, 4], biometrics(0.0, 0.0, 0.0)),
            t0().plus(5),
        )
        .unwrap();

    match outcome {
        VerifyOutcome::Approved { session } => {
            assert_eq!(session.risk, RiskScore::Critical);
            assert!(session
                .token
                .as_str()
                .starts_with(SessionToken::DURESS_PREFIX));
        }
        other => panic!("expected (apparent) approval, got {other:?}"),
    }

    // The event is flagged internally…
    let snap = engine.stats();
    assert_eq!(snap.duress_signals, 1);
    assert_eq!(snap.verify_approved, 1);
    assert!(engine
        .usage_log()
        .entries_for(&key)
        .iter()
        .any(|e| e.action == UsageAction::DuressSignal));

    // …and still consumes quota like any approval
    assert_eq!(engine.registry().lookup(&key).unwrap().used_this_month, 1);
}

#[test]
fn duress_bypasses_biometric_validation_entirely() {
    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();

    // A payload that would fail BAD_BIOMETRIC_FORMAT on the normal path
    let outcome = engine
        .verify(
            Some(&key),
            &request(
                &issued.nonce,
                &[9, 1, 4],
                biometrics(f64::NAN, f64::INFINITY, 0.5),
            ),
            t0(),
        )
        .unwrap();

    assert!(matches!(outcome, VerifyOutcome::Approved { .. }));
}

#[test]
fn palindromic_code_cannot_signal_duress() {
    let entropy = NullEntropy::new(vec![vec![0x11], vec![3, 1, 3], vec![0x22]]);
    let (engine, key) = build_engine(None, Arc::new(entropy));
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();
    assert!(issued.code.is_palindrome());

    // The reversed code equals the code itself, so this resolves as a
    // normal approval — the documented limitation of the scheme.
    let outcome = engine
        .verify(
            Some(&key),
            &request(&issued.nonce, &[3, 1, 3], biometrics(0.9, 0.9, 0.9)),
            t0(),
        )
        .unwrap();

    match outcome {
        VerifyOutcome::Approved { session } => {
            assert_eq!(session.risk, RiskScore::Low);
            assert!(session.token.as_str().starts_with(SessionToken::PREFIX));
        }
        other => panic!("expected approval, got {other:?}"),
    }
    assert_eq!(engine.stats().duress_signals, 0);
}

// ---------------------------------------------------------------------------
// Scenario: replay and one-time use
// ---------------------------------------------------------------------------

#[test]
fn second_verify_of_same_nonce_is_replay() {
    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();
    let req = request(&issued.nonce, &[4, 1, 9], biometrics(0.5, 0.5, 0.5));

    assert!(matches!(
        engine.verify(Some(&key), &req, t0()).unwrap(),
        VerifyOutcome::Approved { .. }
    ));
    assert!(matches!(
        engine.verify(Some(&key), &req, t0()),
        Err(VerifyError::Nonce(
            vigil_attest::ConsumeError::InvalidNonce
        ))
    ));
}

#[test]
fn concurrent_verifies_yield_exactly_one_success() {
    use std::thread;

    let (engine, key) = build_engine(None, Arc::new(SystemEntropy));
    let engine = Arc::new(engine);
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();
    let correct = issued.code.digits();

    let mut handles = Vec::new();
    for _ in 0..8 {
        let engine = Arc::clone(&engine);
        let key = key.clone();
        let nonce = issued.nonce.clone();
        handles.push(thread::spawn(move || {
            engine.verify(
                Some(&key),
                &request(&nonce, &correct, biometrics(0.5, 0.5, 0.5)),
                t0(),
            )
        }));
    }

    let mut successes = 0;
    let mut replays = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(VerifyOutcome::Approved { .. }) | Ok(VerifyOutcome::Denied { .. }) => {
                successes += 1
            }
            Err(VerifyError::Nonce(vigil_attest::ConsumeError::InvalidNonce)) => replays += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(replays, 7);
    assert_eq!(engine.registry().lookup(&key).unwrap().used_this_month, 1);
}

// ---------------------------------------------------------------------------
// Expiry
// ---------------------------------------------------------------------------

#[test]
fn expired_challenge_fails_without_any_sweep() {
    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();

    // Still resident in the store, but past its expiry
    assert_eq!(engine.nonce_store().pending_count(), 1);
    assert!(matches!(
        engine.verify(
            Some(&key),
            &request(&issued.nonce, &[4, 1, 9], biometrics(0.5, 0.5, 0.5)),
            t0().plus(61),
        ),
        Err(VerifyError::Nonce(vigil_attest::ConsumeError::Expired))
    ));
}

#[test]
fn session_expiry_distinguishes_expired_from_invalid() {
    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();
    let outcome = engine
        .verify(
            Some(&key),
            &request(&issued.nonce, &[4, 1, 9], biometrics(0.5, 0.5, 0.5)),
            t0(),
        )
        .unwrap();
    let VerifyOutcome::Approved { session } = outcome else {
        panic!("expected approval");
    };

    assert!(matches!(
        engine.validate_session(&session.token, t0().plus(300)),
        SessionValidation::Valid(_)
    ));
    assert!(matches!(
        engine.validate_session(&session.token, t0().plus(301)),
        SessionValidation::Expired
    ));
    // Evicted by the failed validation: now unknown
    assert!(matches!(
        engine.validate_session(&session.token, t0().plus(302)),
        SessionValidation::Invalid
    ));
}

// ---------------------------------------------------------------------------
// Denial reasons
// ---------------------------------------------------------------------------

#[test]
fn all_applicable_reasons_are_reported_together() {
    use vigil_attest::DenyReason;

    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();

    let outcome = engine
        .verify(
            Some(&key),
            &request(&issued.nonce, &[1, 2, 3], biometrics(0.0, 0.5, 0.05)),
            t0(),
        )
        .unwrap();

    match outcome {
        VerifyOutcome::Denied { reasons } => {
            assert_eq!(
                reasons,
                vec![
                    DenyReason::WrongCode,
                    DenyReason::NoMotion,
                    DenyReason::NoPattern
                ]
            );
        }
        other => panic!("expected denial, got {other:?}"),
    }
    assert_eq!(engine.stats().verify_denied, 1);
    // Denials never consume quota
    assert_eq!(engine.registry().lookup(&key).unwrap().used_this_month, 0);
}

#[test]
fn correct_code_with_no_active_sensors_is_denied() {
    use vigil_attest::DenyReason;

    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();

    let outcome = engine
        .verify(
            Some(&key),
            &request(&issued.nonce, &[4, 1, 9], biometrics(0.1, 0.15, 0.10)),
            t0(),
        )
        .unwrap();

    match outcome {
        VerifyOutcome::Denied { reasons } => {
            assert_eq!(
                reasons,
                vec![
                    DenyReason::NoMotion,
                    DenyReason::NoTouch,
                    DenyReason::NoPattern
                ]
            );
        }
        other => panic!("expected denial, got {other:?}"),
    }
}

#[test]
fn single_active_sensor_is_enough() {
    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();

    let outcome = engine
        .verify(
            Some(&key),
            &request(&issued.nonce, &[4, 1, 9], biometrics(0.5, 0.0, 0.0)),
            t0(),
        )
        .unwrap();

    match outcome {
        VerifyOutcome::Approved { session } => {
            // avg ≈ 0.167 → High
            assert_eq!(session.risk, RiskScore::High);
        }
        other => panic!("expected approval, got {other:?}"),
    }
}

#[test]
fn malformed_biometrics_fail_on_the_normal_path() {
    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();

    assert!(matches!(
        engine.verify(
            Some(&key),
            &request(&issued.nonce, &[4, 1, 9], biometrics(f64::NAN, 0.5, 0.5)),
            t0(),
        ),
        Err(VerifyError::BadBiometricFormat)
    ));
}

#[test]
fn wrong_length_response_is_malformed() {
    let (engine, key) = engine_with_pinned_code();
    let issued = engine.issue_challenge(Some(&key), t0()).unwrap();

    assert!(matches!(
        engine.verify(
            Some(&key),
            &request(&issued.nonce, &[4, 1], biometrics(0.5, 0.5, 0.5)),
            t0(),
        ),
        Err(VerifyError::MissingFields)
    ));
    // The malformed attempt never reached the nonce store
    assert_eq!(engine.nonce_store().pending_count(), 1);
}

// ---------------------------------------------------------------------------
// Risk classification through the full pipeline
// ---------------------------------------------------------------------------

#[test]
fn risk_classification_boundaries() {
    let cases = [
        (biometrics(0.71, 0.71, 0.71), RiskScore::Low),
        (biometrics(0.7, 0.7, 0.7), RiskScore::Medium),
        (biometrics(0.41, 0.41, 0.41), RiskScore::Medium),
        // Averages to exactly 0.4 (nearest representable below it): High
        (biometrics(0.3, 0.4, 0.5), RiskScore::High),
    ];

    for (bio, expected) in cases {
        let (engine, key) = build_engine(None, Arc::new(SystemEntropy));
        let issued = engine.issue_challenge(Some(&key), t0()).unwrap();
        let outcome = engine
            .verify(
                Some(&key),
                &request(&issued.nonce, &issued.code.digits(), bio),
                t0(),
            )
            .unwrap();
        match outcome {
            VerifyOutcome::Approved { session } => assert_eq!(
                session.risk, expected,
                "biometrics {bio:?} should classify as {expected:?}"
            ),
            other => panic!("expected approval for {bio:?}, got {other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tenant gate and quotas
// ---------------------------------------------------------------------------

#[test]
fn blocked_tenant_gets_no_challenge() {
    let (engine, key) = build_engine(None, Arc::new(SystemEntropy));
    engine.registry().block(&key).unwrap();

    assert!(matches!(
        engine.issue_challenge(Some(&key), t0()),
        Err(AdmitError::AccountBlocked)
    ));
    // No challenge was created
    assert_eq!(engine.nonce_store().pending_count(), 0);
}

#[test]
fn missing_and_unknown_keys_are_denied() {
    let (engine, _key) = build_engine(None, Arc::new(SystemEntropy));

    assert!(matches!(
        engine.issue_challenge(None, t0()),
        Err(AdmitError::NoKey)
    ));
    assert!(matches!(
        engine.issue_challenge(Some(&ApiKey::new("vk_ghost")), t0()),
        Err(AdmitError::InvalidKey)
    ));
}

#[test]
fn quota_gates_issuance_and_resets_after_month_rollover() {
    let (engine, key) = build_engine(Some(2), Arc::new(SystemEntropy));

    for i in 0..2u64 {
        let now = t0().plus(i * 10);
        let issued = engine.issue_challenge(Some(&key), now).unwrap();
        let outcome = engine
            .verify(
                Some(&key),
                &request(&issued.nonce, &issued.code.digits(), biometrics(0.5, 0.5, 0.5)),
                now,
            )
            .unwrap();
        assert!(matches!(outcome, VerifyOutcome::Approved { .. }));
    }

    // Limit consumed: the gate refuses a third challenge this month
    assert!(matches!(
        engine.issue_challenge(Some(&key), t0().plus(100)),
        Err(AdmitError::LimitReached)
    ));

    // A month later the lazy reset re-admits the tenant
    let next_month = t0().plus(32 * 86_400);
    let issued = engine.issue_challenge(Some(&key), next_month).unwrap();
    let outcome = engine
        .verify(
            Some(&key),
            &request(&issued.nonce, &issued.code.digits(), biometrics(0.5, 0.5, 0.5)),
            next_month,
        )
        .unwrap();
    assert!(matches!(outcome, VerifyOutcome::Approved { .. }));

    let stored = engine.registry().lookup(&key).unwrap();
    assert_eq!(stored.used_this_month, 1);
    assert_eq!(stored.total_verifications, 3);
}

#[test]
fn verify_against_another_tenants_nonce_is_owner_mismatch() {
    let registry = Arc::new(ClientRegistry::new(Arc::new(SystemEntropy)));
    let alice = registry.create("alice", Plan::Starter, None, 90, t0());
    let mallory = registry.create("mallory", Plan::Starter, None, 90, t0());
    let engine = AttestationEngine::new(
        registry,
        Arc::new(UsageLog::new()),
        Arc::new(SystemEntropy),
        AttestParams::default(),
    );

    let issued = engine.issue_challenge(Some(&alice.api_key), t0()).unwrap();

    assert!(matches!(
        engine.verify(
            Some(&mallory.api_key),
            &request(&issued.nonce, &issued.code.digits(), biometrics(0.5, 0.5, 0.5)),
            t0(),
        ),
        Err(VerifyError::Nonce(
            vigil_attest::ConsumeError::OwnerMismatch
        ))
    ));

    // The challenge survives for its rightful owner
    let outcome = engine
        .verify(
            Some(&alice.api_key),
            &request(&issued.nonce, &issued.code.digits(), biometrics(0.5, 0.5, 0.5)),
            t0(),
        )
        .unwrap();
    assert!(matches!(outcome, VerifyOutcome::Approved { .. }));
}
