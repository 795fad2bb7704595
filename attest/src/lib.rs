//! The VIGIL attestation engine.
//!
//! Issues short-lived challenges (a displayed code bound to a single-use
//! nonce), verifies responses combining the code with behavioral sensor
//! scores, classifies risk, and mints time-boxed session tokens. A
//! reversed-code response silently signals duress: the caller sees a normal
//! approval while the event is flagged internally.
//!
//! Store layout:
//! - [`NonceStore`] — pending challenges, consumed atomically exactly once
//! - [`SessionStore`] — issued sessions, validated with lazy expiry eviction
//! - [`CleanupSweeper`] — periodic eviction of expired entries from both
//!
//! Expiry is always re-checked at read time; sweeping only bounds memory.

pub mod challenge;
pub mod engine;
pub mod error;
pub mod nonce_store;
pub mod session_store;
pub mod stats;
pub mod sweeper;

pub use challenge::{Challenge, ChallengeCode};
pub use engine::{
    AttestationEngine, BiometricReading, DenyReason, IssuedChallenge, VerifyOutcome, VerifyRequest,
};
pub use error::{ConsumeError, VerifyError};
pub use nonce_store::NonceStore;
pub use session_store::{Session, SessionStore, SessionValidation};
pub use stats::{EngineStats, EngineStatsSnapshot};
pub use sweeper::CleanupSweeper;
