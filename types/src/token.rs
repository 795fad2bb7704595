//! Opaque credential tokens: nonces, session tokens, API keys.
//!
//! Each token is a 128-bit random value, hex-encoded, with a short prefix
//! identifying its kind. Tokens are unguessable identifiers only — they
//! carry no signed content. `Debug` renders a truncated form so credentials
//! never land in logs whole.

use crate::entropy::EntropySource;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the random portion of every token (128 bits).
const TOKEN_BYTES: usize = 16;

fn random_hex(entropy: &dyn EntropySource) -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    entropy.fill(&mut buf);
    hex::encode(buf)
}

/// A single-use challenge nonce.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(String);

impl Nonce {
    pub fn generate(entropy: &dyn EntropySource) -> Self {
        Self(random_hex(entropy))
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({}…)", &self.0[..self.0.len().min(6)])
    }
}

impl fmt::Display for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A session token proving a completed attestation.
///
/// Sessions minted through the duress path carry a distinct prefix; the
/// response envelope around them is otherwise identical to a normal
/// approval.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    pub const PREFIX: &'static str = "vs_";
    pub const DURESS_PREFIX: &'static str = "vd_";

    pub fn generate(entropy: &dyn EntropySource) -> Self {
        Self(format!("{}{}", Self::PREFIX, random_hex(entropy)))
    }

    pub fn generate_duress(entropy: &dyn EntropySource) -> Self {
        Self(format!("{}{}", Self::DURESS_PREFIX, random_hex(entropy)))
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionToken({}…)", &self.0[..self.0.len().min(7)])
    }
}

/// A tenant API key — the primary identifier of a client account.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKey(String);

impl ApiKey {
    pub const PREFIX: &'static str = "vk_";

    pub fn generate(entropy: &dyn EntropySource) -> Self {
        Self(format!("{}{}", Self::PREFIX, random_hex(entropy)))
    }

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ApiKey({}…)", &self.0[..self.0.len().min(7)])
    }
}

/// A caller-supplied device identifier bound into a session.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
