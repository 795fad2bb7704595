use thiserror::Error;
use vigil_registry::AdmitError;

/// Why a challenge could not be consumed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConsumeError {
    /// The nonce is unknown — never issued, already consumed (replay), or
    /// already swept.
    #[error("nonce is invalid or was already used")]
    InvalidNonce,

    /// The challenge belongs to a different tenant. The entry is left in
    /// place for its rightful owner.
    #[error("challenge belongs to a different tenant")]
    OwnerMismatch,

    /// The challenge's lifetime has passed. The entry is evicted.
    #[error("challenge has expired")]
    Expired,
}

impl ConsumeError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidNonce => "INVALID_NONCE",
            Self::OwnerMismatch => "OWNER_MISMATCH",
            Self::Expired => "EXPIRED",
        }
    }
}

/// Terminal failures of the verification protocol, distinct from a
/// completed verification that was denied (see `VerifyOutcome::Denied`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("missing or malformed required fields")]
    MissingFields,

    #[error("biometric values must be finite numbers")]
    BadBiometricFormat,

    #[error(transparent)]
    Nonce(#[from] ConsumeError),

    #[error(transparent)]
    Admit(#[from] AdmitError),
}

impl VerifyError {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields => "MISSING_FIELDS",
            Self::BadBiometricFormat => "BAD_BIOMETRIC_FORMAT",
            Self::Nonce(e) => e.code(),
            Self::Admit(e) => e.code(),
        }
    }
}
