use thiserror::Error;

/// Why an API key was refused by the admission gate.
///
/// Every variant carries a stable machine-readable code (see [`code`])
/// that the HTTP layer surfaces to callers.
///
/// [`code`]: AdmitError::code
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AdmitError {
    #[error("no API key supplied")]
    NoKey,

    #[error("unknown API key")]
    InvalidKey,

    #[error("account is blocked")]
    AccountBlocked,

    #[error("account is expired")]
    AccountExpired,

    #[error("subscription has expired")]
    SubscriptionExpired,

    #[error("monthly verification limit reached")]
    LimitReached,
}

impl AdmitError {
    /// Stable machine-readable denial code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoKey => "NO_API_KEY",
            Self::InvalidKey => "INVALID_KEY",
            Self::AccountBlocked => "ACCOUNT_BLOCKED",
            Self::AccountExpired => "ACCOUNT_EXPIRED",
            Self::SubscriptionExpired => "SUBSCRIPTION_EXPIRED",
            Self::LimitReached => "LIMIT_REACHED",
        }
    }
}

/// Errors from admin operations on the registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown API key")]
    UnknownKey,
}
