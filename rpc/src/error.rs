//! RPC error types and their HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use vigil_attest::VerifyError;
use vigil_registry::{AdmitError, RegistryError};

/// Server-level errors (bind/serve failures).
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A request failure, rendered as `{"error": <code>, "message": <text>}`
/// with the matching status code.
#[derive(Clone, Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_admin_credential() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "BAD_ADMIN_CREDENTIAL",
            "missing or invalid admin credential",
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

impl From<AdmitError> for ApiError {
    fn from(e: AdmitError) -> Self {
        let status = match e {
            AdmitError::NoKey | AdmitError::InvalidKey => StatusCode::UNAUTHORIZED,
            AdmitError::AccountBlocked
            | AdmitError::AccountExpired
            | AdmitError::SubscriptionExpired => StatusCode::FORBIDDEN,
            AdmitError::LimitReached => StatusCode::TOO_MANY_REQUESTS,
        };
        Self::new(status, e.code(), e.to_string())
    }
}

impl From<VerifyError> for ApiError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::MissingFields | VerifyError::BadBiometricFormat => {
                Self::new(StatusCode::BAD_REQUEST, e.code(), e.to_string())
            }
            VerifyError::Nonce(nonce_err) => {
                Self::new(StatusCode::FORBIDDEN, nonce_err.code(), nonce_err.to_string())
            }
            VerifyError::Admit(admit_err) => admit_err.into(),
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::UnknownKey => {
                Self::new(StatusCode::NOT_FOUND, "UNKNOWN_KEY", e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_attest::ConsumeError;

    #[test]
    fn admit_errors_map_to_contract_status_codes() {
        assert_eq!(
            ApiError::from(AdmitError::NoKey).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AdmitError::InvalidKey).status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(AdmitError::AccountBlocked).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AdmitError::SubscriptionExpired).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(AdmitError::LimitReached).status,
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn verify_errors_map_to_contract_status_codes() {
        assert_eq!(
            ApiError::from(VerifyError::MissingFields).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(VerifyError::BadBiometricFormat).status,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::from(VerifyError::Nonce(ConsumeError::InvalidNonce)).status,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::from(VerifyError::Nonce(ConsumeError::Expired)).status,
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(ApiError::from(AdmitError::LimitReached).code, "LIMIT_REACHED");
        assert_eq!(
            ApiError::from(VerifyError::Nonce(ConsumeError::OwnerMismatch)).code,
            "OWNER_MISMATCH"
        );
    }
}
