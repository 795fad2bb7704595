//! Axum router and request handlers.

use crate::error::{ApiError, RpcError};
use crate::handlers::*;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use std::sync::Arc;
use tokio::sync::broadcast;
use vigil_attest::{
    AttestationEngine, BiometricReading, SessionValidation, VerifyError, VerifyOutcome,
    VerifyRequest,
};
use vigil_registry::{UsageAction, DEFAULT_DURATION_DAYS};
use vigil_types::{ApiKey, DeviceId, Nonce, SessionToken, Timestamp};

/// Header carrying the tenant API key.
pub const API_KEY_HEADER: &str = "x-api-key";
/// Header carrying the admin credential.
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AttestationEngine>,
    /// Admin credential. `None` disables the whole admin surface.
    pub admin_token: Option<String>,
}

/// Build the full route table.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/challenge", post(challenge))
        .route("/verify", post(verify))
        .route("/session/validate", post(validate_session))
        .route("/admin/clients", post(create_client).get(list_clients))
        .route("/admin/clients/:key/block", post(block_client))
        .route("/admin/clients/:key/unblock", post(unblock_client))
        .route("/admin/clients/:key/renew", post(renew_client))
        .route("/admin/clients/:key", delete(delete_client))
        .route("/admin/usage", get(usage_log))
        .route("/admin/stats", get(stats))
        .with_state(state)
}

/// The HTTP server: binds a port and serves the router until shutdown.
pub struct RpcServer {
    pub port: u16,
}

impl RpcServer {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    /// Bind and serve until the shutdown channel fires.
    pub async fn serve(
        &self,
        state: AppState,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), RpcError> {
        let listener = tokio::net::TcpListener::bind(("0.0.0.0", self.port)).await?;
        tracing::info!(port = self.port, "API server listening");
        axum::serve(listener, router(state))
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;
        Ok(())
    }
}

fn api_key_from(headers: &HeaderMap) -> Option<ApiKey> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(ApiKey::new)
}

fn require_admin(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = state
        .admin_token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(ApiError::bad_admin_credential)?;
    let provided = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if provided == Some(expected) {
        Ok(())
    } else {
        Err(ApiError::bad_admin_credential())
    }
}

// ── Public routes ────────────────────────────────────────────────────────

async fn challenge(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ChallengeResponse>, ApiError> {
    let key = api_key_from(&headers);
    let issued = state.engine.issue_challenge(key.as_ref(), Timestamp::now())?;
    Ok(Json(ChallengeResponse {
        nonce: issued.nonce.to_string(),
        challenge_code: issued.code.digits(),
        expiry: issued.expires_at.as_secs(),
    }))
}

async fn verify(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<VerifyBody>,
) -> Result<Response, ApiError> {
    let key = api_key_from(&headers);
    let (Some(nonce), Some(response), Some(biometric)) =
        (body.nonce, body.user_response, body.biometric_data)
    else {
        return Err(VerifyError::MissingFields.into());
    };
    let request = VerifyRequest {
        nonce: Nonce::new(nonce),
        response,
        biometric: BiometricReading {
            // Absent scores fail the finiteness check downstream
            motion: biometric.motion.unwrap_or(f64::NAN),
            touch: biometric.touch.unwrap_or(f64::NAN),
            pattern: biometric.pattern.unwrap_or(f64::NAN),
        },
        device_id: body.device_id.map(DeviceId::new),
    };

    match state.engine.verify(key.as_ref(), &request, Timestamp::now())? {
        VerifyOutcome::Approved { session } => Ok(Json(VerifyApprovedResponse {
            allowed: true,
            risk_score: session.risk,
            session_token: session.token.as_str().to_string(),
            expires_at: session.expiry.as_secs(),
        })
        .into_response()),
        VerifyOutcome::Denied { reasons } => Ok((
            StatusCode::UNAUTHORIZED,
            Json(VerifyDeniedResponse {
                allowed: false,
                reasons: reasons.iter().map(|r| r.as_str().to_string()).collect(),
            }),
        )
            .into_response()),
    }
}

async fn validate_session(
    State(state): State<AppState>,
    Json(body): Json<SessionValidateBody>,
) -> Response {
    let token = SessionToken::new(body.session_token);
    match state.engine.validate_session(&token, Timestamp::now()) {
        SessionValidation::Valid(session) => Json(SessionValidResponse {
            valid: true,
            risk_score: session.risk,
            device_id: session.device_id.as_str().to_string(),
            issued_at: session.issued_at.as_secs(),
            expires_at: session.expiry.as_secs(),
        })
        .into_response(),
        SessionValidation::Invalid => Json(SessionInvalidResponse {
            valid: false,
            status: "INVALID",
        })
        .into_response(),
        SessionValidation::Expired => Json(SessionInvalidResponse {
            valid: false,
            status: "EXPIRED",
        })
        .into_response(),
    }
}

// ── Admin routes ─────────────────────────────────────────────────────────

async fn create_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<CreateClientBody>,
) -> Result<Json<ClientView>, ApiError> {
    require_admin(&state, &headers)?;
    let now = Timestamp::now();
    let client = state.engine.registry().create(
        body.name,
        body.plan,
        body.monthly_limit,
        body.duration_days.unwrap_or(DEFAULT_DURATION_DAYS),
        now,
    );
    state.engine.usage_log().record(
        now,
        client.api_key.clone(),
        UsageAction::Admin,
        "created",
        format!("plan {}", client.plan.as_str()),
    );
    Ok(Json(client.into()))
}

async fn list_clients(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<ClientView>>, ApiError> {
    require_admin(&state, &headers)?;
    let clients = state
        .engine
        .registry()
        .list()
        .into_iter()
        .map(ClientView::from)
        .collect();
    Ok(Json(clients))
}

async fn block_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<Json<ClientView>, ApiError> {
    require_admin(&state, &headers)?;
    let key = ApiKey::new(key);
    let client = state.engine.registry().block(&key)?;
    state.engine.usage_log().record(
        Timestamp::now(),
        key,
        UsageAction::Admin,
        "blocked",
        "",
    );
    Ok(Json(client.into()))
}

async fn unblock_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<Json<ClientView>, ApiError> {
    require_admin(&state, &headers)?;
    let key = ApiKey::new(key);
    let client = state.engine.registry().unblock(&key)?;
    state.engine.usage_log().record(
        Timestamp::now(),
        key,
        UsageAction::Admin,
        "unblocked",
        "",
    );
    Ok(Json(client.into()))
}

async fn renew_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
    Json(body): Json<RenewBody>,
) -> Result<Json<ClientView>, ApiError> {
    require_admin(&state, &headers)?;
    let key = ApiKey::new(key);
    let now = Timestamp::now();
    let client = state.engine.registry().renew(&key, body.duration_days, now)?;
    state.engine.usage_log().record(
        now,
        key,
        UsageAction::Admin,
        "renewed",
        format!("{} days", body.duration_days),
    );
    Ok(Json(client.into()))
}

async fn delete_client(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(key): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let key = ApiKey::new(key);
    state.engine.registry().delete(&key)?;
    state.engine.usage_log().record(
        Timestamp::now(),
        key,
        UsageAction::Admin,
        "deleted",
        "",
    );
    Ok(Json(DeletedResponse { deleted: true }))
}

async fn usage_log(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<UsageQuery>,
) -> Result<Json<Vec<UsageEntryView>>, ApiError> {
    require_admin(&state, &headers)?;
    let log = state.engine.usage_log();
    let entries = match query.api_key {
        Some(key) => log.entries_for(&ApiKey::new(key)),
        None => log.entries(),
    };
    let limit = query.limit.unwrap_or(usize::MAX);
    let views = entries
        .into_iter()
        .rev() // newest first
        .take(limit)
        .map(UsageEntryView::from)
        .collect();
    Ok(Json(views))
}

async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatsResponse>, ApiError> {
    require_admin(&state, &headers)?;
    let engine = &state.engine;
    Ok(Json(StatsResponse {
        counters: engine.stats(),
        pending_challenges: engine.nonce_store().pending_count(),
        active_sessions: engine.session_store().active_count(),
        client_count: engine.registry().client_count(),
    }))
}
