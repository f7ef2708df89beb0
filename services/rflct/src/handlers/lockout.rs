use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use foodime_core::identity::IdentityHeaders;

use crate::error::RflctServiceError;
use crate::state::AppState;

// These routes are internal plumbing for the auth flow, so they are gated on
// the admin role like the other privileged surfaces.

// ── POST /lockout/attempts ───────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RecordAttemptRequest {
    pub identifier: String,
}

#[derive(Serialize)]
pub struct RecordAttemptResponse {
    pub attempts: u64,
}

pub async fn record_failed_attempt(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<RecordAttemptRequest>,
) -> Result<Json<RecordAttemptResponse>, RflctServiceError> {
    if !identity.is_admin() {
        return Err(RflctServiceError::Forbidden);
    }
    let attempts = state.lockout().record_failed_attempt(&body.identifier).await;
    Ok(Json(RecordAttemptResponse { attempts }))
}

// ── GET /lockout/{identifier}/locked ─────────────────────────────────────────

#[derive(Serialize)]
pub struct LockedResponse {
    pub locked: bool,
}

pub async fn is_locked(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<LockedResponse>, RflctServiceError> {
    if !identity.is_admin() {
        return Err(RflctServiceError::Forbidden);
    }
    let locked = state.lockout().is_locked(&identifier).await;
    Ok(Json(LockedResponse { locked }))
}

// ── GET /lockout/{identifier}/remaining ──────────────────────────────────────

// Exposes only the remaining minutes, never the failed-attempt count.
#[derive(Serialize)]
pub struct RemainingLockoutResponse {
    pub remaining_minutes: u64,
}

pub async fn remaining_lockout(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<Json<RemainingLockoutResponse>, RflctServiceError> {
    if !identity.is_admin() {
        return Err(RflctServiceError::Forbidden);
    }
    let remaining_minutes = state.lockout().remaining_lockout_minutes(&identifier).await;
    Ok(Json(RemainingLockoutResponse { remaining_minutes }))
}

// ── DELETE /lockout/{identifier} ─────────────────────────────────────────────

pub async fn reset_attempts(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(identifier): Path<String>,
) -> Result<StatusCode, RflctServiceError> {
    if !identity.is_admin() {
        return Err(RflctServiceError::Forbidden);
    }
    state.lockout().reset_attempts(&identifier).await;
    Ok(StatusCode::NO_CONTENT)
}
