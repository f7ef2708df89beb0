use axum::extract::State;
use axum::http::StatusCode;

use crate::state::AppState;

/// Handler for `GET /readyz`: ready only when both backing stores answer.
/// Liveness (`/healthz`) stays unconditional; this is what load balancers
/// gate traffic on.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    if let Err(e) = state.db.ping().await {
        tracing::warn!(error = %e, "readiness probe failed: database unreachable");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    if let Err(e) = state.redis.get().await {
        tracing::warn!(error = %e, "readiness probe failed: redis unreachable");
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    StatusCode::OK
}
