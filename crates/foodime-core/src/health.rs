use axum::http::StatusCode;

/// Handler for `GET /healthz` — liveness check. Readiness is service-specific
/// (each service probes its own backing stores) and lives with its handlers.
pub async fn healthz() -> StatusCode {
    StatusCode::OK
}
