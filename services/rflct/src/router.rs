use axum::{
    Router,
    routing::{delete, get, patch, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use foodime_core::health::healthz;
use foodime_core::middleware::request_id_layer;

use crate::handlers::{
    code::{
        code_analytics, create_code, deactivate_code, generate_codes, list_codes, my_codes,
        verify_code,
    },
    health::readyz,
    lockout::{is_locked, record_failed_attempt, remaining_lockout, reset_attempts},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Code registry
        .route("/rflct/codes", post(create_code))
        .route("/rflct/codes", get(list_codes))
        .route("/rflct/codes/verify", post(verify_code))
        .route("/rflct/codes/generate", get(generate_codes))
        .route("/rflct/codes/{code}/deactivate", patch(deactivate_code))
        .route("/rflct/my-codes", get(my_codes))
        .route("/rflct/analytics", get(code_analytics))
        // Lockout tracker (internal, called by the auth flow)
        .route("/lockout/attempts", post(record_failed_attempt))
        .route("/lockout/{identifier}/locked", get(is_locked))
        .route("/lockout/{identifier}/remaining", get(remaining_lockout))
        .route("/lockout/{identifier}", delete(reset_attempts))
        .layer(
            ServiceBuilder::new()
                .layer(request_id_layer())
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}
