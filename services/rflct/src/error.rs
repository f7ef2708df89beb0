use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// RFLCT service domain error variants.
///
/// Uniqueness conflicts during code generation are retried internally and
/// never appear here; only `GenerationExhausted` surfaces once the retry
/// budget is spent. `CodeInactive` is deliberately distinct from
/// `CodeNotFound` so callers can message "code revoked" vs "code never
/// existed".
#[derive(Debug, thiserror::Error)]
pub enum RflctServiceError {
    #[error("unrecognized code type")]
    InvalidCodeType,
    #[error("code must be a 4-digit number")]
    InvalidCodeFormat,
    #[error("code not found")]
    CodeNotFound,
    #[error("code is inactive")]
    CodeInactive,
    #[error("could not allocate a unique code")]
    GenerationExhausted,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl RflctServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCodeType => "INVALID_CODE_TYPE",
            Self::InvalidCodeFormat => "INVALID_CODE_FORMAT",
            Self::CodeNotFound => "CODE_NOT_FOUND",
            Self::CodeInactive => "CODE_INACTIVE",
            Self::GenerationExhausted => "GENERATION_EXHAUSTED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for RflctServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::InvalidCodeType | Self::InvalidCodeFormat | Self::CodeInactive => {
                StatusCode::BAD_REQUEST
            }
            Self::CodeNotFound => StatusCode::NOT_FOUND,
            Self::GenerationExhausted => StatusCode::SERVICE_UNAVAILABLE,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        // Internal errors need the anyhow chain logged so the root cause is traceable.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}
