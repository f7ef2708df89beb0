use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use foodime_core::identity::IdentityHeaders;
use foodime_core::pagination::PageRequest;

use crate::domain::types::{CodeAnalytics, CodeFilter, CodeRecord, CodeType};
use crate::error::RflctServiceError;
use crate::state::AppState;
use crate::usecase::code::{
    CodeAnalyticsUseCase, DeactivateCodeUseCase, GenerateBatchUseCase, IssueCodeInput,
    IssueCodeUseCase, ListCodesUseCase, MyCodesUseCase, RedeemCodeUseCase,
};

// ── Response types ───────────────────────────────────────────────────────────

/// Full record view, for privileged callers and for a code's own owner.
#[derive(Serialize)]
pub struct CodeResponse {
    pub code: String,
    #[serde(rename = "type")]
    pub code_type: CodeType,
    pub description: Option<String>,
    pub is_active: bool,
    pub user_id: Option<Uuid>,
    pub usage_count: i32,
    #[serde(serialize_with = "foodime_core::serde::to_rfc3339_ms_opt")]
    pub last_used_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
    #[serde(serialize_with = "foodime_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "foodime_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

impl From<CodeRecord> for CodeResponse {
    fn from(record: CodeRecord) -> Self {
        Self {
            code: record.code,
            code_type: record.code_type,
            description: record.description,
            is_active: record.is_active,
            user_id: record.user_id,
            usage_count: record.usage_count,
            last_used_at: record.last_used_at,
            metadata: record.metadata,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Stripped view for non-privileged callers: no code string, no active flag,
/// no timestamps, and only the harmless metadata keys.
#[derive(Serialize)]
pub struct SanitizedCodeResponse {
    #[serde(rename = "type")]
    pub code_type: CodeType,
    pub description: Option<String>,
    pub usage_count: i32,
    pub metadata: Option<serde_json::Value>,
}

impl From<CodeRecord> for SanitizedCodeResponse {
    fn from(record: CodeRecord) -> Self {
        Self {
            code_type: record.code_type,
            description: record.description,
            usage_count: record.usage_count,
            metadata: record.metadata.as_ref().map(metadata_subset),
        }
    }
}

/// Keep only the `description` and `category` metadata keys.
fn metadata_subset(metadata: &serde_json::Value) -> serde_json::Value {
    let mut subset = serde_json::Map::new();
    for key in ["description", "category"] {
        if let Some(value) = metadata.get(key) {
            subset.insert(key.to_owned(), value.clone());
        }
    }
    serde_json::Value::Object(subset)
}

/// Role-dependent view of a code record, decided at the response boundary —
/// storage always holds the full record.
#[derive(Serialize)]
#[serde(untagged)]
pub enum CodeView {
    Full(CodeResponse),
    Sanitized(SanitizedCodeResponse),
}

impl CodeView {
    pub fn for_identity(record: CodeRecord, identity: &IdentityHeaders) -> Self {
        if identity.is_admin() {
            CodeView::Full(record.into())
        } else {
            CodeView::Sanitized(record.into())
        }
    }
}

// ── POST /rflct/codes ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateCodeRequest {
    #[serde(rename = "type")]
    pub code_type: String,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub user_id: Option<Uuid>,
}

pub async fn create_code(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<CreateCodeRequest>,
) -> Result<(StatusCode, Json<CodeResponse>), RflctServiceError> {
    if !identity.is_admin() {
        return Err(RflctServiceError::Forbidden);
    }
    let code_type =
        CodeType::parse(&body.code_type).ok_or(RflctServiceError::InvalidCodeType)?;
    let usecase = IssueCodeUseCase {
        repo: state.code_repo(),
    };
    let record = usecase
        .execute(IssueCodeInput {
            code_type,
            description: body.description,
            metadata: body.metadata,
            user_id: body.user_id,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(record.into())))
}

// ── POST /rflct/codes/verify ─────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyCodeRequest {
    pub code: String,
}

pub async fn verify_code(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Json(body): Json<VerifyCodeRequest>,
) -> Result<Json<CodeView>, RflctServiceError> {
    let usecase = RedeemCodeUseCase {
        repo: state.code_repo(),
    };
    let record = usecase.execute(&body.code, Some(identity.user_id)).await?;
    Ok(Json(CodeView::for_identity(record, &identity)))
}

// ── GET /rflct/codes ─────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub struct CodeListQuery {
    #[serde(rename = "type")]
    pub code_type: Option<String>,
    pub is_active: Option<bool>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub async fn list_codes(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<CodeListQuery>,
) -> Result<Json<Vec<CodeResponse>>, RflctServiceError> {
    if !identity.is_admin() {
        return Err(RflctServiceError::Forbidden);
    }
    let code_type = query
        .code_type
        .as_deref()
        .map(|s| CodeType::parse(s).ok_or(RflctServiceError::InvalidCodeType))
        .transpose()?;
    let mut page = PageRequest::default();
    if let Some(p) = query.page {
        page.page = p;
    }
    if let Some(per_page) = query.per_page {
        page.per_page = per_page;
    }
    let usecase = ListCodesUseCase {
        repo: state.code_repo(),
    };
    let records = usecase
        .execute(
            CodeFilter {
                code_type,
                is_active: query.is_active,
            },
            page,
        )
        .await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

// ── GET /rflct/my-codes ──────────────────────────────────────────────────────

pub async fn my_codes(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<Vec<CodeResponse>>, RflctServiceError> {
    let usecase = MyCodesUseCase {
        repo: state.code_repo(),
    };
    let records = usecase.execute(identity.user_id).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

// ── PATCH /rflct/codes/{code}/deactivate ─────────────────────────────────────

pub async fn deactivate_code(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, RflctServiceError> {
    if !identity.is_admin() {
        return Err(RflctServiceError::Forbidden);
    }
    let usecase = DeactivateCodeUseCase {
        repo: state.code_repo(),
    };
    usecase.execute(&code).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── GET /rflct/codes/generate ────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct GenerateBatchQuery {
    pub count: Option<u32>,
}

pub async fn generate_codes(
    identity: IdentityHeaders,
    State(state): State<AppState>,
    Query(query): Query<GenerateBatchQuery>,
) -> Result<Json<Vec<String>>, RflctServiceError> {
    if !identity.is_admin() {
        return Err(RflctServiceError::Forbidden);
    }
    let usecase = GenerateBatchUseCase {
        repo: state.code_repo(),
    };
    let codes = usecase.execute(query.count.unwrap_or(10)).await?;
    Ok(Json(codes))
}

// ── GET /rflct/analytics ─────────────────────────────────────────────────────

pub async fn code_analytics(
    identity: IdentityHeaders,
    State(state): State<AppState>,
) -> Result<Json<CodeAnalytics>, RflctServiceError> {
    if !identity.is_admin() {
        return Err(RflctServiceError::Forbidden);
    }
    let usecase = CodeAnalyticsUseCase {
        repo: state.code_repo(),
    };
    Ok(Json(usecase.execute().await?))
}
