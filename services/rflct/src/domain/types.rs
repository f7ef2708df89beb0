use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of an RFLCT code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CodeType {
    UserAccess,
    FeatureUnlock,
    Promotion,
    SpecialAction,
    SystemCommand,
}

impl CodeType {
    pub const ALL: [CodeType; 5] = [
        CodeType::UserAccess,
        CodeType::FeatureUnlock,
        CodeType::Promotion,
        CodeType::SpecialAction,
        CodeType::SystemCommand,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CodeType::UserAccess => "USER_ACCESS",
            CodeType::FeatureUnlock => "FEATURE_UNLOCK",
            CodeType::Promotion => "PROMOTION",
            CodeType::SpecialAction => "SPECIAL_ACTION",
            CodeType::SystemCommand => "SYSTEM_COMMAND",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// A persisted RFLCT code. `code` is immutable once assigned and never
/// recycled while the record exists; `usage_count` only ever increases.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeRecord {
    pub id: Uuid,
    pub code: String,
    pub code_type: CodeType,
    pub description: Option<String>,
    pub is_active: bool,
    /// Owner identity, bound at creation or on first redemption — whichever
    /// binds it first. Never rebound afterwards.
    pub user_id: Option<Uuid>,
    pub usage_count: i32,
    pub last_used_at: Option<DateTime<Utc>>,
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Filter for listing codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CodeFilter {
    pub code_type: Option<CodeType>,
    pub is_active: Option<bool>,
}

/// Aggregate view of the registry for the admin analytics endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct CodeAnalytics {
    pub total_codes: u64,
    pub active_codes: u64,
    pub total_usage: i64,
    pub by_type: Vec<TypeCount>,
    pub recent_activity: Vec<RecentRedemption>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub code_type: CodeType,
    pub count: u64,
}

/// One entry in the analytics recent-activity feed: a redeemed code, newest
/// redemption first.
#[derive(Debug, Clone, Serialize)]
pub struct RecentRedemption {
    pub code: String,
    #[serde(rename = "type")]
    pub code_type: CodeType,
    pub usage_count: i32,
    #[serde(serialize_with = "foodime_core::serde::to_rfc3339_ms")]
    pub last_used_at: DateTime<Utc>,
}

/// How many entries the recent-activity feed holds.
pub const RECENT_ACTIVITY_LIMIT: usize = 10;

/// Whether a candidate code string is a valid RFLCT code: exactly 4 digits,
/// no leading zero (codes are drawn from 1000–9999).
pub fn is_valid_code_format(code: &str) -> bool {
    code.len() == 4
        && code.bytes().all(|b| b.is_ascii_digit())
        && !code.starts_with('0')
}

/// Retry budget for single-code issuance.
pub const SINGLE_GENERATION_RETRIES: u32 = 10;

/// Retry budget per code during bulk pre-allocation.
pub const BATCH_GENERATION_RETRIES: u32 = 100;

/// Hard cap on codes pre-allocated per bulk request.
pub const BATCH_CAP: u32 = 100;
