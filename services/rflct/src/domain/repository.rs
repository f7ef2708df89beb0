#![allow(async_fn_in_trait)]

use uuid::Uuid;

use foodime_core::pagination::PageRequest;

use crate::domain::types::{CodeAnalytics, CodeFilter, CodeRecord, CodeType};
use crate::error::RflctServiceError;

/// Repository for RFLCT codes.
pub trait CodeRepository: Send + Sync {
    /// Insert an inactive placeholder row for `code`. Returns `false` when
    /// the store rejects the insert with a uniqueness violation — the one
    /// conflict signal the generator retries on. Any other failure is an
    /// error.
    async fn reserve(&self, id: Uuid, code: &str) -> Result<bool, RflctServiceError>;

    /// Attach the real type/description/metadata/owner to a reserved code and
    /// mark it active. Returns the full record, or `None` if the reserved row
    /// no longer exists.
    async fn activate(
        &self,
        code: &str,
        code_type: CodeType,
        description: Option<&str>,
        metadata: Option<&serde_json::Value>,
        user_id: Option<Uuid>,
    ) -> Result<Option<CodeRecord>, RflctServiceError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<CodeRecord>, RflctServiceError>;

    /// Redeem an active code: increment `usage_count` atomically at the store
    /// (never read-modify-write), stamp `last_used_at`, and bind `caller` as
    /// owner only if no owner is set yet. Returns the updated record, or
    /// `None` if the code is missing or inactive at the moment of the update.
    async fn redeem(
        &self,
        code: &str,
        caller: Option<Uuid>,
    ) -> Result<Option<CodeRecord>, RflctServiceError>;

    /// Set `is_active = false`. Returns `false` when no such code exists.
    /// Already-inactive codes still count as deactivated.
    async fn deactivate(&self, code: &str) -> Result<bool, RflctServiceError>;

    /// Paginated listing, newest first.
    async fn list(
        &self,
        filter: CodeFilter,
        page: PageRequest,
    ) -> Result<Vec<CodeRecord>, RflctServiceError>;

    /// Codes owned by `user_id`, newest first.
    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<CodeRecord>, RflctServiceError>;

    async fn analytics(&self) -> Result<CodeAnalytics, RflctServiceError>;
}

/// Key/value store contract for the lockout tracker (Redis in production,
/// in-memory fake in tests). Injected at construction — never a process-wide
/// singleton, so cross-process consistency stays with the shared store.
///
/// Errors are `anyhow` chains: the tracker decides per operation whether to
/// propagate, fail open, or swallow them.
pub trait AttemptStore: Send + Sync {
    /// Atomic increment; creates the key at 1 when absent.
    async fn increment(&self, key: &str) -> Result<i64, anyhow::Error>;

    async fn expire(&self, key: &str, ttl_secs: u64) -> Result<(), anyhow::Error>;

    /// Set a flag key with a TTL only if it does not already exist.
    /// Returns `true` when the key was created by this call.
    async fn set_if_absent(&self, key: &str, ttl_secs: u64) -> Result<bool, anyhow::Error>;

    async fn exists(&self, key: &str) -> Result<bool, anyhow::Error>;

    /// Remaining TTL in seconds; negative when the key is absent or has no
    /// expiration (Redis convention).
    async fn ttl_secs(&self, key: &str) -> Result<i64, anyhow::Error>;

    async fn delete(&self, key: &str) -> Result<(), anyhow::Error>;
}
