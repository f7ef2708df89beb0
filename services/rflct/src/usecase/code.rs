use rand::RngExt as _;
use uuid::Uuid;

use foodime_core::pagination::PageRequest;

use crate::domain::repository::CodeRepository;
use crate::domain::types::{
    BATCH_CAP, BATCH_GENERATION_RETRIES, CodeAnalytics, CodeFilter, CodeRecord, CodeType,
    SINGLE_GENERATION_RETRIES, is_valid_code_format,
};
use crate::error::RflctServiceError;

fn random_code() -> String {
    // 1000–9999: strictly four digits, no leading zero.
    rand::rng().random_range(1000..10000).to_string()
}

/// Draw random codes and reserve one as an inactive placeholder row.
///
/// The insert is the reservation: the store's uniqueness constraint turns a
/// concurrent collision into a retryable conflict instead of a silent
/// duplicate, so there is no check-then-insert race.
pub async fn generate_unique_code<R: CodeRepository>(
    repo: &R,
    max_retries: u32,
) -> Result<String, RflctServiceError> {
    for attempt in 0..max_retries {
        let code = random_code();
        if repo.reserve(Uuid::new_v4(), &code).await? {
            return Ok(code);
        }
        tracing::debug!(attempt = attempt + 1, code = %code, "code collision, retrying");
    }
    Err(RflctServiceError::GenerationExhausted)
}

// ── IssueCode ────────────────────────────────────────────────────────────────

pub struct IssueCodeInput {
    pub code_type: CodeType,
    pub description: Option<String>,
    pub metadata: Option<serde_json::Value>,
    pub user_id: Option<Uuid>,
}

pub struct IssueCodeUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> IssueCodeUseCase<R> {
    pub async fn execute(&self, input: IssueCodeInput) -> Result<CodeRecord, RflctServiceError> {
        let code = generate_unique_code(&self.repo, SINGLE_GENERATION_RETRIES).await?;
        let record = self
            .repo
            .activate(
                &code,
                input.code_type,
                input.description.as_deref(),
                input.metadata.as_ref(),
                input.user_id,
            )
            .await?
            .ok_or_else(|| {
                RflctServiceError::Internal(anyhow::anyhow!("reserved code {code} disappeared"))
            })?;
        tracing::info!(code = %code, code_type = input.code_type.as_str(), "rflct code issued");
        Ok(record)
    }
}

// ── RedeemCode ───────────────────────────────────────────────────────────────

pub struct RedeemCodeUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> RedeemCodeUseCase<R> {
    pub async fn execute(
        &self,
        code: &str,
        caller: Option<Uuid>,
    ) -> Result<CodeRecord, RflctServiceError> {
        if !is_valid_code_format(code) {
            return Err(RflctServiceError::InvalidCodeFormat);
        }

        let record = self
            .repo
            .find_by_code(code)
            .await?
            .ok_or(RflctServiceError::CodeNotFound)?;
        if !record.is_active {
            return Err(RflctServiceError::CodeInactive);
        }

        // The increment happens at the store; a concurrent deactivation
        // between the check above and the update shows up as a miss here.
        let updated = self
            .repo
            .redeem(code, caller)
            .await?
            .ok_or(RflctServiceError::CodeInactive)?;
        tracing::info!(code, usage_count = updated.usage_count, "rflct code redeemed");
        Ok(updated)
    }
}

// ── DeactivateCode ───────────────────────────────────────────────────────────

pub struct DeactivateCodeUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> DeactivateCodeUseCase<R> {
    pub async fn execute(&self, code: &str) -> Result<(), RflctServiceError> {
        if !is_valid_code_format(code) {
            return Err(RflctServiceError::InvalidCodeFormat);
        }
        if !self.repo.deactivate(code).await? {
            return Err(RflctServiceError::CodeNotFound);
        }
        tracing::info!(code, "rflct code deactivated");
        Ok(())
    }
}

// ── ListCodes ────────────────────────────────────────────────────────────────

pub struct ListCodesUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> ListCodesUseCase<R> {
    pub async fn execute(
        &self,
        filter: CodeFilter,
        page: PageRequest,
    ) -> Result<Vec<CodeRecord>, RflctServiceError> {
        self.repo.list(filter, page.clamped()).await
    }
}

// ── MyCodes ──────────────────────────────────────────────────────────────────

pub struct MyCodesUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> MyCodesUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<CodeRecord>, RflctServiceError> {
        self.repo.list_by_user(user_id).await
    }
}

// ── GenerateBatch ────────────────────────────────────────────────────────────

pub struct GenerateBatchUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> GenerateBatchUseCase<R> {
    /// Pre-allocate up to [`BATCH_CAP`] codes. Each code goes through the same
    /// reserve-first insert as single issuance, so bulk codes cannot collide
    /// with a concurrently issued single code.
    pub async fn execute(&self, count: u32) -> Result<Vec<String>, RflctServiceError> {
        let count = count.min(BATCH_CAP);
        let mut codes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            codes.push(generate_unique_code(&self.repo, BATCH_GENERATION_RETRIES).await?);
        }
        tracing::info!(count = codes.len(), "rflct codes pre-allocated");
        Ok(codes)
    }
}

// ── Analytics ────────────────────────────────────────────────────────────────

pub struct CodeAnalyticsUseCase<R: CodeRepository> {
    pub repo: R,
}

impl<R: CodeRepository> CodeAnalyticsUseCase<R> {
    pub async fn execute(&self) -> Result<CodeAnalytics, RflctServiceError> {
        self.repo.analytics().await
    }
}
