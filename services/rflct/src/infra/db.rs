use anyhow::Context as _;
use chrono::Utc;
use sea_orm::error::SqlErr;
use sea_orm::sea_query::{Expr, ExprTrait as _};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
};
use uuid::Uuid;

use foodime_core::pagination::PageRequest;
use foodime_rflct_schema::rflct_codes;

use crate::domain::repository::CodeRepository;
use crate::domain::types::{
    CodeAnalytics, CodeFilter, CodeRecord, CodeType, RECENT_ACTIVITY_LIMIT, RecentRedemption,
    TypeCount,
};
use crate::error::RflctServiceError;

#[derive(Clone)]
pub struct DbCodeRepository {
    pub db: DatabaseConnection,
}

impl CodeRepository for DbCodeRepository {
    async fn reserve(&self, id: Uuid, code: &str) -> Result<bool, RflctServiceError> {
        let now = Utc::now();
        // Placeholder type until activation attaches the real one.
        let result = rflct_codes::ActiveModel {
            id: Set(id),
            code: Set(code.to_owned()),
            code_type: Set(CodeType::UserAccess.as_str().to_owned()),
            description: Set(None),
            is_active: Set(false),
            user_id: Set(None),
            usage_count: Set(0),
            last_used_at: Set(None),
            metadata: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await;

        match result {
            Ok(_) => Ok(true),
            // Only a uniqueness violation on `code` is a retryable conflict;
            // everything else propagates.
            Err(e) => match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Ok(false),
                _ => Err(anyhow::Error::new(e).context("reserve rflct code").into()),
            },
        }
    }

    async fn activate(
        &self,
        code: &str,
        code_type: CodeType,
        description: Option<&str>,
        metadata: Option<&serde_json::Value>,
        user_id: Option<Uuid>,
    ) -> Result<Option<CodeRecord>, RflctServiceError> {
        let result = rflct_codes::Entity::update_many()
            .col_expr(
                rflct_codes::Column::CodeType,
                Expr::value(code_type.as_str()),
            )
            .col_expr(
                rflct_codes::Column::Description,
                Expr::value(description.map(str::to_owned)),
            )
            .col_expr(
                rflct_codes::Column::Metadata,
                Expr::value(metadata.cloned()),
            )
            .col_expr(rflct_codes::Column::UserId, Expr::value(user_id))
            .col_expr(rflct_codes::Column::IsActive, Expr::value(true))
            .col_expr(rflct_codes::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(rflct_codes::Column::Code.eq(code))
            .exec(&self.db)
            .await
            .context("activate rflct code")?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.find_by_code(code).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<CodeRecord>, RflctServiceError> {
        let model = rflct_codes::Entity::find()
            .filter(rflct_codes::Column::Code.eq(code))
            .one(&self.db)
            .await
            .context("find rflct code")?;
        model.map(code_from_model).transpose()
    }

    async fn redeem(
        &self,
        code: &str,
        caller: Option<Uuid>,
    ) -> Result<Option<CodeRecord>, RflctServiceError> {
        let now = Utc::now();
        // SQL-level increment: concurrent redemptions each add exactly one,
        // with no lost updates from read-modify-write interleavings.
        let result = rflct_codes::Entity::update_many()
            .col_expr(
                rflct_codes::Column::UsageCount,
                Expr::col(rflct_codes::Column::UsageCount).add(1),
            )
            .col_expr(rflct_codes::Column::LastUsedAt, Expr::value(Some(now)))
            .col_expr(rflct_codes::Column::UpdatedAt, Expr::value(now))
            .filter(rflct_codes::Column::Code.eq(code))
            .filter(rflct_codes::Column::IsActive.eq(true))
            .exec(&self.db)
            .await
            .context("redeem rflct code")?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        // Bind the caller as owner only while no owner is set; the is-null
        // filter makes first-redemption binding race-safe.
        if let Some(caller) = caller {
            rflct_codes::Entity::update_many()
                .col_expr(rflct_codes::Column::UserId, Expr::value(Some(caller)))
                .filter(rflct_codes::Column::Code.eq(code))
                .filter(rflct_codes::Column::UserId.is_null())
                .exec(&self.db)
                .await
                .context("bind rflct code owner")?;
        }

        self.find_by_code(code).await
    }

    async fn deactivate(&self, code: &str) -> Result<bool, RflctServiceError> {
        let result = rflct_codes::Entity::update_many()
            .col_expr(rflct_codes::Column::IsActive, Expr::value(false))
            .col_expr(rflct_codes::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(rflct_codes::Column::Code.eq(code))
            .exec(&self.db)
            .await
            .context("deactivate rflct code")?;
        Ok(result.rows_affected > 0)
    }

    async fn list(
        &self,
        filter: CodeFilter,
        page: PageRequest,
    ) -> Result<Vec<CodeRecord>, RflctServiceError> {
        let mut query = rflct_codes::Entity::find();
        if let Some(code_type) = filter.code_type {
            query = query.filter(rflct_codes::Column::CodeType.eq(code_type.as_str()));
        }
        if let Some(is_active) = filter.is_active {
            query = query.filter(rflct_codes::Column::IsActive.eq(is_active));
        }
        let models = query
            .order_by_desc(rflct_codes::Column::CreatedAt)
            .offset(page.offset())
            .limit(page.clamped().per_page as u64)
            .all(&self.db)
            .await
            .context("list rflct codes")?;
        models.into_iter().map(code_from_model).collect()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<CodeRecord>, RflctServiceError> {
        let models = rflct_codes::Entity::find()
            .filter(rflct_codes::Column::UserId.eq(user_id))
            .order_by_desc(rflct_codes::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list rflct codes by user")?;
        models.into_iter().map(code_from_model).collect()
    }

    async fn analytics(&self) -> Result<CodeAnalytics, RflctServiceError> {
        #[derive(FromQueryResult)]
        struct UsageSum {
            total: Option<i64>,
        }

        let total_codes = rflct_codes::Entity::find()
            .count(&self.db)
            .await
            .context("count rflct codes")?;
        let active_codes = rflct_codes::Entity::find()
            .filter(rflct_codes::Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .context("count active rflct codes")?;
        let total_usage = rflct_codes::Entity::find()
            .select_only()
            .column_as(rflct_codes::Column::UsageCount.sum(), "total")
            .into_model::<UsageSum>()
            .one(&self.db)
            .await
            .context("sum rflct code usage")?
            .and_then(|row| row.total)
            .unwrap_or(0);

        let mut by_type = Vec::with_capacity(CodeType::ALL.len());
        for code_type in CodeType::ALL {
            let count = rflct_codes::Entity::find()
                .filter(rflct_codes::Column::CodeType.eq(code_type.as_str()))
                .count(&self.db)
                .await
                .context("count rflct codes by type")?;
            by_type.push(TypeCount { code_type, count });
        }

        let recent_models = rflct_codes::Entity::find()
            .filter(rflct_codes::Column::LastUsedAt.is_not_null())
            .order_by_desc(rflct_codes::Column::LastUsedAt)
            .limit(RECENT_ACTIVITY_LIMIT as u64)
            .all(&self.db)
            .await
            .context("list recently redeemed rflct codes")?;
        let mut recent_activity = Vec::with_capacity(recent_models.len());
        for model in recent_models {
            let record = code_from_model(model)?;
            if let Some(last_used_at) = record.last_used_at {
                recent_activity.push(RecentRedemption {
                    code: record.code,
                    code_type: record.code_type,
                    usage_count: record.usage_count,
                    last_used_at,
                });
            }
        }

        Ok(CodeAnalytics {
            total_codes,
            active_codes,
            total_usage,
            by_type,
            recent_activity,
        })
    }
}

fn code_from_model(model: rflct_codes::Model) -> Result<CodeRecord, RflctServiceError> {
    let code_type = CodeType::parse(&model.code_type)
        .ok_or_else(|| anyhow::anyhow!("unknown code type in database: {}", model.code_type))?;
    Ok(CodeRecord {
        id: model.id,
        code: model.code,
        code_type,
        description: model.description,
        is_active: model.is_active,
        user_id: model.user_id,
        usage_count: model.usage_count,
        last_used_at: model.last_used_at,
        metadata: model.metadata,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}
