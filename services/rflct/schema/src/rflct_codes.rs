use sea_orm::entity::prelude::*;

/// Short RFLCT code. The unique constraint on `code` is the concurrency-safety
/// mechanism for generation: a colliding insert fails instead of silently
/// duplicating, and the generator retries with a fresh random value.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "rflct_codes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    #[sea_orm(column_name = "type")]
    pub code_type: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub user_id: Option<Uuid>,
    pub usage_count: i32,
    pub last_used_at: Option<chrono::DateTime<chrono::Utc>>,
    pub metadata: Option<Json>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
