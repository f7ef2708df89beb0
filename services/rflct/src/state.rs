use deadpool_redis::Pool as RedisPool;
use sea_orm::DatabaseConnection;

use crate::infra::cache::RedisAttemptStore;
use crate::infra::db::DbCodeRepository;
use crate::usecase::lockout::{LockoutPolicy, LockoutTracker};

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub redis: RedisPool,
    pub lockout_policy: LockoutPolicy,
}

impl AppState {
    pub fn code_repo(&self) -> DbCodeRepository {
        DbCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn lockout(&self) -> LockoutTracker<RedisAttemptStore> {
        LockoutTracker {
            store: RedisAttemptStore {
                pool: self.redis.clone(),
            },
            policy: self.lockout_policy,
        }
    }
}
