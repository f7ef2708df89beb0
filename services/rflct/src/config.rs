use crate::usecase::lockout::LockoutPolicy;

/// RFLCT service configuration loaded from environment variables.
#[derive(Debug)]
pub struct RflctConfig {
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Redis connection URL.
    pub redis_url: String,
    /// TCP port to listen on (default 3114). Env var: `RFLCT_PORT`.
    pub rflct_port: u16,
    /// Lockout thresholds and durations. Env vars: `LOCKOUT_MAX_FAILED_ATTEMPTS`,
    /// `LOCKOUT_DURATION_MINUTES`, `LOCKOUT_FAILED_ATTEMPTS_WINDOW_MINUTES`.
    pub lockout: LockoutPolicy,
}

impl RflctConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL"),
            redis_url: std::env::var("REDIS_URL").expect("REDIS_URL"),
            rflct_port: std::env::var("RFLCT_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(3114),
            lockout: LockoutPolicy {
                max_failed_attempts: std::env::var("LOCKOUT_MAX_FAILED_ATTEMPTS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(5),
                lockout_minutes: std::env::var("LOCKOUT_DURATION_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
                window_minutes: std::env::var("LOCKOUT_FAILED_ATTEMPTS_WINDOW_MINUTES")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(15),
            },
        }
    }
}
