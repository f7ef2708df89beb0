use sea_orm::Database;
use tracing::info;

use foodime_rflct::config::RflctConfig;
use foodime_rflct::router::build_router;
use foodime_rflct::state::AppState;

#[tokio::main]
async fn main() {
    foodime_core::tracing::init_tracing();

    let config = RflctConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let redis_cfg = deadpool_redis::Config::from_url(&config.redis_url);
    let redis = redis_cfg
        .create_pool(Some(deadpool_redis::Runtime::Tokio1))
        .expect("failed to create Redis pool");

    let state = AppState {
        db,
        redis,
        lockout_policy: config.lockout,
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.rflct_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("rflct service listening on {addr}");
    axum::serve(listener, router).await.expect("server error");
}
