use std::sync::Arc;

use axum::{Router, middleware};
use sea_orm_migration::MigratorTrait;

use crate::{
    config::{AppConfig, DatabaseConfig},
    db::connection,
    migration::Migrator,
    routes::{catch_panic_layer, json_error_middleware, router},
    state::AppState,
};

/// A single-connection in-memory SQLite store with every migration applied.
/// The pool must stay at one connection: each new `:memory:` connection
/// opens an empty database.
pub async fn test_state() -> anyhow::Result<Arc<AppState>> {
    let cfg = AppConfig {
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_idle: 1,
        },
        ..AppConfig::default()
    };
    let db = connection::connect(&cfg.database).await?;
    Migrator::up(&db, None).await?;
    Ok(AppState::new(cfg, db))
}

/// The application router with the same error layers the server installs.
pub fn test_router(state: Arc<AppState>) -> Router {
    router(state)
        .layer(middleware::from_fn(json_error_middleware))
        .layer(catch_panic_layer())
}
