use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;

use super::providers::{DbProvider, redact_url};

/// Opens the pool for `cfg.url`. The schema is managed by the `migrate`
/// binary and is never touched here.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let provider = DbProvider::for_url(&cfg.url)?;

    info!(
        provider = provider.as_str(),
        url = %redact_url(&cfg.url),
        "connecting to database"
    );
    provider.connect(cfg).await
}
