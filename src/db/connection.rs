use std::time::Duration;

use anyhow::{Context, Result, bail};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

use crate::config::DatabaseConfig;

const SQLITE_BUSY_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbProviderId {
    Postgres,
    Sqlite,
}

impl DbProviderId {
    pub fn as_str(self) -> &'static str {
        match self {
            DbProviderId::Postgres => "postgres",
            DbProviderId::Sqlite => "sqlite",
        }
    }

    pub fn from_url(url: &str) -> Result<Self> {
        let normalized = url.trim().to_ascii_lowercase();
        if normalized.starts_with("postgres://") || normalized.starts_with("postgresql://") {
            return Ok(DbProviderId::Postgres);
        }
        if normalized.starts_with("sqlite:") {
            return Ok(DbProviderId::Sqlite);
        }
        bail!(
            "unsupported database url '{}'; expected scheme postgres://, postgresql://, or sqlite:",
            redact_url(url)
        )
    }

    async fn post_connect(self, db: &DatabaseConnection) -> Result<()> {
        if self == DbProviderId::Sqlite {
            // Cascades on recipes -> steps/ingredients rely on this.
            db.execute_unprepared("PRAGMA foreign_keys = ON").await?;
            db.execute_unprepared(&format!("PRAGMA busy_timeout = {SQLITE_BUSY_TIMEOUT_MS}"))
                .await?;
        }
        Ok(())
    }
}

/// Opens the pool, applies backend pragmas and syncs the schema from the
/// registered entities.
pub async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
    let provider = DbProviderId::from_url(&cfg.url)?;

    let mut options = ConnectOptions::new(cfg.url.clone());
    options
        .max_connections(cfg.max_connections)
        .min_connections(cfg.min_idle)
        .connect_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .with_context(|| format!("failed to connect to {} database", provider.as_str()))?;
    provider.post_connect(&db).await?;

    info!(provider = provider.as_str(), "syncing database schema from entities");
    db.get_schema_registry("recipy_server::db::entities::*")
        .sync(&db)
        .await?;
    Ok(db)
}

fn redact_url(url: &str) -> String {
    let trimmed = url.trim();
    if let Some((scheme, _)) = trimmed.split_once("://") {
        format!("{scheme}://<redacted>")
    } else if let Some((scheme, _)) = trimmed.split_once(':') {
        format!("{scheme}:<redacted>")
    } else {
        "<invalid-url>".to_string()
    }
}
