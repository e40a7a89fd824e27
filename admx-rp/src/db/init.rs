//! Database initialization

use std::path::Path;
use std::str::FromStr;

use admx_common::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

/// Open (creating if missing) the snapshot database and ensure the schema
pub async fn connect(path: &Path) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(&format!("sqlite://{}", path.display()))
        .map_err(admx_common::Error::Database)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    create_schema(&pool).await?;
    info!("Snapshot database ready at {}", path.display());
    Ok(pool)
}

/// Create the snapshot tables if they do not exist
pub async fn create_schema(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS catalog_snapshot (
            id TEXT NOT NULL,
            level TEXT NOT NULL,
            parent_id TEXT,
            name TEXT NOT NULL,
            configured_status TEXT NOT NULL,
            reported_status TEXT,
            objective TEXT,
            daily_budget INTEGER NOT NULL DEFAULT 0,
            lifetime_budget INTEGER NOT NULL DEFAULT 0,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (id, level)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS insight_snapshot (
            entity_id TEXT NOT NULL,
            level TEXT NOT NULL,
            date TEXT NOT NULL,
            campaign_id TEXT,
            adset_id TEXT,
            spend REAL NOT NULL DEFAULT 0,
            impressions INTEGER NOT NULL DEFAULT 0,
            clicks INTEGER NOT NULL DEFAULT 0,
            reach INTEGER NOT NULL DEFAULT 0,
            actions TEXT NOT NULL DEFAULT '[]',
            cost_per_action TEXT NOT NULL DEFAULT '[]',
            objective TEXT,
            ingested_at TEXT NOT NULL,
            PRIMARY KEY (entity_id, level, date, ingested_at)
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
