//! Catalog snapshot persistence

use admx_common::model::{CatalogEntity, ConfiguredStatus, EntityLevel};
use admx_common::Result;
use sqlx::{Pool, Sqlite};

/// Rewrite the snapshot for one level with freshly synced entities
pub async fn save_catalog_level(
    pool: &Pool<Sqlite>,
    level: EntityLevel,
    entities: &[CatalogEntity],
) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM catalog_snapshot WHERE level = ?")
        .bind(level.as_str())
        .execute(&mut *tx)
        .await?;

    for entity in entities {
        sqlx::query(
            r#"
            INSERT INTO catalog_snapshot
                (id, level, parent_id, name, configured_status, reported_status,
                 objective, daily_budget, lifetime_budget, is_deleted)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&entity.id)
        .bind(level.as_str())
        .bind(&entity.parent_id)
        .bind(&entity.name)
        .bind(entity.configured_status.as_str())
        .bind(&entity.reported_status)
        .bind(&entity.objective)
        .bind(entity.daily_budget)
        .bind(entity.lifetime_budget)
        .bind(entity.is_deleted as i64)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Load all snapshot entities, grouped by level by the caller
pub async fn load_catalog(pool: &Pool<Sqlite>) -> Result<Vec<CatalogEntity>> {
    let rows: Vec<(
        String,         // id
        String,         // level
        Option<String>, // parent_id
        String,         // name
        String,         // configured_status
        Option<String>, // reported_status
        Option<String>, // objective
        i64,            // daily_budget
        i64,            // lifetime_budget
        i64,            // is_deleted
    )> = sqlx::query_as(
        "SELECT id, level, parent_id, name, configured_status, reported_status, \
         objective, daily_budget, lifetime_budget, is_deleted FROM catalog_snapshot",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            // Rows with an unknown level tag are stale garbage; skip them
            let level = EntityLevel::parse(&row.1)?;
            Some(CatalogEntity {
                id: row.0,
                level,
                parent_id: row.2,
                name: row.3,
                configured_status: if row.4 == "ACTIVE" {
                    ConfiguredStatus::Active
                } else {
                    ConfiguredStatus::Paused
                },
                reported_status: row.5,
                objective: row.6,
                daily_budget: row.7,
                lifetime_budget: row.8,
                is_deleted: row.9 != 0,
            })
        })
        .collect())
}
