//! Insight snapshot persistence
//!
//! Action lists are stored as JSON text; a row whose JSON fails to parse
//! on load is restored with empty actions rather than rejected.

use admx_common::model::{ActionEntry, EntityLevel, InsightRecord};
use admx_common::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Pool, Sqlite};

/// Rewrite the insight snapshot with the current feed
pub async fn replace_insights(pool: &Pool<Sqlite>, records: &[InsightRecord]) -> Result<()> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM insight_snapshot")
        .execute(&mut *tx)
        .await?;

    for record in records {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO insight_snapshot
                (entity_id, level, date, campaign_id, adset_id, spend,
                 impressions, clicks, reach, actions, cost_per_action,
                 objective, ingested_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.entity_id)
        .bind(record.level.as_str())
        .bind(record.date.format("%Y-%m-%d").to_string())
        .bind(&record.campaign_id)
        .bind(&record.adset_id)
        .bind(record.spend)
        .bind(record.impressions)
        .bind(record.clicks)
        .bind(record.reach)
        .bind(serde_json::to_string(&record.actions).unwrap_or_else(|_| "[]".to_string()))
        .bind(serde_json::to_string(&record.cost_per_action).unwrap_or_else(|_| "[]".to_string()))
        .bind(&record.objective)
        .bind(record.ingested_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Load the full insight snapshot
pub async fn load_insights(pool: &Pool<Sqlite>) -> Result<Vec<InsightRecord>> {
    let rows: Vec<(
        String,         // entity_id
        String,         // level
        String,         // date
        Option<String>, // campaign_id
        Option<String>, // adset_id
        f64,            // spend
        i64,            // impressions
        i64,            // clicks
        i64,            // reach
        String,         // actions json
        String,         // cost_per_action json
        Option<String>, // objective
        String,         // ingested_at
    )> = sqlx::query_as(
        "SELECT entity_id, level, date, campaign_id, adset_id, spend, impressions, \
         clicks, reach, actions, cost_per_action, objective, ingested_at \
         FROM insight_snapshot",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let level = EntityLevel::parse(&row.1)?;
            let date = NaiveDate::parse_from_str(&row.2, "%Y-%m-%d").ok()?;
            let ingested_at = DateTime::parse_from_rfc3339(&row.12)
                .map(|t| t.with_timezone(&Utc))
                .ok()?;
            Some(InsightRecord {
                entity_id: row.0,
                level,
                date,
                campaign_id: row.3,
                adset_id: row.4,
                spend: row.5,
                impressions: row.6,
                clicks: row.7,
                reach: row.8,
                actions: serde_json::from_str::<Vec<ActionEntry>>(&row.9).unwrap_or_default(),
                cost_per_action: serde_json::from_str::<Vec<ActionEntry>>(&row.10)
                    .unwrap_or_default(),
                objective: row.11,
                ingested_at,
            })
        })
        .collect())
}
