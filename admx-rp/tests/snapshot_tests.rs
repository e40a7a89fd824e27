//! SQLite snapshot round-trip tests against a real on-disk database

use admx_common::model::{
    ActionEntry, CatalogEntity, ConfiguredStatus, EntityLevel, InsightRecord,
};
use chrono::{NaiveDate, TimeZone, Utc};

use admx_rp::db;

fn entity(id: &str) -> CatalogEntity {
    CatalogEntity {
        id: id.to_string(),
        level: EntityLevel::AdSet,
        parent_id: Some("c1".to_string()),
        name: "Tập quảng cáo mùa hè".to_string(),
        configured_status: ConfiguredStatus::Paused,
        reported_status: Some("CAMPAIGN_PAUSED".to_string()),
        objective: Some("OUTCOME_LEADS".to_string()),
        daily_budget: 150_000,
        lifetime_budget: 0,
        is_deleted: false,
    }
}

fn record(id: &str) -> InsightRecord {
    InsightRecord {
        entity_id: id.to_string(),
        level: EntityLevel::AdSet,
        date: NaiveDate::from_ymd_opt(2024, 5, 3).unwrap(),
        campaign_id: Some("c1".to_string()),
        adset_id: Some(id.to_string()),
        spend: 123.45,
        impressions: 4321,
        clicks: 87,
        reach: 2900,
        actions: vec![
            ActionEntry::new("lead", 6.0),
            ActionEntry::new("link_click", 80.0),
        ],
        cost_per_action: vec![ActionEntry::new("lead", 20.58)],
        objective: Some("OUTCOME_LEADS".to_string()),
        ingested_at: Utc.timestamp_opt(1_700_000_123, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_catalog_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::connect(&dir.path().join("admx.db")).await.unwrap();

    db::save_catalog_level(&pool, EntityLevel::AdSet, &[entity("s1"), entity("s2")])
        .await
        .unwrap();

    let mut loaded = db::load_catalog(&pool).await.unwrap();
    loaded.sort_by(|a, b| a.id.cmp(&b.id));
    assert_eq!(loaded.len(), 2);
    let s1 = &loaded[0];
    assert_eq!(s1.id, "s1");
    assert_eq!(s1.level, EntityLevel::AdSet);
    assert_eq!(s1.parent_id.as_deref(), Some("c1"));
    assert_eq!(s1.name, "Tập quảng cáo mùa hè");
    assert_eq!(s1.configured_status, ConfiguredStatus::Paused);
    assert_eq!(s1.reported_status.as_deref(), Some("CAMPAIGN_PAUSED"));
    assert_eq!(s1.daily_budget, 150_000);
    assert!(!s1.is_deleted);
}

#[tokio::test]
async fn test_catalog_save_replaces_level() {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::connect(&dir.path().join("admx.db")).await.unwrap();

    db::save_catalog_level(&pool, EntityLevel::AdSet, &[entity("s1")])
        .await
        .unwrap();
    db::save_catalog_level(&pool, EntityLevel::AdSet, &[entity("s9")])
        .await
        .unwrap();

    let loaded = db::load_catalog(&pool).await.unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, "s9");
}

#[tokio::test]
async fn test_insight_round_trip_preserves_actions() {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::connect(&dir.path().join("admx.db")).await.unwrap();

    db::replace_insights(&pool, &[record("s1")]).await.unwrap();

    let loaded = db::load_insights(&pool).await.unwrap();
    assert_eq!(loaded.len(), 1);
    let row = &loaded[0];
    assert_eq!(row.entity_id, "s1");
    assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
    assert_eq!(row.spend, 123.45);
    assert_eq!(row.actions.len(), 2);
    assert_eq!(row.actions[0], ActionEntry::new("lead", 6.0));
    assert_eq!(row.cost_per_action, vec![ActionEntry::new("lead", 20.58)]);
    assert_eq!(row.ingested_at, Utc.timestamp_opt(1_700_000_123, 0).unwrap());
}

#[tokio::test]
async fn test_duplicate_ingestions_both_survive() {
    let dir = tempfile::tempdir().unwrap();
    let pool = db::connect(&dir.path().join("admx.db")).await.unwrap();

    // Same (entity, level, date), different ingestion stamps: both rows
    // persist; the aggregation engine picks the later one at read time.
    let early = record("s1");
    let mut late = record("s1");
    late.ingested_at = Utc.timestamp_opt(1_700_000_999, 0).unwrap();
    late.spend = 200.0;

    db::replace_insights(&pool, &[early, late]).await.unwrap();

    let loaded = db::load_insights(&pool).await.unwrap();
    assert_eq!(loaded.len(), 2);
}
