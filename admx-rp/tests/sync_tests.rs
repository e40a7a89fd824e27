//! Sync job integration tests: store population, partial-failure
//! tolerance, snapshot persistence

use std::sync::Arc;

use admx_common::config::ServiceConfig;
use admx_common::model::{
    AccountHealth, ActionEntry, CatalogEntity, ConfiguredStatus, EntityLevel, InsightRecord,
};
use chrono::Utc;
use sqlx::SqlitePool;

use admx_rp::platform::fake::FakePlatform;
use admx_rp::{db, sync, AppState};

fn entity(id: &str, level: EntityLevel, parent: Option<&str>) -> CatalogEntity {
    CatalogEntity {
        id: id.to_string(),
        level,
        parent_id: parent.map(|p| p.to_string()),
        name: format!("name-{}", id),
        configured_status: ConfiguredStatus::Active,
        reported_status: Some("ACTIVE".to_string()),
        objective: Some("LEAD_GENERATION".to_string()),
        daily_budget: 100_000,
        lifetime_budget: 0,
        is_deleted: false,
    }
}

fn record(entity_id: &str, level: EntityLevel) -> InsightRecord {
    InsightRecord {
        entity_id: entity_id.to_string(),
        level,
        date: Utc::now().date_naive(),
        campaign_id: Some("c1".to_string()),
        adset_id: match level {
            EntityLevel::AdSet => Some(entity_id.to_string()),
            _ => None,
        },
        spend: 12.5,
        impressions: 100,
        clicks: 10,
        reach: 90,
        actions: vec![ActionEntry::new("lead", 1.0)],
        cost_per_action: vec![],
        objective: Some("LEAD_GENERATION".to_string()),
        ingested_at: Utc::now(),
    }
}

async fn setup_state() -> (AppState, FakePlatform) {
    let pool = SqlitePool::connect(":memory:").await.unwrap();
    db::create_schema(&pool).await.unwrap();
    let fake = FakePlatform::new();
    let config = ServiceConfig {
        account_id: "1234".to_string(),
        ..ServiceConfig::default()
    };
    let state = AppState::new(Arc::new(fake.clone()), pool, config);
    (state, fake)
}

#[tokio::test]
async fn test_refresh_populates_stores_and_loaded_flags() {
    let (state, fake) = setup_state().await;
    fake.seed_catalog(
        EntityLevel::Campaign,
        vec![entity("c1", EntityLevel::Campaign, None)],
    )
    .await;
    fake.seed_catalog(
        EntityLevel::AdSet,
        vec![entity("s1", EntityLevel::AdSet, Some("c1"))],
    )
    .await;
    fake.seed_insights(vec![record("s1", EntityLevel::AdSet)]).await;
    fake.set_account_health(AccountHealth::Unpaid).await;

    sync::refresh_all(&state).await.unwrap();

    let view = state.catalog.view().await;
    assert!(view.campaigns.contains_key("c1"));
    assert!(view.adsets.contains_key("s1"));
    assert!(view.adsets_loaded);
    assert_eq!(view.account, AccountHealth::Unpaid);
    assert_eq!(state.insights.len().await, 1);
}

#[tokio::test]
async fn test_failed_level_keeps_previous_data() {
    let (state, fake) = setup_state().await;
    fake.seed_catalog(
        EntityLevel::Campaign,
        vec![entity("c1", EntityLevel::Campaign, None)],
    )
    .await;
    fake.seed_catalog(
        EntityLevel::AdSet,
        vec![entity("s1", EntityLevel::AdSet, Some("c1"))],
    )
    .await;
    sync::refresh_all(&state).await.unwrap();

    // Second sync: campaigns change, the ad-set fetch starts failing
    fake.seed_catalog(
        EntityLevel::Campaign,
        vec![entity("c2", EntityLevel::Campaign, None)],
    )
    .await;
    fake.fail_catalog_for(vec![EntityLevel::AdSet]).await;
    sync::refresh_all(&state).await.unwrap();

    let view = state.catalog.view().await;
    assert!(view.campaigns.contains_key("c2"));
    assert!(!view.campaigns.contains_key("c1"));
    // Previous ad-set data (and its loaded flag) survives the failure
    assert!(view.adsets.contains_key("s1"));
    assert!(view.adsets_loaded);
}

#[tokio::test]
async fn test_refresh_persists_snapshot() {
    let (state, fake) = setup_state().await;
    fake.seed_catalog(
        EntityLevel::Campaign,
        vec![entity("c1", EntityLevel::Campaign, None)],
    )
    .await;
    fake.seed_insights(vec![record("c1", EntityLevel::Campaign)]).await;

    sync::refresh_all(&state).await.unwrap();

    let snapshot = db::load_catalog(&state.db).await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, "c1");

    let insights = db::load_insights(&state.db).await.unwrap();
    assert_eq!(insights.len(), 1);
    assert_eq!(insights[0].entity_id, "c1");
}

#[tokio::test]
async fn test_restore_snapshot_does_not_mark_loaded() {
    let (state, fake) = setup_state().await;
    fake.seed_catalog(
        EntityLevel::AdSet,
        vec![entity("s1", EntityLevel::AdSet, Some("c1"))],
    )
    .await;
    sync::refresh_all(&state).await.unwrap();

    // A fresh process restores the snapshot from the same database
    let restored = AppState::new(
        Arc::new(FakePlatform::new()),
        state.db.clone(),
        ServiceConfig::default(),
    );
    sync::restore_snapshot(&restored).await;

    let view = restored.catalog.view().await;
    assert!(view.adsets.contains_key("s1"));
    // Snapshot data renders but never drives child-dependent status rules
    assert!(!view.adsets_loaded);
}
