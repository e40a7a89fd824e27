//! In-memory platform double for tests
//!
//! Serves canned catalog/insight data and records status updates. A
//! successful update mutates the canned catalog the way the real platform
//! would, so the toggle protocol's confirmation re-fetch observes the
//! change.

use std::collections::HashMap;
use std::sync::Arc;

use admx_common::model::{
    AccountHealth, CatalogEntity, ConfiguredStatus, EntityLevel, InsightRecord,
};
use admx_common::{DateRange, Error, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::PlatformApi;

/// How the fake responds to `update_status`
#[derive(Debug, Clone)]
pub enum UpdateBehavior {
    /// Accept and apply to the canned catalog
    Succeed,
    /// Accept, but leave the canned catalog unchanged (e.g. parent still
    /// paused on the platform side)
    AcceptWithoutEffect,
    Reject(String),
    RateLimit,
}

#[derive(Debug)]
struct FakeInner {
    catalog: HashMap<EntityLevel, Vec<CatalogEntity>>,
    insights: Vec<InsightRecord>,
    account: AccountHealth,
    update_behavior: UpdateBehavior,
    update_calls: Vec<(String, bool)>,
    fail_catalog_levels: Vec<EntityLevel>,
}

#[derive(Clone)]
pub struct FakePlatform {
    inner: Arc<Mutex<FakeInner>>,
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeInner {
                catalog: HashMap::new(),
                insights: Vec::new(),
                account: AccountHealth::Healthy,
                update_behavior: UpdateBehavior::Succeed,
                update_calls: Vec::new(),
                fail_catalog_levels: Vec::new(),
            })),
        }
    }

    pub async fn seed_catalog(&self, level: EntityLevel, entities: Vec<CatalogEntity>) {
        self.inner.lock().await.catalog.insert(level, entities);
    }

    pub async fn seed_insights(&self, records: Vec<InsightRecord>) {
        self.inner.lock().await.insights = records;
    }

    pub async fn set_account_health(&self, health: AccountHealth) {
        self.inner.lock().await.account = health;
    }

    pub async fn set_update_behavior(&self, behavior: UpdateBehavior) {
        self.inner.lock().await.update_behavior = behavior;
    }

    /// Make `fetch_catalog` fail for the given levels
    pub async fn fail_catalog_for(&self, levels: Vec<EntityLevel>) {
        self.inner.lock().await.fail_catalog_levels = levels;
    }

    /// Status updates received, in call order
    pub async fn update_calls(&self) -> Vec<(String, bool)> {
        self.inner.lock().await.update_calls.clone()
    }
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlatformApi for FakePlatform {
    async fn fetch_catalog(&self, level: EntityLevel) -> Result<Vec<CatalogEntity>> {
        let inner = self.inner.lock().await;
        if inner.fail_catalog_levels.contains(&level) {
            return Err(Error::Platform(format!("injected failure for {}", level)));
        }
        Ok(inner.catalog.get(&level).cloned().unwrap_or_default())
    }

    async fn fetch_insights(
        &self,
        level: EntityLevel,
        range: &DateRange,
    ) -> Result<Vec<InsightRecord>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .insights
            .iter()
            .filter(|r| r.level == level && range.contains(r.date))
            .cloned()
            .collect())
    }

    async fn account_status(&self) -> Result<AccountHealth> {
        Ok(self.inner.lock().await.account)
    }

    async fn update_status(&self, id: &str, level: EntityLevel, active: bool) -> Result<()> {
        let mut inner = self.inner.lock().await;
        inner.update_calls.push((id.to_string(), active));
        match inner.update_behavior.clone() {
            UpdateBehavior::Succeed => {
                if let Some(entities) = inner.catalog.get_mut(&level) {
                    if let Some(entity) = entities.iter_mut().find(|e| e.id == id) {
                        entity.configured_status = if active {
                            ConfiguredStatus::Active
                        } else {
                            ConfiguredStatus::Paused
                        };
                        entity.reported_status =
                            Some(if active { "ACTIVE" } else { "PAUSED" }.to_string());
                    }
                }
                Ok(())
            }
            UpdateBehavior::AcceptWithoutEffect => Ok(()),
            UpdateBehavior::Reject(reason) => Err(Error::StatusUpdateRejected { reason }),
            UpdateBehavior::RateLimit => Err(Error::StatusUpdateRateLimited),
        }
    }

    async fn set_account(&self, _account_id: &str) {}
}
