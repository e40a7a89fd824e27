//! Catalog store: cached structural entities per hierarchy level

use std::collections::HashMap;
use std::sync::Arc;

use admx_common::model::{AccountHealth, CatalogEntity, EntityLevel};
use tokio::sync::RwLock;

/// Shared catalog cache, overwritten level-by-level by the sync job
#[derive(Debug, Clone)]
pub struct CatalogStore {
    inner: Arc<RwLock<CatalogInner>>,
}

#[derive(Debug)]
struct CatalogInner {
    campaigns: HashMap<String, CatalogEntity>,
    adsets: HashMap<String, CatalogEntity>,
    ads: HashMap<String, CatalogEntity>,
    // A level is "loaded" only after a successful full sync of that level
    // this process lifetime. Snapshot warm-starts leave it false, so stale
    // disk data can never drive child-dependent status decisions.
    loaded: HashMap<EntityLevel, bool>,
    account: AccountHealth,
}

/// An immutable point-in-time view of the catalog, handed to the engine.
/// Report composition works on one view for its whole run, so a sync
/// landing mid-computation cannot produce a torn read.
#[derive(Debug, Clone)]
pub struct CatalogView {
    pub campaigns: HashMap<String, CatalogEntity>,
    pub adsets: HashMap<String, CatalogEntity>,
    pub ads: HashMap<String, CatalogEntity>,
    pub adsets_loaded: bool,
    pub account: AccountHealth,
}

impl CatalogView {
    /// Entities at a level, in unspecified order
    pub fn level(&self, level: EntityLevel) -> &HashMap<String, CatalogEntity> {
        match level {
            EntityLevel::Campaign => &self.campaigns,
            EntityLevel::AdSet => &self.adsets,
            EntityLevel::Ad => &self.ads,
        }
    }

    pub fn get(&self, level: EntityLevel, id: &str) -> Option<&CatalogEntity> {
        self.level(level).get(id)
    }

    /// Non-deleted child ad-sets of a campaign
    pub fn adsets_of(&self, campaign_id: &str) -> Vec<&CatalogEntity> {
        self.adsets
            .values()
            .filter(|e| e.parent_id.as_deref() == Some(campaign_id))
            .collect()
    }
}

impl CatalogStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(CatalogInner {
                campaigns: HashMap::new(),
                adsets: HashMap::new(),
                ads: HashMap::new(),
                loaded: HashMap::new(),
                account: AccountHealth::Healthy,
            })),
        }
    }

    /// Overwrite one level wholesale with freshly synced entities.
    /// `mark_loaded` is set by the sync job after a complete fetch and left
    /// false when restoring a disk snapshot.
    pub async fn replace_level(
        &self,
        level: EntityLevel,
        entities: Vec<CatalogEntity>,
        mark_loaded: bool,
    ) {
        let mut inner = self.inner.write().await;
        let map = match level {
            EntityLevel::Campaign => &mut inner.campaigns,
            EntityLevel::AdSet => &mut inner.adsets,
            EntityLevel::Ad => &mut inner.ads,
        };
        map.clear();
        for entity in entities {
            map.insert(entity.id.clone(), entity);
        }
        if mark_loaded {
            inner.loaded.insert(level, true);
        }
    }

    pub async fn set_account_health(&self, health: AccountHealth) {
        self.inner.write().await.account = health;
    }

    pub async fn get(&self, level: EntityLevel, id: &str) -> Option<CatalogEntity> {
        let inner = self.inner.read().await;
        let map = match level {
            EntityLevel::Campaign => &inner.campaigns,
            EntityLevel::AdSet => &inner.adsets,
            EntityLevel::Ad => &inner.ads,
        };
        map.get(id).cloned()
    }

    pub async fn is_loaded(&self, level: EntityLevel) -> bool {
        *self.inner.read().await.loaded.get(&level).unwrap_or(&false)
    }

    /// Snapshot the catalog for one report computation
    pub async fn view(&self) -> CatalogView {
        let inner = self.inner.read().await;
        CatalogView {
            campaigns: inner.campaigns.clone(),
            adsets: inner.adsets.clone(),
            ads: inner.ads.clone(),
            adsets_loaded: *inner.loaded.get(&EntityLevel::AdSet).unwrap_or(&false),
            account: inner.account,
        }
    }

    /// Drop everything, including loaded flags (account switch)
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.campaigns.clear();
        inner.adsets.clear();
        inner.ads.clear();
        inner.loaded.clear();
        inner.account = AccountHealth::Healthy;
    }
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admx_common::model::ConfiguredStatus;

    fn entity(id: &str, level: EntityLevel, parent: Option<&str>) -> CatalogEntity {
        CatalogEntity {
            id: id.to_string(),
            level,
            parent_id: parent.map(|p| p.to_string()),
            name: format!("entity {}", id),
            configured_status: ConfiguredStatus::Active,
            reported_status: Some("ACTIVE".to_string()),
            objective: None,
            daily_budget: 0,
            lifetime_budget: 0,
            is_deleted: false,
        }
    }

    #[tokio::test]
    async fn test_replace_level_overwrites_wholesale() {
        let store = CatalogStore::new();
        store
            .replace_level(
                EntityLevel::Campaign,
                vec![entity("c1", EntityLevel::Campaign, None)],
                true,
            )
            .await;
        store
            .replace_level(
                EntityLevel::Campaign,
                vec![entity("c2", EntityLevel::Campaign, None)],
                true,
            )
            .await;

        let view = store.view().await;
        assert!(view.campaigns.contains_key("c2"));
        assert!(!view.campaigns.contains_key("c1"));
    }

    #[tokio::test]
    async fn test_loaded_flag_lifecycle() {
        let store = CatalogStore::new();
        assert!(!store.is_loaded(EntityLevel::AdSet).await);

        // Snapshot restore does not mark loaded
        store
            .replace_level(
                EntityLevel::AdSet,
                vec![entity("s1", EntityLevel::AdSet, Some("c1"))],
                false,
            )
            .await;
        assert!(!store.is_loaded(EntityLevel::AdSet).await);

        // A full sync does
        store.replace_level(EntityLevel::AdSet, vec![], true).await;
        assert!(store.is_loaded(EntityLevel::AdSet).await);

        // Account switch resets everything
        store.clear().await;
        assert!(!store.is_loaded(EntityLevel::AdSet).await);
    }

    #[tokio::test]
    async fn test_adsets_of_filters_by_parent() {
        let store = CatalogStore::new();
        store
            .replace_level(
                EntityLevel::AdSet,
                vec![
                    entity("s1", EntityLevel::AdSet, Some("c1")),
                    entity("s2", EntityLevel::AdSet, Some("c1")),
                    entity("s3", EntityLevel::AdSet, Some("c2")),
                ],
                true,
            )
            .await;
        let view = store.view().await;
        assert_eq!(view.adsets_of("c1").len(), 2);
        assert_eq!(view.adsets_of("c2").len(), 1);
    }
}
