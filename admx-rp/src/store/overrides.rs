//! Status override store: the optimistic toggle layer
//!
//! A user toggle writes its intent here immediately so the next render
//! shows the new state before the platform call resolves. Overrides are
//! layered on top of the authoritative catalog and never persisted into
//! it; an entry is removed only by an explicit reconciliation decision
//! (confirmed toggle, failed toggle, account switch), never as a side
//! effect of reads. A newer toggle on the same entity supersedes the
//! pending one.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

/// One pending optimistic status intent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusOverride {
    pub intended_active: bool,
    pub issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OverrideStore {
    inner: Arc<RwLock<HashMap<String, StatusOverride>>>,
}

impl OverrideStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Record an intent, superseding any pending one for the entity.
    /// Returns the entry written, whose `issued_at` identifies it for a
    /// later conditional clear.
    pub async fn set(&self, entity_id: &str, intended_active: bool) -> StatusOverride {
        let entry = StatusOverride {
            intended_active,
            issued_at: Utc::now(),
        };
        self.inner
            .write()
            .await
            .insert(entity_id.to_string(), entry);
        entry
    }

    pub async fn get(&self, entity_id: &str) -> Option<StatusOverride> {
        self.inner.read().await.get(entity_id).copied()
    }

    /// Unconditional removal (failed toggle rollback)
    pub async fn remove(&self, entity_id: &str) {
        self.inner.write().await.remove(entity_id);
    }

    /// Remove only if the stored entry is still the given one; a newer
    /// toggle's override must survive an older toggle's reconciliation.
    pub async fn remove_if_matches(&self, entity_id: &str, entry: StatusOverride) -> bool {
        let mut map = self.inner.write().await;
        if map.get(entity_id) == Some(&entry) {
            map.remove(entity_id);
            true
        } else {
            false
        }
    }

    /// Snapshot for one report computation
    pub async fn snapshot(&self) -> HashMap<String, StatusOverride> {
        self.inner.read().await.clone()
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

impl Default for OverrideStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_newer_toggle_supersedes() {
        let store = OverrideStore::new();
        let first = store.set("e1", true).await;
        let second = store.set("e1", false).await;

        assert_eq!(store.get("e1").await.map(|o| o.intended_active), Some(false));

        // The first toggle's reconciliation must not clear the newer intent
        assert!(!store.remove_if_matches("e1", first).await);
        assert!(store.get("e1").await.is_some());

        assert!(store.remove_if_matches("e1", second).await);
        assert!(store.get("e1").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_on_account_switch() {
        let store = OverrideStore::new();
        store.set("e1", true).await;
        store.set("e2", false).await;
        store.clear().await;
        assert!(store.snapshot().await.is_empty());
    }
}
