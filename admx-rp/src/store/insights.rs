//! Insight store: the raw time-series performance feed
//!
//! Append-only from the sync job's perspective. Duplicate
//! (entity, date, level) rows from ingestion retries are expected and kept;
//! deduplication by `ingested_at` is the aggregation engine's job, so the
//! store stays a faithful record of what was ingested.

use std::sync::Arc;

use admx_common::model::InsightRecord;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
pub struct InsightStore {
    inner: Arc<RwLock<Vec<InsightRecord>>>,
}

impl InsightStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append a batch of freshly ingested records
    pub async fn extend(&self, records: Vec<InsightRecord>) {
        self.inner.write().await.extend(records);
    }

    /// Replace the whole feed (full refresh)
    pub async fn replace_all(&self, records: Vec<InsightRecord>) {
        *self.inner.write().await = records;
    }

    /// Snapshot the feed for one report computation
    pub async fn snapshot(&self) -> Vec<InsightRecord> {
        self.inner.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }
}

impl Default for InsightStore {
    fn default() -> Self {
        Self::new()
    }
}
