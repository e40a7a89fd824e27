//! Insight records: the time-series performance feed
//!
//! One record per (entity, date, level) as ingested by the sync job.
//! Records are append-only from the sync's perspective; ingestion retries
//! produce duplicates that the aggregation engine deduplicates by
//! `ingested_at`. A record carries parent linkage so child-level rows can
//! be rolled up to their ancestors without consulting the catalog.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::EntityLevel;

/// One named action count (or cost) from the platform's action breakdown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEntry {
    /// Platform action-type identifier, e.g. "lead", "purchase",
    /// "onsite_conversion.messaging_conversation_started_7d"
    pub action_type: String,
    pub value: f64,
}

impl ActionEntry {
    pub fn new(action_type: impl Into<String>, value: f64) -> Self {
        Self {
            action_type: action_type.into(),
            value: crate::numeric::finite(value),
        }
    }
}

/// One day of performance metrics for one entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightRecord {
    pub entity_id: String,
    pub level: EntityLevel,
    /// Reporting day (platform day granularity)
    pub date: NaiveDate,
    /// Owning campaign (present on all levels; equals `entity_id` for
    /// campaign-level rows)
    pub campaign_id: Option<String>,
    /// Owning ad-set (ad-level rows only)
    pub adset_id: Option<String>,
    /// Spend in display currency units
    pub spend: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub reach: i64,
    /// Ordered action breakdown as reported
    pub actions: Vec<ActionEntry>,
    /// Platform-computed cost per action type (same shape as `actions`)
    pub cost_per_action: Vec<ActionEntry>,
    /// Raw campaign objective string at ingestion time
    pub objective: Option<String>,
    /// Ingestion timestamp; the later record wins when the sync retries a
    /// (entity, date, level) slice
    pub ingested_at: DateTime<Utc>,
}

impl InsightRecord {
    /// Value of a named action type, if present
    pub fn action_value(&self, action_type: &str) -> Option<f64> {
        self.actions
            .iter()
            .find(|a| a.action_type == action_type)
            .map(|a| crate::numeric::finite(a.value))
    }
}
