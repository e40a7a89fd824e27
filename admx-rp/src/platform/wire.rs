//! Wire types for the Marketing API
//!
//! The platform serializes most numbers as decimal strings and omits empty
//! collections entirely; everything here is Option-heavy and coerced into
//! the domain models in one place.

use admx_common::model::{
    ActionEntry, CatalogEntity, ConfiguredStatus, EntityLevel, InsightRecord,
};
use admx_common::numeric::finite;
use chrono::{NaiveDate, Utc};
use serde::Deserialize;

/// Standard list envelope with cursor paging
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Envelope<T> {
    #[serde(default)]
    pub data: Vec<T>,
    pub paging: Option<Paging>,
}

#[derive(Debug, Deserialize)]
pub struct Paging {
    pub next: Option<String>,
}

/// Error envelope returned with non-2xx responses
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: PlatformError,
}

#[derive(Debug, Deserialize)]
pub struct PlatformError {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: i64,
    pub error_subcode: Option<i64>,
}

/// Platform error codes signalling throttling rather than refusal
const RATE_LIMIT_CODES: &[i64] = &[4, 17, 32, 613];

impl PlatformError {
    pub fn is_rate_limit(&self) -> bool {
        RATE_LIMIT_CODES.contains(&self.code)
            || self
                .error_subcode
                .map(|sub| RATE_LIMIT_CODES.contains(&sub))
                .unwrap_or(false)
    }
}

/// One catalog entity as returned by the campaigns/adsets/ads edges
#[derive(Debug, Deserialize)]
pub struct RawEntity {
    pub id: String,
    pub name: Option<String>,
    /// Configured (user-intent) status
    pub status: Option<String>,
    /// Status after the platform's own inheritance pass
    pub effective_status: Option<String>,
    pub objective: Option<String>,
    pub daily_budget: Option<String>,
    pub lifetime_budget: Option<String>,
    pub campaign_id: Option<String>,
    pub adset_id: Option<String>,
}

fn parse_minor_units(raw: &Option<String>) -> i64 {
    raw.as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0)
        .max(0)
}

impl RawEntity {
    pub fn into_catalog(self, level: EntityLevel) -> CatalogEntity {
        let configured = match self.status.as_deref() {
            Some("ACTIVE") => ConfiguredStatus::Active,
            _ => ConfiguredStatus::Paused,
        };
        let is_deleted = self.status.as_deref() == Some("DELETED")
            || self.effective_status.as_deref() == Some("DELETED");
        let parent_id = match level {
            EntityLevel::Campaign => None,
            EntityLevel::AdSet => self.campaign_id.clone(),
            EntityLevel::Ad => self.adset_id.clone(),
        };
        CatalogEntity {
            id: self.id,
            level,
            parent_id,
            name: self.name.unwrap_or_default(),
            configured_status: configured,
            reported_status: self.effective_status,
            objective: self.objective,
            daily_budget: parse_minor_units(&self.daily_budget),
            lifetime_budget: parse_minor_units(&self.lifetime_budget),
            is_deleted,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RawAction {
    pub action_type: String,
    pub value: Option<String>,
}

impl RawAction {
    fn into_entry(self) -> ActionEntry {
        let value = self
            .value
            .as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0);
        ActionEntry::new(self.action_type, finite(value))
    }
}

/// One insight row as returned by the insights edge
#[derive(Debug, Deserialize)]
pub struct RawInsight {
    pub campaign_id: Option<String>,
    pub adset_id: Option<String>,
    pub ad_id: Option<String>,
    pub date_start: Option<String>,
    pub spend: Option<String>,
    pub impressions: Option<String>,
    pub clicks: Option<String>,
    pub reach: Option<String>,
    pub actions: Option<Vec<RawAction>>,
    pub cost_per_action_type: Option<Vec<RawAction>>,
    pub objective: Option<String>,
}

fn parse_f64(raw: &Option<String>) -> f64 {
    finite(
        raw.as_deref()
            .and_then(|s| s.parse::<f64>().ok())
            .unwrap_or(0.0),
    )
}

fn parse_i64(raw: &Option<String>) -> i64 {
    raw.as_deref()
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0)
        .max(0)
}

impl RawInsight {
    /// Convert one wire row, stamping the ingestion time. Rows with no
    /// usable entity id or date are malformed and dropped by the caller.
    pub fn into_record(self, level: EntityLevel) -> Option<InsightRecord> {
        let entity_id = match level {
            EntityLevel::Campaign => self.campaign_id.clone(),
            EntityLevel::AdSet => self.adset_id.clone(),
            EntityLevel::Ad => self.ad_id.clone(),
        }?;
        let date =
            NaiveDate::parse_from_str(self.date_start.as_deref()?, "%Y-%m-%d").ok()?;

        Some(InsightRecord {
            entity_id,
            level,
            date,
            campaign_id: self.campaign_id,
            adset_id: self.adset_id,
            spend: parse_f64(&self.spend),
            impressions: parse_i64(&self.impressions),
            clicks: parse_i64(&self.clicks),
            reach: parse_i64(&self.reach),
            actions: self
                .actions
                .unwrap_or_default()
                .into_iter()
                .map(RawAction::into_entry)
                .collect(),
            cost_per_action: self
                .cost_per_action_type
                .unwrap_or_default()
                .into_iter()
                .map(RawAction::into_entry)
                .collect(),
            objective: self.objective,
            ingested_at: Utc::now(),
        })
    }
}

/// Account metadata for the health probe
#[derive(Debug, Deserialize)]
pub struct RawAccount {
    pub account_status: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_coercion() {
        let raw: RawEntity = serde_json::from_str(
            r#"{
                "id": "123",
                "name": "Summer push",
                "status": "ACTIVE",
                "effective_status": "CAMPAIGN_PAUSED",
                "campaign_id": "99",
                "daily_budget": "150000"
            }"#,
        )
        .unwrap();
        let entity = raw.into_catalog(EntityLevel::AdSet);
        assert_eq!(entity.parent_id.as_deref(), Some("99"));
        assert_eq!(entity.daily_budget, 150_000);
        assert_eq!(entity.configured_status, ConfiguredStatus::Active);
        assert_eq!(entity.reported_status.as_deref(), Some("CAMPAIGN_PAUSED"));
        assert!(!entity.is_deleted);
    }

    #[test]
    fn test_insight_coercion_and_malformed_drop() {
        let raw: RawInsight = serde_json::from_str(
            r#"{
                "adset_id": "7",
                "campaign_id": "3",
                "date_start": "2024-05-01",
                "spend": "12.5",
                "impressions": "1000",
                "clicks": "not-a-number",
                "actions": [{"action_type": "lead", "value": "4"}]
            }"#,
        )
        .unwrap();
        let record = raw.into_record(EntityLevel::AdSet).unwrap();
        assert_eq!(record.entity_id, "7");
        assert_eq!(record.spend, 12.5);
        assert_eq!(record.clicks, 0); // unparseable coerces to 0
        assert_eq!(record.actions, vec![ActionEntry::new("lead", 4.0)]);

        // A row with no date is dropped, not an error
        let no_date: RawInsight =
            serde_json::from_str(r#"{"adset_id": "7"}"#).unwrap();
        assert!(no_date.into_record(EntityLevel::AdSet).is_none());
    }

    #[test]
    fn test_rate_limit_codes() {
        let err = PlatformError {
            message: "limit".to_string(),
            code: 17,
            error_subcode: None,
        };
        assert!(err.is_rate_limit());
        let err = PlatformError {
            message: "denied".to_string(),
            code: 10,
            error_subcode: None,
        };
        assert!(!err.is_rate_limit());
    }
}
