//! Insight aggregation: dedup, child-level backfill, merge, window rollup
//!
//! The insight feed is append-only and may hold several copies of the same
//! (entity, date, level) slice from ingestion retries, and the platform
//! sometimes materializes child-level rows days before the corresponding
//! direct rows at the requested level. This module turns that feed into at
//! most one row per (entity, date):
//!
//! 1. deduplicate by (entity, date, level), keeping the latest ingestion;
//! 2. take direct rows at the requested level;
//! 3. independently sum child-level rows up to the requested level;
//! 4. merge, preferring direct rows unless the direct row has zero spend
//!    while the child sum has spend (delayed propagation at the requested
//!    level);
//! 5. optionally collapse the window into one rollup per entity, summing
//!    raw terms so ratios can be recomputed downstream; per-day ratios
//!    are never averaged.
//!
//! Output ordering is deterministic (sorted by entity then date) so a
//! re-run over the same feed yields identical rows.

use std::collections::HashMap;

use admx_common::model::{ActionEntry, EntityLevel, InsightRecord};
use admx_common::numeric::finite;
use admx_common::DateRange;
use chrono::NaiveDate;

/// One merged (entity, date) metrics row at the requested level
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedRow {
    pub entity_id: String,
    pub level: EntityLevel,
    pub date: NaiveDate,
    pub campaign_id: Option<String>,
    pub adset_id: Option<String>,
    pub spend: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub reach: i64,
    pub actions: Vec<ActionEntry>,
    pub cost_per_action: Vec<ActionEntry>,
    pub objective: Option<String>,
    /// True when the row was synthesized from child-level sums
    pub backfilled: bool,
}

/// Whole-window sums for one entity; ratios are recomputed from these
/// terms by the report composer
#[derive(Debug, Clone, PartialEq)]
pub struct WindowRollup {
    pub entity_id: String,
    pub level: EntityLevel,
    pub spend: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub reach: i64,
    pub actions: Vec<ActionEntry>,
    pub objective: Option<String>,
    /// Latest reporting day that contributed data
    pub last_date: NaiveDate,
    /// True when every contributing day was backfilled from child rows
    pub backfilled: bool,
}

/// Keep only the latest ingestion of each (entity, date, level) slice
pub fn dedup_latest(records: &[InsightRecord]) -> Vec<&InsightRecord> {
    let mut latest: HashMap<(&str, NaiveDate, EntityLevel), &InsightRecord> = HashMap::new();
    for record in records {
        let key = (record.entity_id.as_str(), record.date, record.level);
        match latest.get(&key) {
            Some(existing) if existing.ingested_at >= record.ingested_at => {}
            _ => {
                latest.insert(key, record);
            }
        }
    }
    let mut rows: Vec<&InsightRecord> = latest.into_values().collect();
    rows.sort_by(|a, b| {
        (a.entity_id.as_str(), a.date, a.level.as_str())
            .cmp(&(b.entity_id.as_str(), b.date, b.level.as_str()))
    });
    rows
}

/// The record's ancestor id at the requested level, used to roll child
/// rows up one level
fn ancestor_at(record: &InsightRecord, level: EntityLevel) -> Option<&str> {
    match level {
        EntityLevel::Campaign => record.campaign_id.as_deref(),
        EntityLevel::AdSet => record.adset_id.as_deref(),
        EntityLevel::Ad => Some(record.entity_id.as_str()),
    }
}

fn matches_parent(record: &InsightRecord, level: EntityLevel, parent: Option<&str>) -> bool {
    let Some(parent) = parent else { return true };
    match level.parent() {
        Some(EntityLevel::Campaign) => record.campaign_id.as_deref() == Some(parent),
        Some(EntityLevel::AdSet) => record.adset_id.as_deref() == Some(parent),
        _ => true,
    }
}

/// Sum a set of action lists into one, per action type, deterministically
/// ordered by type
fn sum_actions<'a, I: IntoIterator<Item = &'a [ActionEntry]>>(lists: I) -> Vec<ActionEntry> {
    let mut sums: HashMap<String, f64> = HashMap::new();
    for list in lists {
        for entry in list {
            *sums.entry(entry.action_type.clone()).or_insert(0.0) += finite(entry.value);
        }
    }
    let mut merged: Vec<ActionEntry> = sums
        .into_iter()
        .map(|(action_type, value)| ActionEntry { action_type, value })
        .collect();
    merged.sort_by(|a, b| a.action_type.cmp(&b.action_type));
    merged
}

fn direct_row(record: &InsightRecord) -> AggregatedRow {
    AggregatedRow {
        entity_id: record.entity_id.clone(),
        level: record.level,
        date: record.date,
        campaign_id: record.campaign_id.clone(),
        adset_id: record.adset_id.clone(),
        spend: finite(record.spend),
        impressions: record.impressions.max(0),
        clicks: record.clicks.max(0),
        reach: record.reach.max(0),
        actions: sum_actions([record.actions.as_slice()]),
        cost_per_action: record.cost_per_action.clone(),
        objective: record.objective.clone(),
        backfilled: false,
    }
}

/// Synthesize per-(ancestor, date) aggregate rows from child-level records
fn backfill_rows(
    children: &[&InsightRecord],
    level: EntityLevel,
) -> HashMap<(String, NaiveDate), AggregatedRow> {
    let mut groups: HashMap<(String, NaiveDate), Vec<&InsightRecord>> = HashMap::new();
    for record in children {
        if let Some(ancestor) = ancestor_at(record, level) {
            groups
                .entry((ancestor.to_string(), record.date))
                .or_default()
                .push(record);
        }
    }

    groups
        .into_iter()
        .map(|((entity_id, date), members)| {
            let row = AggregatedRow {
                entity_id: entity_id.clone(),
                level,
                date,
                campaign_id: members.iter().find_map(|m| m.campaign_id.clone()),
                adset_id: match level {
                    // At ad-set level the synthesized row IS the ad-set
                    EntityLevel::AdSet => Some(entity_id.clone()),
                    _ => None,
                },
                spend: members.iter().map(|m| finite(m.spend)).sum(),
                impressions: members.iter().map(|m| m.impressions.max(0)).sum(),
                clicks: members.iter().map(|m| m.clicks.max(0)).sum(),
                reach: members.iter().map(|m| m.reach.max(0)).sum(),
                actions: sum_actions(members.iter().map(|m| m.actions.as_slice())),
                // Platform cost maps do not sum; downstream recomputes
                // cost from spend and the summed result.
                cost_per_action: Vec::new(),
                objective: members.iter().find_map(|m| m.objective.clone()),
                backfilled: true,
            };
            ((entity_id, date), row)
        })
        .collect()
}

/// Produce one merged row per (entity, date) at the requested level
pub fn aggregate_daily(
    records: &[InsightRecord],
    level: EntityLevel,
    parent: Option<&str>,
    range: &DateRange,
) -> Vec<AggregatedRow> {
    let deduped = dedup_latest(records);

    let direct: Vec<&InsightRecord> = deduped
        .iter()
        .copied()
        .filter(|r| r.level == level && range.contains(r.date) && matches_parent(r, level, parent))
        .collect();

    let mut merged: HashMap<(String, NaiveDate), AggregatedRow> = direct
        .iter()
        .map(|r| ((r.entity_id.clone(), r.date), direct_row(r)))
        .collect();

    if let Some(child_level) = level.child() {
        let children: Vec<&InsightRecord> = deduped
            .iter()
            .copied()
            .filter(|r| {
                r.level == child_level
                    && range.contains(r.date)
                    && matches_parent(r, level, parent)
            })
            .collect();

        for (key, synthesized) in backfill_rows(&children, level) {
            match merged.get(&key) {
                // Direct rows win unless they carry zero spend while the
                // child sum carries spend (delayed direct propagation).
                Some(existing) if !(existing.spend == 0.0 && synthesized.spend > 0.0) => {}
                _ => {
                    merged.insert(key, synthesized);
                }
            }
        }
    }

    let mut rows: Vec<AggregatedRow> = merged.into_values().collect();
    rows.sort_by(|a, b| (a.entity_id.as_str(), a.date).cmp(&(b.entity_id.as_str(), b.date)));
    rows
}

/// Collapse daily rows into one rollup per entity for the whole window
pub fn rollup_entities(daily: &[AggregatedRow]) -> Vec<WindowRollup> {
    let mut groups: HashMap<&str, Vec<&AggregatedRow>> = HashMap::new();
    for row in daily {
        groups.entry(row.entity_id.as_str()).or_default().push(row);
    }

    let mut rollups: Vec<WindowRollup> = groups
        .into_iter()
        .map(|(entity_id, rows)| WindowRollup {
            entity_id: entity_id.to_string(),
            level: rows[0].level,
            spend: rows.iter().map(|r| finite(r.spend)).sum(),
            impressions: rows.iter().map(|r| r.impressions).sum(),
            clicks: rows.iter().map(|r| r.clicks).sum(),
            reach: rows.iter().map(|r| r.reach).sum(),
            actions: sum_actions(rows.iter().map(|r| r.actions.as_slice())),
            objective: rows.iter().find_map(|r| r.objective.clone()),
            last_date: rows.iter().map(|r| r.date).max().unwrap_or_default(),
            backfilled: rows.iter().all(|r| r.backfilled),
        })
        .collect();
    rollups.sort_by(|a, b| a.entity_id.cmp(&b.entity_id));
    rollups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn record(
        entity: &str,
        level: EntityLevel,
        date: &str,
        spend: f64,
        ingested_secs: i64,
    ) -> InsightRecord {
        InsightRecord {
            entity_id: entity.to_string(),
            level,
            date: d(date),
            campaign_id: Some("c1".to_string()),
            adset_id: match level {
                EntityLevel::Ad => Some("s1".to_string()),
                EntityLevel::AdSet => Some(entity.to_string()),
                EntityLevel::Campaign => None,
            },
            spend,
            impressions: 100,
            clicks: 10,
            reach: 80,
            actions: vec![ActionEntry::new("lead", 2.0)],
            cost_per_action: vec![],
            objective: Some("LEAD_GENERATION".to_string()),
            ingested_at: Utc.timestamp_opt(1_700_000_000 + ingested_secs, 0).unwrap(),
        }
    }

    fn week() -> DateRange {
        DateRange::parse("2024-05-01", "2024-05-07").unwrap()
    }

    #[test]
    fn test_dedup_keeps_latest_ingestion() {
        let records = vec![
            record("s1", EntityLevel::AdSet, "2024-05-01", 10.0, 0),
            record("s1", EntityLevel::AdSet, "2024-05-01", 99.0, 60),
        ];
        let rows = aggregate_daily(&records, EntityLevel::AdSet, None, &week());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spend, 99.0);
    }

    #[test]
    fn test_backfill_sums_child_rows() {
        // No direct ad-set row; two ad rows under s1 on the same day
        let mut a1 = record("a1", EntityLevel::Ad, "2024-05-02", 10.0, 0);
        let mut a2 = record("a2", EntityLevel::Ad, "2024-05-02", 15.0, 0);
        a1.actions = vec![ActionEntry::new("lead", 1.0)];
        a2.actions = vec![ActionEntry::new("lead", 4.0)];
        let rows = aggregate_daily(&[a1, a2], EntityLevel::AdSet, None, &week());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.entity_id, "s1");
        assert_eq!(row.spend, 25.0);
        assert_eq!(row.impressions, 200);
        assert!(row.backfilled);
        assert_eq!(row.actions, vec![ActionEntry::new("lead", 5.0)]);
    }

    #[test]
    fn test_direct_with_spend_wins_over_backfill() {
        let direct = record("s1", EntityLevel::AdSet, "2024-05-02", 30.0, 0);
        let child = record("a1", EntityLevel::Ad, "2024-05-02", 25.0, 0);
        let rows = aggregate_daily(&[direct, child], EntityLevel::AdSet, None, &week());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spend, 30.0);
        assert!(!rows[0].backfilled);
    }

    #[test]
    fn test_zero_spend_direct_replaced_by_backfill() {
        let direct = record("s1", EntityLevel::AdSet, "2024-05-02", 0.0, 0);
        let child = record("a1", EntityLevel::Ad, "2024-05-02", 25.0, 0);
        let rows = aggregate_daily(&[direct, child], EntityLevel::AdSet, None, &week());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].spend, 25.0);
        assert!(rows[0].backfilled);
    }

    #[test]
    fn test_parent_filter() {
        let mut other = record("s2", EntityLevel::AdSet, "2024-05-02", 7.0, 0);
        other.campaign_id = Some("c2".to_string());
        let records = vec![
            record("s1", EntityLevel::AdSet, "2024-05-02", 30.0, 0),
            other,
        ];
        let rows = aggregate_daily(&records, EntityLevel::AdSet, Some("c1"), &week());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].entity_id, "s1");
    }

    #[test]
    fn test_window_excludes_out_of_range_dates() {
        let records = vec![
            record("s1", EntityLevel::AdSet, "2024-04-30", 5.0, 0),
            record("s1", EntityLevel::AdSet, "2024-05-03", 8.0, 0),
        ];
        let rows = aggregate_daily(&records, EntityLevel::AdSet, None, &week());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].date, d("2024-05-03"));
    }

    #[test]
    fn test_aggregation_is_idempotent() {
        let records = vec![
            record("s1", EntityLevel::AdSet, "2024-05-01", 10.0, 0),
            record("s1", EntityLevel::AdSet, "2024-05-01", 12.0, 30),
            record("a1", EntityLevel::Ad, "2024-05-02", 4.0, 0),
            record("a2", EntityLevel::Ad, "2024-05-02", 6.0, 0),
        ];
        let first = aggregate_daily(&records, EntityLevel::AdSet, None, &week());
        let second = aggregate_daily(&records, EntityLevel::AdSet, None, &week());
        assert_eq!(first, second);
    }

    #[test]
    fn test_rollup_sums_terms_and_tracks_last_date() {
        let records = vec![
            record("s1", EntityLevel::AdSet, "2024-05-01", 10.0, 0),
            record("s1", EntityLevel::AdSet, "2024-05-03", 20.0, 0),
        ];
        let daily = aggregate_daily(&records, EntityLevel::AdSet, None, &week());
        let rollups = rollup_entities(&daily);
        assert_eq!(rollups.len(), 1);
        let r = &rollups[0];
        assert_eq!(r.spend, 30.0);
        assert_eq!(r.impressions, 200);
        assert_eq!(r.clicks, 20);
        assert_eq!(r.last_date, d("2024-05-03"));
        assert_eq!(r.actions, vec![ActionEntry::new("lead", 4.0)]);
    }

    #[test]
    fn test_non_finite_spend_coerced_to_zero() {
        let mut bad = record("s1", EntityLevel::AdSet, "2024-05-01", f64::NAN, 0);
        bad.actions = vec![ActionEntry {
            action_type: "lead".to_string(),
            value: f64::INFINITY,
        }];
        let rows = aggregate_daily(&[bad], EntityLevel::AdSet, None, &week());
        assert_eq!(rows[0].spend, 0.0);
        assert_eq!(rows[0].actions[0].value, 0.0);
    }
}
