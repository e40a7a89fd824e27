//! Report view composition
//!
//! Assembles the final row set for one level and date window: real rows
//! from the aggregation engine, synthetic zero rows for catalog entities
//! with no insight data in the window, status filtering and ordering.

use std::collections::HashMap;

use admx_common::model::{
    CatalogEntity, EffectiveStatus, EntityLevel, InsightRecord, ReportRow, ResolvedBudget,
};
use admx_common::numeric::{finite, round2, safe_div};
use admx_common::DateRange;

use crate::store::{CatalogView, StatusOverride};

use super::aggregate::{aggregate_daily, rollup_entities, WindowRollup};
use super::budget::resolve_budget;
use super::result::derive_result;
use super::status::resolve_status;

/// Sortable report columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Status,
    Name,
    Date,
    Spend,
    Impressions,
    Clicks,
    Reach,
    Ctr,
    Cpc,
    Cpm,
    Frequency,
    Result,
    CostPerResult,
    Budget,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "status" => Some(SortField::Status),
            "name" => Some(SortField::Name),
            "date" => Some(SortField::Date),
            "spend" => Some(SortField::Spend),
            "impressions" => Some(SortField::Impressions),
            "clicks" => Some(SortField::Clicks),
            "reach" => Some(SortField::Reach),
            "ctr" => Some(SortField::Ctr),
            "cpc" => Some(SortField::Cpc),
            "cpm" => Some(SortField::Cpm),
            "frequency" => Some(SortField::Frequency),
            "result" => Some(SortField::Result),
            "cost_per_result" => Some(SortField::CostPerResult),
            "budget" => Some(SortField::Budget),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SortSpec {
    pub field: SortField,
    pub descending: bool,
}

/// One report request
#[derive(Debug, Clone)]
pub struct ViewRequest {
    pub level: EntityLevel,
    /// Restrict to children of this entity (one level up)
    pub parent_id: Option<String>,
    pub range: DateRange,
    /// Explicit status allow-list; None applies the default filter
    /// (everything except DELETED and ARCHIVED)
    pub statuses: Option<Vec<EffectiveStatus>>,
    /// None applies the default status-tier ordering
    pub sort: Option<SortSpec>,
}

/// Campaign objective for an entity, resolved through its ancestors
fn objective_of(view: &CatalogView, entity: &CatalogEntity) -> Option<String> {
    if entity.objective.is_some() {
        return entity.objective.clone();
    }
    let mut current = Some(entity.clone());
    while let Some(e) = current {
        if let Some(objective) = e.objective {
            return Some(objective);
        }
        current = match (e.level.parent(), e.parent_id) {
            (Some(level), Some(id)) => view.get(level, &id).cloned(),
            _ => None,
        };
    }
    None
}

fn budget_for(view: &CatalogView, entity: &CatalogEntity, currency: &str) -> ResolvedBudget {
    match entity.level {
        EntityLevel::Campaign => {
            let children = view.adsets_of(&entity.id);
            resolve_budget(entity, &children, None, currency)
        }
        EntityLevel::AdSet => {
            let parent = entity
                .parent_id
                .as_deref()
                .and_then(|id| view.get(EntityLevel::Campaign, id));
            resolve_budget(entity, &[], parent, currency)
        }
        EntityLevel::Ad => resolve_budget(entity, &[], None, currency),
    }
}

fn row_from_rollup(
    view: &CatalogView,
    overrides: &HashMap<String, StatusOverride>,
    currency: &str,
    level: EntityLevel,
    rollup: &WindowRollup,
) -> ReportRow {
    let entity = view.get(level, &rollup.entity_id);
    let effective_status = resolve_status(view, overrides, level, &rollup.entity_id);
    let objective = rollup
        .objective
        .clone()
        .or_else(|| entity.and_then(|e| objective_of(view, e)));
    let result = derive_result(
        objective.as_deref(),
        &rollup.actions,
        &[],
        rollup.spend,
        rollup.reach,
    );

    ReportRow {
        entity_id: rollup.entity_id.clone(),
        level,
        // An insight row referencing an entity the catalog has dropped
        // still renders, under its id, with an unknown status.
        name: entity
            .map(|e| e.name.clone())
            .unwrap_or_else(|| rollup.entity_id.clone()),
        date: Some(rollup.last_date),
        effective_status,
        status_label: effective_status.display_vi().to_string(),
        budget: entity
            .map(|e| budget_for(view, e, currency))
            .unwrap_or_else(ResolvedBudget::zero),
        spend: finite(rollup.spend),
        impressions: rollup.impressions,
        clicks: rollup.clicks,
        reach: rollup.reach,
        ctr: round2(safe_div(rollup.clicks as f64 * 100.0, rollup.impressions as f64)),
        cpc: round2(safe_div(rollup.spend, rollup.clicks as f64)),
        cpm: round2(safe_div(rollup.spend * 1000.0, rollup.impressions as f64)),
        frequency: round2(safe_div(rollup.impressions as f64, rollup.reach as f64)),
        result_count: result.count,
        result_label: result.label.to_string(),
        cost_per_result: result.cost_per_result,
        is_synthetic: false,
    }
}

/// Zero-metric row for a catalog entity with no insight data in the window
fn synthetic_row(
    view: &CatalogView,
    overrides: &HashMap<String, StatusOverride>,
    currency: &str,
    entity: &CatalogEntity,
) -> ReportRow {
    let effective_status = resolve_status(view, overrides, entity.level, &entity.id);
    let objective = objective_of(view, entity);
    let result = derive_result(objective.as_deref(), &[], &[], 0.0, 0);

    ReportRow {
        entity_id: entity.id.clone(),
        level: entity.level,
        name: entity.name.clone(),
        date: None,
        effective_status,
        status_label: effective_status.display_vi().to_string(),
        budget: budget_for(view, entity, currency),
        spend: 0.0,
        impressions: 0,
        clicks: 0,
        reach: 0,
        ctr: 0.0,
        cpc: 0.0,
        cpm: 0.0,
        frequency: 0.0,
        result_count: 0.0,
        result_label: result.label.to_string(),
        cost_per_result: 0.0,
        is_synthetic: true,
    }
}

fn passes_filter(row: &ReportRow, statuses: &Option<Vec<EffectiveStatus>>) -> bool {
    match statuses {
        // Rows whose status cannot be determined are always kept
        Some(allowed) => {
            row.effective_status == EffectiveStatus::Unknown
                || allowed.contains(&row.effective_status)
        }
        None => !matches!(
            row.effective_status,
            EffectiveStatus::Deleted | EffectiveStatus::Archived
        ),
    }
}

fn cmp_f64(a: f64, b: f64) -> std::cmp::Ordering {
    finite(a).partial_cmp(&finite(b)).unwrap_or(std::cmp::Ordering::Equal)
}

/// Default order: status tier ascending, latest data first within a tier
fn default_cmp(a: &ReportRow, b: &ReportRow) -> std::cmp::Ordering {
    a.effective_status
        .sort_tier()
        .cmp(&b.effective_status.sort_tier())
        .then(b.date.cmp(&a.date)) // date descending, None last
        .then(a.name.cmp(&b.name))
}

fn sort_rows(rows: &mut [ReportRow], sort: &Option<SortSpec>) {
    let Some(spec) = sort else {
        rows.sort_by(default_cmp);
        return;
    };

    match spec.field {
        // Explicit status sort reuses the tiering
        SortField::Status => rows.sort_by(|a, b| {
            let ordering = a
                .effective_status
                .sort_tier()
                .cmp(&b.effective_status.sort_tier());
            let ordering = if spec.descending { ordering.reverse() } else { ordering };
            ordering.then(b.date.cmp(&a.date)).then(a.name.cmp(&b.name))
        }),
        field => rows.sort_by(|a, b| {
            let ordering = match field {
                SortField::Name => a.name.cmp(&b.name),
                SortField::Date => match (a.date, b.date) {
                    // Rows without a date sort last regardless of direction
                    (None, None) => std::cmp::Ordering::Equal,
                    (None, Some(_)) => return std::cmp::Ordering::Greater,
                    (Some(_), None) => return std::cmp::Ordering::Less,
                    (Some(x), Some(y)) => x.cmp(&y),
                },
                SortField::Spend => cmp_f64(a.spend, b.spend),
                SortField::Impressions => a.impressions.cmp(&b.impressions),
                SortField::Clicks => a.clicks.cmp(&b.clicks),
                SortField::Reach => a.reach.cmp(&b.reach),
                SortField::Ctr => cmp_f64(a.ctr, b.ctr),
                SortField::Cpc => cmp_f64(a.cpc, b.cpc),
                SortField::Cpm => cmp_f64(a.cpm, b.cpm),
                SortField::Frequency => cmp_f64(a.frequency, b.frequency),
                SortField::Result => cmp_f64(a.result_count, b.result_count),
                SortField::CostPerResult => cmp_f64(a.cost_per_result, b.cost_per_result),
                SortField::Budget => cmp_f64(a.budget.amount, b.budget.amount),
                SortField::Status => unreachable!(),
            };
            let ordering = if spec.descending { ordering.reverse() } else { ordering };
            ordering.then(a.name.cmp(&b.name))
        }),
    }
}

/// Compose the report for one level, window and filter
pub fn compose(
    view: &CatalogView,
    overrides: &HashMap<String, StatusOverride>,
    insights: &[InsightRecord],
    currency: &str,
    request: &ViewRequest,
) -> Vec<ReportRow> {
    let daily = aggregate_daily(
        insights,
        request.level,
        request.parent_id.as_deref(),
        &request.range,
    );
    let rollups = rollup_entities(&daily);

    let mut rows: Vec<ReportRow> = rollups
        .iter()
        .map(|r| row_from_rollup(view, overrides, currency, request.level, r))
        .collect();

    // Catalog entities with no delivery in the window still appear
    let covered: std::collections::HashSet<&str> =
        rollups.iter().map(|r| r.entity_id.as_str()).collect();
    for entity in view.level(request.level).values() {
        if covered.contains(entity.id.as_str()) {
            continue;
        }
        if let Some(parent) = request.parent_id.as_deref() {
            if entity.parent_id.as_deref() != Some(parent) {
                continue;
            }
        }
        rows.push(synthetic_row(view, overrides, currency, entity));
    }

    rows.retain(|row| passes_filter(row, &request.statuses));
    sort_rows(&mut rows, &request.sort);
    rows
}
