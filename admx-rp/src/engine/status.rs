//! Effective status resolution
//!
//! The status governing whether an entity delivers is derived purely from
//! catalog state (its own and its ancestors') plus the optimistic override
//! map, never from insight rows, whose status fields are ingestion-time
//! snapshots that may be stale.
//!
//! Resolution is an ordered table of pure rules evaluated top to bottom;
//! the first rule producing a status wins. Override substitution (the
//! optimistic toggle layer) happens while building the context, before any
//! rule runs.

use std::collections::HashMap;

use admx_common::model::{
    AccountHealth, CatalogEntity, EffectiveStatus, EntityLevel,
};

use crate::store::{CatalogView, StatusOverride};

/// Everything a rule may look at, assembled once per resolution
pub(crate) struct StatusContext<'a> {
    account: AccountHealth,
    entity: Option<&'a CatalogEntity>,
    /// Own status after override substitution (None when no catalog record)
    own: Option<EffectiveStatus>,
    /// Ancestor own-statuses, nearest first (ad-set before campaign)
    ancestors: Vec<(EntityLevel, EffectiveStatus)>,
    /// Campaign-only: whether every non-deleted child ad-set resolves to a
    /// non-running status. None when the ad-set level has not completed a
    /// full sync; the downgrade must never fire on partial data.
    children_all_stopped: Option<bool>,
}

type Rule = fn(&StatusContext) -> Option<EffectiveStatus>;

/// Rule table in precedence order; first match wins
const RULES: &[(&str, Rule)] = &[
    ("account_block", rule_account_block),
    ("missing_catalog", rule_missing_catalog),
    ("deleted", rule_deleted),
    ("ancestor_terminal", rule_ancestor_terminal),
    ("campaign_paused", rule_campaign_paused),
    ("adset_paused", rule_adset_paused),
    ("all_children_stopped", rule_all_children_stopped),
    ("own_status", rule_own_status),
];

/// An account-level block overrides everything, including overrides
fn rule_account_block(ctx: &StatusContext) -> Option<EffectiveStatus> {
    match ctx.account {
        AccountHealth::Disabled => Some(EffectiveStatus::AccountDisabled),
        AccountHealth::Unpaid => Some(EffectiveStatus::AccountUnsettled),
        AccountHealth::Healthy => None,
    }
}

/// No catalog record at all: render a neutral state, never fail
fn rule_missing_catalog(ctx: &StatusContext) -> Option<EffectiveStatus> {
    if ctx.entity.is_none() {
        Some(EffectiveStatus::Unknown)
    } else {
        None
    }
}

fn rule_deleted(ctx: &StatusContext) -> Option<EffectiveStatus> {
    ctx.entity
        .filter(|e| e.is_deleted)
        .map(|_| EffectiveStatus::Deleted)
}

/// ARCHIVED/DELETED on any ancestor propagates down the whole chain
fn rule_ancestor_terminal(ctx: &StatusContext) -> Option<EffectiveStatus> {
    ctx.ancestors.iter().find_map(|(_, status)| match status {
        EffectiveStatus::Archived | EffectiveStatus::Deleted => Some(*status),
        _ => None,
    })
}

fn rule_campaign_paused(ctx: &StatusContext) -> Option<EffectiveStatus> {
    ctx.ancestors
        .iter()
        .find(|(level, status)| {
            *level == EntityLevel::Campaign && *status == EffectiveStatus::Paused
        })
        .map(|_| EffectiveStatus::CampaignPaused)
}

fn rule_adset_paused(ctx: &StatusContext) -> Option<EffectiveStatus> {
    ctx.ancestors
        .iter()
        .find(|(level, status)| {
            *level == EntityLevel::AdSet && *status == EffectiveStatus::Paused
        })
        .map(|_| EffectiveStatus::AdsetPaused)
}

/// An "active" campaign whose children are all stopped produces no
/// delivery; display it as ADSET_PAUSED
fn rule_all_children_stopped(ctx: &StatusContext) -> Option<EffectiveStatus> {
    if ctx.own == Some(EffectiveStatus::Active) && ctx.children_all_stopped == Some(true) {
        Some(EffectiveStatus::AdsetPaused)
    } else {
        None
    }
}

fn rule_own_status(ctx: &StatusContext) -> Option<EffectiveStatus> {
    ctx.own
}

/// Own status of an entity: the optimistic override when one is pending,
/// else the raw reported status, else the configured intent
fn own_status(
    entity: &CatalogEntity,
    overrides: &HashMap<String, StatusOverride>,
) -> EffectiveStatus {
    if let Some(pending) = overrides.get(&entity.id) {
        return if pending.intended_active {
            EffectiveStatus::Active
        } else {
            EffectiveStatus::Paused
        };
    }
    match entity.reported_status.as_deref() {
        Some(raw) if !raw.is_empty() => EffectiveStatus::from_reported(raw),
        _ => {
            if entity.configured_status.is_active() {
                EffectiveStatus::Active
            } else {
                EffectiveStatus::Paused
            }
        }
    }
}

/// Ancestor chain own-statuses, nearest ancestor first. A parent id with
/// no catalog record contributes nothing (the entity still resolves from
/// what is known).
fn ancestor_chain(
    view: &CatalogView,
    overrides: &HashMap<String, StatusOverride>,
    entity: &CatalogEntity,
) -> Vec<(EntityLevel, EffectiveStatus)> {
    let mut chain = Vec::new();
    let mut level = entity.level;
    let mut parent_id = entity.parent_id.clone();

    while let (Some(parent_level), Some(id)) = (level.parent(), parent_id.take()) {
        if let Some(parent) = view.get(parent_level, &id) {
            let status = if parent.is_deleted {
                EffectiveStatus::Deleted
            } else {
                own_status(parent, overrides)
            };
            chain.push((parent_level, status));
            parent_id = parent.parent_id.clone();
        }
        level = parent_level;
    }
    chain
}

/// Resolve the effective status of one entity
pub fn resolve_status(
    view: &CatalogView,
    overrides: &HashMap<String, StatusOverride>,
    level: EntityLevel,
    id: &str,
) -> EffectiveStatus {
    let entity = view.get(level, id);
    let own = entity.map(|e| own_status(e, overrides));

    let children_all_stopped = match (entity, own) {
        (Some(e), Some(EffectiveStatus::Active))
            if e.level == EntityLevel::Campaign && view.adsets_loaded =>
        {
            let children: Vec<_> = view
                .adsets_of(&e.id)
                .into_iter()
                .filter(|c| !c.is_deleted)
                .collect();
            if children.is_empty() {
                // A campaign with no ad-sets yet is simply not delivering;
                // do not relabel it.
                Some(false)
            } else {
                Some(children.iter().all(|c| {
                    !resolve_status(view, overrides, EntityLevel::AdSet, &c.id).is_running()
                }))
            }
        }
        _ => None,
    };

    let ctx = StatusContext {
        account: view.account,
        entity,
        own,
        ancestors: entity
            .map(|e| ancestor_chain(view, overrides, e))
            .unwrap_or_default(),
        children_all_stopped,
    };

    for (name, rule) in RULES {
        if let Some(status) = rule(&ctx) {
            tracing::trace!(entity = id, rule = name, status = %status, "status resolved");
            return status;
        }
    }
    EffectiveStatus::Unknown
}
