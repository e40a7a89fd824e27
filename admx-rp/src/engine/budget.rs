//! Effective budget resolution
//!
//! An entity's displayed budget is its own daily budget, else its lifetime
//! budget. Campaigns running ad-set-level budget optimization have no own
//! budget; their display value is the sum of live child ad-set daily
//! budgets. Conversely an ad-set under campaign-level budget optimization
//! displays its owning campaign's budget. Only one inheritance direction
//! ever applies to a row.

use admx_common::model::{BudgetKind, BudgetSource, CatalogEntity, EntityLevel, ResolvedBudget};
use admx_common::numeric::finite;

/// Currencies whose minor unit equals the major unit: raw amounts are
/// already display values and must not be divided by 100.
const ZERO_DECIMAL_CURRENCIES: &[&str] = &["VND", "JPY", "KRW", "TWD", "CLP", "ISK", "UGX"];

fn is_zero_decimal(currency: &str) -> bool {
    ZERO_DECIMAL_CURRENCIES.contains(&currency.to_ascii_uppercase().as_str())
}

/// Normalize a minor-unit amount into a display value for the account
/// currency
pub fn normalize_amount(raw: i64, currency: &str) -> f64 {
    if is_zero_decimal(currency) {
        raw as f64
    } else {
        raw as f64 / 100.0
    }
}

fn with_estimates(amount: f64, kind: BudgetKind, source: BudgetSource) -> ResolvedBudget {
    // Calendar-period figures are flat multiples of the daily value:
    // estimates, not calendar-exact. Lifetime budgets have no daily basis.
    let daily = match kind {
        BudgetKind::Daily => finite(amount),
        BudgetKind::Lifetime => 0.0,
    };
    ResolvedBudget {
        amount: finite(amount),
        kind,
        is_inherited: !matches!(source, BudgetSource::Own),
        source,
        weekly: daily * 7.0,
        monthly: daily * 30.0,
        quarterly: daily * 90.0,
        yearly: daily * 365.0,
    }
}

/// Resolve the display budget for one entity.
///
/// `siblings_or_children` supplies the related entities the fallback rules
/// need: for a campaign, its child ad-sets; for an ad-set, its owning
/// campaign (as a single-element slice). Ads have no budget of their own
/// and resolve to zero.
pub fn resolve_budget(
    entity: &CatalogEntity,
    children: &[&CatalogEntity],
    parent: Option<&CatalogEntity>,
    currency: &str,
) -> ResolvedBudget {
    // Own budget first: daily wins over lifetime.
    if entity.daily_budget > 0 {
        return with_estimates(
            normalize_amount(entity.daily_budget, currency),
            BudgetKind::Daily,
            BudgetSource::Own,
        );
    }
    if entity.lifetime_budget > 0 {
        return with_estimates(
            normalize_amount(entity.lifetime_budget, currency),
            BudgetKind::Lifetime,
            BudgetSource::Own,
        );
    }

    match entity.level {
        EntityLevel::Campaign => {
            // Ad-set-budgeted campaign: sum live child daily budgets.
            let sum: i64 = children
                .iter()
                .filter(|c| {
                    !c.is_deleted
                        && c.reported_status.as_deref() != Some("ARCHIVED")
                        && c.reported_status.as_deref() != Some("DELETED")
                })
                .map(|c| c.daily_budget.max(0))
                .sum();
            if sum > 0 {
                return with_estimates(
                    normalize_amount(sum, currency),
                    BudgetKind::Daily,
                    BudgetSource::ChildAdsets,
                );
            }
            ResolvedBudget::zero()
        }
        EntityLevel::AdSet => {
            // Campaign-budgeted ad-set: display the owning campaign's budget.
            if let Some(campaign) = parent {
                if campaign.daily_budget > 0 {
                    return with_estimates(
                        normalize_amount(campaign.daily_budget, currency),
                        BudgetKind::Daily,
                        BudgetSource::ParentCampaign,
                    );
                }
                if campaign.lifetime_budget > 0 {
                    return with_estimates(
                        normalize_amount(campaign.lifetime_budget, currency),
                        BudgetKind::Lifetime,
                        BudgetSource::ParentCampaign,
                    );
                }
            }
            ResolvedBudget::zero()
        }
        EntityLevel::Ad => ResolvedBudget::zero(),
    }
}
