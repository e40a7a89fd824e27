//! Report rows: the composed output handed to the presentation layer
//!
//! Rows are computed fresh on every report request from the catalog,
//! insight and override stores; nothing here is persisted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{EffectiveStatus, EntityLevel};

/// Which budget field the resolved amount came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetKind {
    Daily,
    Lifetime,
}

/// Where the displayed budget is owned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetSource {
    /// The entity's own budget field
    Own,
    /// Campaign with no own budget: sum of child ad-set daily budgets
    ChildAdsets,
    /// Ad-set with no own budget: displaying the owning campaign's budget
    ParentCampaign,
}

/// Resolved display budget for one report row
///
/// The weekly/monthly/quarterly/yearly figures are flat multiples of the
/// daily value (x7 / x30 / x90 / x365): estimates, not calendar-exact.
/// They are 0 for lifetime budgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedBudget {
    /// Normalized display amount (minor units already divided out for
    /// decimal currencies)
    pub amount: f64,
    pub kind: BudgetKind,
    /// True when the amount was inherited across a hierarchy level
    pub is_inherited: bool,
    pub source: BudgetSource,
    pub weekly: f64,
    pub monthly: f64,
    pub quarterly: f64,
    pub yearly: f64,
}

impl ResolvedBudget {
    /// A zero budget with no inheritance, for entities with nothing set
    pub fn zero() -> Self {
        Self {
            amount: 0.0,
            kind: BudgetKind::Daily,
            is_inherited: false,
            source: BudgetSource::Own,
            weekly: 0.0,
            monthly: 0.0,
            quarterly: 0.0,
            yearly: 0.0,
        }
    }
}

/// One composed report row: an entity with resolved status, budget and
/// window-aggregated metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportRow {
    pub entity_id: String,
    pub level: EntityLevel,
    pub name: String,
    /// Latest reporting day contributing data; None for synthetic rows
    pub date: Option<NaiveDate>,
    pub effective_status: EffectiveStatus,
    /// Vietnamese display label for the status
    pub status_label: String,
    pub budget: ResolvedBudget,
    pub spend: f64,
    pub impressions: i64,
    pub clicks: i64,
    pub reach: i64,
    /// Click-through rate in percent (clicks / impressions x 100)
    pub ctr: f64,
    /// Cost per click
    pub cpc: f64,
    /// Cost per 1000 impressions
    pub cpm: f64,
    /// Average impressions per person reached
    pub frequency: f64,
    /// Objective-appropriate result count
    pub result_count: f64,
    /// Vietnamese label of the chosen result metric
    pub result_label: String,
    pub cost_per_result: f64,
    /// True for rows synthesized for catalog entities with no insight data
    /// in the window ("no delivery yet", as opposed to zero-result delivery)
    pub is_synthetic: bool,
}
