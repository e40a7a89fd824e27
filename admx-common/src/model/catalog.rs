//! Catalog entities: the structural campaign / ad-set / ad hierarchy
//!
//! Catalog records are owned and overwritten wholesale by the periodic
//! catalog sync. Everything downstream (status resolution, budgets, report
//! composition) treats them as read-only input.

use serde::{Deserialize, Serialize};

/// The three levels of an advertising account hierarchy (top to bottom)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityLevel {
    Campaign,
    #[serde(rename = "adset")]
    AdSet,
    Ad,
}

impl EntityLevel {
    /// Wire name used in API paths and query parameters
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityLevel::Campaign => "campaign",
            EntityLevel::AdSet => "adset",
            EntityLevel::Ad => "ad",
        }
    }

    /// Parse a wire name ("campaign" | "adset" | "ad")
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "campaign" => Some(EntityLevel::Campaign),
            "adset" => Some(EntityLevel::AdSet),
            "ad" => Some(EntityLevel::Ad),
            _ => None,
        }
    }

    /// The level one step up the hierarchy (None for campaigns)
    pub fn parent(&self) -> Option<EntityLevel> {
        match self {
            EntityLevel::Campaign => None,
            EntityLevel::AdSet => Some(EntityLevel::Campaign),
            EntityLevel::Ad => Some(EntityLevel::AdSet),
        }
    }

    /// The level one step down the hierarchy (None for ads)
    pub fn child(&self) -> Option<EntityLevel> {
        match self {
            EntityLevel::Campaign => Some(EntityLevel::AdSet),
            EntityLevel::AdSet => Some(EntityLevel::Ad),
            EntityLevel::Ad => None,
        }
    }
}

impl std::fmt::Display for EntityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// User intent for an entity: the on/off switch state, independent of what
/// the platform currently reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfiguredStatus {
    Active,
    Paused,
}

impl ConfiguredStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfiguredStatus::Active => "ACTIVE",
            ConfiguredStatus::Paused => "PAUSED",
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ConfiguredStatus::Active)
    }
}

/// One structural entity as last reported by the platform catalog sync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntity {
    /// Platform-assigned identifier (numeric string)
    pub id: String,
    pub level: EntityLevel,
    /// Ad-set -> owning campaign, ad -> owning ad-set; None for campaigns
    pub parent_id: Option<String>,
    pub name: String,
    /// User intent (the toggle switch)
    pub configured_status: ConfiguredStatus,
    /// Raw status string reported by the platform; may carry transitional
    /// or error states ("IN_PROCESS", "WITH_ISSUES", ...). None when the
    /// platform omitted the field.
    pub reported_status: Option<String>,
    /// Campaign objective (campaign level only; ad-sets and ads resolve it
    /// through their campaign ancestor)
    pub objective: Option<String>,
    /// Daily budget in currency minor units (0 = not set)
    pub daily_budget: i64,
    /// Lifetime budget in currency minor units (0 = not set)
    pub lifetime_budget: i64,
    pub is_deleted: bool,
}

/// Account-level health as returned by the account status probe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountHealth {
    Healthy,
    /// Platform disabled the ad account
    Disabled,
    /// Account has an unpaid balance
    Unpaid,
}

/// Resolved display status: the status actually governing delivery, after
/// ancestor inheritance and override rules. Distinct from the raw status
/// the platform reports per entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EffectiveStatus {
    Active,
    Paused,
    /// Paused because the owning campaign is paused
    CampaignPaused,
    /// Paused because the owning ad-set is paused, or (at campaign level)
    /// because every child ad-set is stopped
    AdsetPaused,
    Archived,
    Deleted,
    /// Platform disabled the whole ad account
    AccountDisabled,
    /// The ad account has an unpaid balance
    AccountUnsettled,
    /// Platform is still processing the entity (review, learning phase)
    InProcess,
    /// Delivering with platform-flagged issues
    WithIssues,
    /// No catalog record, or an unrecognized platform status
    Unknown,
}

impl EffectiveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EffectiveStatus::Active => "ACTIVE",
            EffectiveStatus::Paused => "PAUSED",
            EffectiveStatus::CampaignPaused => "CAMPAIGN_PAUSED",
            EffectiveStatus::AdsetPaused => "ADSET_PAUSED",
            EffectiveStatus::Archived => "ARCHIVED",
            EffectiveStatus::Deleted => "DELETED",
            EffectiveStatus::AccountDisabled => "ACCOUNT_DISABLED",
            EffectiveStatus::AccountUnsettled => "ACCOUNT_UNSETTLED",
            EffectiveStatus::InProcess => "IN_PROCESS",
            EffectiveStatus::WithIssues => "WITH_ISSUES",
            EffectiveStatus::Unknown => "UNKNOWN",
        }
    }

    /// Parse a wire name as produced by [`EffectiveStatus::as_str`]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(EffectiveStatus::Active),
            "PAUSED" => Some(EffectiveStatus::Paused),
            "CAMPAIGN_PAUSED" => Some(EffectiveStatus::CampaignPaused),
            "ADSET_PAUSED" => Some(EffectiveStatus::AdsetPaused),
            "ARCHIVED" => Some(EffectiveStatus::Archived),
            "DELETED" => Some(EffectiveStatus::Deleted),
            "ACCOUNT_DISABLED" => Some(EffectiveStatus::AccountDisabled),
            "ACCOUNT_UNSETTLED" => Some(EffectiveStatus::AccountUnsettled),
            "IN_PROCESS" => Some(EffectiveStatus::InProcess),
            "WITH_ISSUES" => Some(EffectiveStatus::WithIssues),
            "UNKNOWN" => Some(EffectiveStatus::Unknown),
            _ => None,
        }
    }

    /// Map a raw platform-reported status string. Unrecognized strings
    /// resolve to `Unknown` rather than failing.
    pub fn from_reported(raw: &str) -> Self {
        EffectiveStatus::parse(raw).unwrap_or(EffectiveStatus::Unknown)
    }

    /// Vietnamese display label
    pub fn display_vi(&self) -> &'static str {
        match self {
            EffectiveStatus::Active => "Đang chạy",
            EffectiveStatus::Paused => "Tạm dừng",
            EffectiveStatus::CampaignPaused => "Chiến dịch tạm dừng",
            EffectiveStatus::AdsetPaused => "Nhóm quảng cáo tạm dừng",
            EffectiveStatus::Archived => "Đã lưu trữ",
            EffectiveStatus::Deleted => "Đã xóa",
            EffectiveStatus::AccountDisabled => "Tài khoản bị vô hiệu hóa",
            EffectiveStatus::AccountUnsettled => "Tài khoản chưa thanh toán",
            EffectiveStatus::InProcess => "Đang xử lý",
            EffectiveStatus::WithIssues => "Có vấn đề",
            EffectiveStatus::Unknown => "Không rõ",
        }
    }

    /// Whether the entity is (or is about to be) delivering
    pub fn is_running(&self) -> bool {
        matches!(self, EffectiveStatus::Active | EffectiveStatus::InProcess)
    }

    /// Default sort tier: ACTIVE first, then ADSET_PAUSED, then the paused
    /// family, then everything else (archived/deleted/account states)
    pub fn sort_tier(&self) -> u8 {
        match self {
            EffectiveStatus::Active => 0,
            EffectiveStatus::AdsetPaused => 1,
            EffectiveStatus::Paused | EffectiveStatus::CampaignPaused => 2,
            _ => 3,
        }
    }
}

impl std::fmt::Display for EffectiveStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_hierarchy() {
        assert_eq!(EntityLevel::Campaign.parent(), None);
        assert_eq!(EntityLevel::Ad.parent(), Some(EntityLevel::AdSet));
        assert_eq!(EntityLevel::AdSet.parent(), Some(EntityLevel::Campaign));
        assert_eq!(EntityLevel::Campaign.child(), Some(EntityLevel::AdSet));
        assert_eq!(EntityLevel::Ad.child(), None);
    }

    #[test]
    fn test_level_wire_roundtrip() {
        for level in [EntityLevel::Campaign, EntityLevel::AdSet, EntityLevel::Ad] {
            assert_eq!(EntityLevel::parse(level.as_str()), Some(level));
        }
        assert_eq!(EntityLevel::parse("account"), None);
    }

    #[test]
    fn test_status_wire_roundtrip() {
        for s in [
            EffectiveStatus::Active,
            EffectiveStatus::AdsetPaused,
            EffectiveStatus::AccountUnsettled,
            EffectiveStatus::Unknown,
        ] {
            assert_eq!(EffectiveStatus::parse(s.as_str()), Some(s));
        }
    }

    #[test]
    fn test_from_reported_unrecognized() {
        assert_eq!(
            EffectiveStatus::from_reported("PENDING_REVIEW"),
            EffectiveStatus::Unknown
        );
    }

    #[test]
    fn test_sort_tiers() {
        assert_eq!(EffectiveStatus::Active.sort_tier(), 0);
        assert_eq!(EffectiveStatus::AdsetPaused.sort_tier(), 1);
        assert_eq!(EffectiveStatus::Paused.sort_tier(), 2);
        assert_eq!(EffectiveStatus::CampaignPaused.sort_tier(), 2);
        assert_eq!(EffectiveStatus::Deleted.sort_tier(), 3);
        assert_eq!(EffectiveStatus::Archived.sort_tier(), 3);
    }
}
