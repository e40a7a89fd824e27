//! Advertising platform API boundary
//!
//! The reconciliation core consumes four collaborator operations: catalog
//! fetch, insight fetch, account status probe, and status update. They are
//! seamed behind [`PlatformApi`] so the sync and toggle paths run against
//! an in-memory fake in tests.

mod client;
pub mod fake;
mod wire;

pub use client::MarketingClient;

use admx_common::model::{AccountHealth, CatalogEntity, EntityLevel, InsightRecord};
use admx_common::{DateRange, Result};
use async_trait::async_trait;

/// The four upstream operations the reporting core depends on
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// All entities at one level for the current account
    async fn fetch_catalog(&self, level: EntityLevel) -> Result<Vec<CatalogEntity>>;

    /// Day-granular insight rows at one level for a date window
    async fn fetch_insights(
        &self,
        level: EntityLevel,
        range: &DateRange,
    ) -> Result<Vec<InsightRecord>>;

    /// Account-level health probe
    async fn account_status(&self) -> Result<AccountHealth>;

    /// Request a status change; Ok(()) means the platform accepted it
    async fn update_status(&self, id: &str, level: EntityLevel, active: bool) -> Result<()>;

    /// Point subsequent calls at a different ad account
    async fn set_account(&self, account_id: &str);
}
