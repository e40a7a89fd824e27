//! Process-scoped in-memory stores
//!
//! The reconciliation engine is a pure function of three inputs: the
//! catalog store, the insight store, and the status override map. All
//! three are explicit, shared handles owned by `AppState`: populated by
//! the sync job, read by report composition, cleared wholesale on account
//! switch. None of them is a hidden singleton.

mod catalog;
mod insights;
mod overrides;

pub use catalog::{CatalogStore, CatalogView};
pub use insights::InsightStore;
pub use overrides::{OverrideStore, StatusOverride};
