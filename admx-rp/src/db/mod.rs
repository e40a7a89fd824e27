//! SQLite snapshot cache
//!
//! The stores are in-memory; this layer only persists the last synced
//! catalog and insight feed so a restart renders data immediately instead
//! of an empty dashboard until the first sync lands. Snapshot data is
//! display-grade: restoring it never sets the catalog loaded flags, so
//! child-dependent status decisions wait for a live sync.

mod catalog;
mod init;
mod insights;

pub use catalog::{load_catalog, save_catalog_level};
pub use init::{connect, create_schema};
pub use insights::{load_insights, replace_insights};
