//! Hierarchical status & metrics reconciliation engine
//!
//! Merges the two independently-updated feeds (the structural catalog and
//! the time-series insights) into one consistent three-level report:
//! inherited status, budget fallback, cross-level aggregation backfill and
//! objective-aware result selection. Everything in this module is a pure,
//! synchronous function of its snapshot inputs; the async world (sync job,
//! toggles, HTTP) stays outside.

pub mod aggregate;
pub mod budget;
pub mod result;
pub mod status;
pub mod view;

pub use view::{compose, SortField, SortSpec, ViewRequest};
