//! # ADMX Common Library
//!
//! Shared code for the ADMX ad-reporting modules including:
//! - Domain models (catalog entities, insight records, report rows)
//! - Error types
//! - Configuration loading and root folder resolution
//! - Date-range utilities

pub mod config;
pub mod daterange;
pub mod error;
pub mod model;
pub mod numeric;

pub use daterange::DateRange;
pub use error::{Error, Result};
