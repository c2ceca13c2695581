//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod commentary;
pub mod dashboard;

// Re-export all handlers for use in router
pub use commentary::*;
pub use dashboard::*;

use serde::Deserialize;

/// Query parameters shared by period-scoped endpoints
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    /// `all` or `YYYY-MM`; omitted means the default period
    pub period: Option<String>,
}
