//! County Health Dashboard - percentile & trend charts over yearly CSV data
//!
//! Loads one County Health Rankings CSV per year, ranks selected counties
//! within an attribute's distribution, and assembles multi-year trends.

pub mod charts;
pub mod config;
pub mod data;
pub mod selection;
pub mod stats;

pub use config::DashboardConfig;
pub use data::{DatasetAccessor, YearWindow, YearlyTable};
pub use selection::Selection;
pub use stats::AnalyticsEngine;
