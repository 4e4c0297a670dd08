//! Stats module - percentile ranks and multi-year series

mod analytics;
mod calculator;

pub use analytics::{
    AnalyticsEngine, AnalyticsError, AttributePercentiles, EntitySeries, PercentilePoint,
    PercentileResult, SeriesResult,
};
pub use calculator::{DistributionSummary, StatsCalculator, QUARTILE_POINTS};
