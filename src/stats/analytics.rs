//! Analytics Engine Module
//! Turns loaded tables plus a selection into chart-ready results.

use super::{DistributionSummary, StatsCalculator};
use crate::data::{DatasetAccessor, TableSource, YearWindow, YearlyTable};
use crate::selection::Selection;
use rayon::prelude::*;
use std::sync::Arc;
use thiserror::Error;

/// Selections the engine refuses to compute.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("Please select at least one county.")]
    NoEntitiesSelected,
    #[error("Please select at least one attribute.")]
    NoAttributesSelected,
    #[error("Please select exactly one attribute for the Time Series ({0} selected).")]
    SeriesRequiresSingleAttribute(usize),
}

/// One entity's position in an attribute's distribution.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentilePoint {
    pub entity: String,
    pub value: f64,
    /// Count-below percentile rank, 0 to 100.
    pub percentile: f64,
}

/// Percentile chart data for one attribute of one year.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileResult {
    pub attribute: String,
    pub year: i32,
    /// Points in selection order.
    pub points: Vec<PercentilePoint>,
    /// Selected entities left out because they have no value.
    pub excluded: Vec<String>,
    pub summary: DistributionSummary,
}

impl PercentileResult {
    /// Size of the reference distribution.
    pub fn distribution_size(&self) -> usize {
        self.summary.count
    }
}

/// Outcome of ranking one selected attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributePercentiles {
    Ranked(PercentileResult),
    /// The attribute has no non-missing values in this year's table.
    NoData { attribute: String },
    /// The attribute is not a column of this year's table.
    UnknownAttribute { attribute: String },
}

impl AttributePercentiles {
    pub fn attribute(&self) -> &str {
        match self {
            Self::Ranked(result) => &result.attribute,
            Self::NoData { attribute } | Self::UnknownAttribute { attribute } => attribute,
        }
    }
}

/// One entity's values across the year window; `None` is the missing marker.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySeries {
    pub entity: String,
    pub values: Vec<Option<f64>>,
}

impl EntitySeries {
    /// (year, value) pairs for the years that have a value.
    pub fn present<'a>(&'a self, years: &'a [i32]) -> impl Iterator<Item = (i32, f64)> + 'a {
        years
            .iter()
            .zip(&self.values)
            .filter_map(|(&year, value)| value.map(|v| (year, v)))
    }
}

/// Trend chart data for one attribute.
///
/// `series[i].values[j]` is the value of entity `i` in `years[j]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesResult {
    pub attribute: String,
    pub years: Vec<i32>,
    pub series: Vec<EntitySeries>,
    /// Years whose table is empty, unreadable, or lacks the attribute.
    pub years_without_data: Vec<i32>,
}

impl SeriesResult {
    /// True when no entity has a value in any year.
    pub fn is_all_missing(&self) -> bool {
        self.series
            .iter()
            .all(|s| s.values.iter().all(Option::is_none))
    }
}

/// Pure transforms from tables and a selection to chart results.
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    /// Percentile rank of every selected entity for every selected attribute.
    ///
    /// Each attribute is ranked against its own distribution: all non-missing
    /// values of that column in `table`. Outcomes come back in selection order.
    pub fn percentiles(
        table: &YearlyTable,
        selection: &Selection,
    ) -> Result<Vec<AttributePercentiles>, AnalyticsError> {
        let entities = selection.distinct_entities();
        if entities.is_empty() {
            return Err(AnalyticsError::NoEntitiesSelected);
        }
        let attributes = selection.distinct_attributes();
        if attributes.is_empty() {
            return Err(AnalyticsError::NoAttributesSelected);
        }

        let outcomes: Vec<AttributePercentiles> = attributes
            .par_iter()
            .map(|attribute| Self::rank_attribute(table, attribute, &entities))
            .collect();

        log::info!(
            "Ranked {} counties on {} attributes for {}",
            entities.len(),
            outcomes.len(),
            table.year()
        );
        Ok(outcomes)
    }

    fn rank_attribute(
        table: &YearlyTable,
        attribute: &str,
        entities: &[&str],
    ) -> AttributePercentiles {
        if table.is_empty() {
            return AttributePercentiles::NoData {
                attribute: attribute.to_string(),
            };
        }
        let Some(values) = table.attribute_values(attribute) else {
            log::debug!("'{}' is not a column of {}", attribute, table.year());
            return AttributePercentiles::UnknownAttribute {
                attribute: attribute.to_string(),
            };
        };

        let reference = StatsCalculator::sorted(values.iter().flatten().copied().collect());
        if reference.is_empty() {
            return AttributePercentiles::NoData {
                attribute: attribute.to_string(),
            };
        }

        let mut points = Vec::with_capacity(entities.len());
        let mut excluded = Vec::new();
        for &entity in entities {
            let value = table
                .entity_row(entity)
                .and_then(|row| values.get(row).copied().flatten());
            let ranked = value.and_then(|v| {
                StatsCalculator::percentile_rank(&reference, v).map(|percentile| (v, percentile))
            });
            match ranked {
                Some((value, percentile)) => points.push(PercentilePoint {
                    entity: entity.to_string(),
                    value,
                    percentile,
                }),
                None => excluded.push(entity.to_string()),
            }
        }

        AttributePercentiles::Ranked(PercentileResult {
            attribute: attribute.to_string(),
            year: table.year(),
            points,
            excluded,
            summary: StatsCalculator::summarize(&reference),
        })
    }

    /// Values of the single selected attribute for every selected entity over
    /// every year of `window`, aligned by year.
    ///
    /// Years are loaded in parallel through `accessor`. A year that cannot be
    /// read is logged and treated like a year without a file.
    pub fn assemble_series<S: TableSource>(
        accessor: &DatasetAccessor<S>,
        selection: &Selection,
        window: YearWindow,
    ) -> Result<SeriesResult, AnalyticsError> {
        let (entities, attribute) = Self::series_selection(selection)?;

        let tables: Vec<(i32, Option<Arc<YearlyTable>>)> = window
            .years()
            .into_par_iter()
            .map(|year| match accessor.load_year(year) {
                Ok(table) => (year, Some(table)),
                Err(e) => {
                    log::warn!("Skipping {} in trend for '{}': {}", year, attribute, e);
                    (year, None)
                }
            })
            .collect();

        let result = Self::align_series(
            tables.iter().map(|(year, table)| (*year, table.as_deref())),
            &entities,
            attribute,
        );
        log::info!(
            "Assembled {}-year trend of '{}' for {} counties ({} years without data)",
            result.years.len(),
            attribute,
            result.series.len(),
            result.years_without_data.len()
        );
        Ok(result)
    }

    /// Check the series preconditions: at least one entity, exactly one attribute.
    pub fn series_selection(selection: &Selection) -> Result<(Vec<&str>, &str), AnalyticsError> {
        let entities = selection.distinct_entities();
        if entities.is_empty() {
            return Err(AnalyticsError::NoEntitiesSelected);
        }
        match selection.distinct_attributes().as_slice() {
            [attribute] => Ok((entities, *attribute)),
            others => Err(AnalyticsError::SeriesRequiresSingleAttribute(others.len())),
        }
    }

    /// Align already-loaded tables into one sequence per entity.
    ///
    /// `tables` yields one entry per year in ascending order; `None` stands for
    /// a year that could not be loaded.
    pub fn align_series<'a>(
        tables: impl IntoIterator<Item = (i32, Option<&'a YearlyTable>)>,
        entities: &[&str],
        attribute: &str,
    ) -> SeriesResult {
        let mut years = Vec::new();
        let mut years_without_data = Vec::new();
        let mut series: Vec<EntitySeries> = entities
            .iter()
            .map(|entity| EntitySeries {
                entity: entity.to_string(),
                values: Vec::new(),
            })
            .collect();

        for (year, table) in tables {
            years.push(year);

            let column = table
                .filter(|t| !t.is_empty())
                .and_then(|t| t.attribute_values(attribute).map(|values| (t, values)));

            match column {
                Some((table, values)) => {
                    for entry in &mut series {
                        let value = table
                            .entity_row(&entry.entity)
                            .and_then(|row| values.get(row).copied().flatten());
                        entry.values.push(value);
                    }
                }
                None => {
                    years_without_data.push(year);
                    for entry in &mut series {
                        entry.values.push(None);
                    }
                }
            }
        }

        SeriesResult {
            attribute: attribute.to_string(),
            years,
            series,
            years_without_data,
        }
    }
}
