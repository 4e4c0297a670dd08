//! Yearly Table Module
//! One year's County Health Rankings table and the lookups the charts need.

use super::LoaderError;
use polars::prelude::*;
use std::collections::HashMap;

/// A single year's dataset.
///
/// Rows are keyed by the entity column (conventionally "County"). Entity names
/// are not guaranteed unique; lookups resolve to the first matching row.
#[derive(Debug, Clone)]
pub struct YearlyTable {
    year: i32,
    df: DataFrame,
    entity_column: String,
    entities: Vec<Option<String>>,
    first_rows: HashMap<String, usize>,
}

impl YearlyTable {
    /// The "no data for this year" table: zero rows, zero columns.
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            df: DataFrame::empty(),
            entity_column: String::new(),
            entities: Vec::new(),
            first_rows: HashMap::new(),
        }
    }

    /// Wrap a loaded DataFrame, indexing the entity column.
    pub fn from_frame(year: i32, df: DataFrame, entity_column: &str) -> Result<Self, LoaderError> {
        if df.width() == 0 {
            return Ok(Self::empty(year));
        }

        let column = df
            .column(entity_column)
            .map_err(|_| LoaderError::MissingEntityColumn {
                year,
                column: entity_column.to_string(),
            })?;

        let names = column.cast(&DataType::String)?;
        let entities: Vec<Option<String>> = names
            .str()?
            .into_iter()
            .map(|name| name.map(str::to_string))
            .collect();

        let mut first_rows = HashMap::with_capacity(entities.len());
        for (row, name) in entities.iter().enumerate() {
            if let Some(name) = name {
                first_rows.entry(name.clone()).or_insert(row);
            }
        }

        Ok(Self {
            year,
            df,
            entity_column: entity_column.to_string(),
            entities,
            first_rows,
        })
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// True when the year had no backing file (or the file had no rows).
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn row_count(&self) -> usize {
        self.df.height()
    }

    /// All column names, in file order.
    pub fn columns(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Attribute columns: everything except the leading key column and the
    /// entity column.
    pub fn attributes(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .enumerate()
            .filter(|(idx, name)| *idx > 0 && name.as_str() != self.entity_column.as_str())
            .map(|(_, name)| name.to_string())
            .collect()
    }

    pub fn has_attribute(&self, attribute: &str) -> bool {
        self.attribute_column(attribute).is_some()
    }

    /// Distinct entity names in order of first appearance.
    pub fn entities(&self) -> Vec<String> {
        self.entities
            .iter()
            .enumerate()
            .filter_map(|(row, name)| {
                let name = name.as_ref()?;
                (self.first_rows.get(name) == Some(&row)).then(|| name.clone())
            })
            .collect()
    }

    /// Row index of the first row whose entity matches.
    pub fn entity_row(&self, entity: &str) -> Option<usize> {
        self.first_rows.get(entity).copied()
    }

    /// Per-row numeric values of an attribute column.
    ///
    /// Returns `None` when the attribute is not a column of this table. Cells
    /// that are null, NaN, or not numeric come back as `None`.
    pub fn attribute_values(&self, attribute: &str) -> Option<Vec<Option<f64>>> {
        let column = self.attribute_column(attribute)?;
        Some(self.coerce(attribute, column))
    }

    /// Value of `attribute` for the first row of `entity`.
    pub fn value_for(&self, entity: &str, attribute: &str) -> Option<f64> {
        let row = self.entity_row(entity)?;
        let column = self.attribute_column(attribute)?;
        let cell = column.slice(i64::try_from(row).ok()?, 1);
        self.coerce(attribute, &cell).first().copied().flatten()
    }

    /// The column named `attribute`, unless it is the key or entity column.
    fn attribute_column(&self, attribute: &str) -> Option<&Column> {
        let idx = self.df.get_column_index(attribute)?;
        if idx == 0 || attribute == self.entity_column {
            return None;
        }
        self.df.get_columns().get(idx)
    }

    fn coerce(&self, attribute: &str, column: &Column) -> Vec<Option<f64>> {
        numeric_values(column).unwrap_or_else(|e| {
            log::warn!(
                "Column '{}' of {} could not be read as numbers: {}",
                attribute,
                self.year,
                e
            );
            vec![None; column.len()]
        })
    }
}

fn numeric_values(column: &Column) -> PolarsResult<Vec<Option<f64>>> {
    let as_f64 = column.cast(&DataType::Float64)?;
    let values = as_f64
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> YearlyTable {
        let df = df!(
            "FIPS" => [1i64, 2, 3, 4],
            "County" => ["Adams", "Baker", "Adams", "Clark"],
            "ObesityRate" => [Some(30.5), None, Some(12.0), Some(f64::NAN)],
            "Smoking" => ["18", "n/a", "21", "19"],
        )
        .unwrap();
        YearlyTable::from_frame(2020, df, "County").unwrap()
    }

    #[test]
    fn empty_table_has_no_rows_or_columns() {
        let table = YearlyTable::empty(2011);
        assert!(table.is_empty());
        assert_eq!(table.year(), 2011);
        assert!(table.columns().is_empty());
        assert!(table.attributes().is_empty());
        assert!(table.entities().is_empty());
        assert_eq!(table.attribute_values("ObesityRate"), None);
    }

    #[test]
    fn attributes_skip_key_and_entity_columns() {
        let table = sample();
        assert_eq!(table.columns(), vec!["FIPS", "County", "ObesityRate", "Smoking"]);
        assert_eq!(table.attributes(), vec!["ObesityRate", "Smoking"]);
        assert!(!table.has_attribute("County"));
        assert!(!table.has_attribute("FIPS"));
    }

    #[test]
    fn first_matching_row_wins() {
        let table = sample();
        assert_eq!(table.entity_row("Adams"), Some(0));
        assert_eq!(table.value_for("Adams", "ObesityRate"), Some(30.5));
        assert_eq!(table.entities(), vec!["Adams", "Baker", "Clark"]);
    }

    #[test]
    fn null_nan_and_text_become_missing() {
        let table = sample();
        assert_eq!(
            table.attribute_values("ObesityRate"),
            Some(vec![Some(30.5), None, Some(12.0), None])
        );
        assert_eq!(
            table.attribute_values("Smoking"),
            Some(vec![Some(18.0), None, Some(21.0), Some(19.0)])
        );
        assert_eq!(table.value_for("Baker", "ObesityRate"), None);
        assert_eq!(table.value_for("Nowhere", "ObesityRate"), None);
        assert_eq!(table.attribute_values("Unknown"), None);
    }

    #[test]
    fn single_cell_lookup_matches_column_coercion() {
        let table = sample();
        assert_eq!(table.value_for("Clark", "Smoking"), Some(19.0));
        assert_eq!(table.value_for("Baker", "Smoking"), None);
        assert_eq!(table.value_for("Clark", "ObesityRate"), None);
        assert_eq!(table.value_for("Adams", "County"), None);
        assert_eq!(table.value_for("Adams", "FIPS"), None);
        assert!(table.has_attribute("Smoking"));
        assert!(!table.has_attribute("Unknown"));
    }

    #[test]
    fn missing_entity_column_is_rejected() {
        let df = df!("FIPS" => [1i64], "Name" => ["Adams"]).unwrap();
        let err = YearlyTable::from_frame(2019, df, "County").unwrap_err();
        assert!(matches!(
            err,
            LoaderError::MissingEntityColumn { year: 2019, .. }
        ));
    }
}
