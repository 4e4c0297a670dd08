//! Filter Selection Module
//! The user's year / county / attribute choice and its saved-filters file.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterFileError {
    #[error("Failed to access filters file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid filters file: {0}")]
    Json(#[from] serde_json::Error),
}

/// A year, the selected counties and the selected attributes.
///
/// Serialises to the saved-filters document:
/// `{"selected_year": 2022, "selected_counties": [...], "selected_attributes": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(rename = "selected_year")]
    pub year: i32,
    #[serde(rename = "selected_counties", default)]
    pub entities: Vec<String>,
    #[serde(rename = "selected_attributes", default)]
    pub attributes: Vec<String>,
}

impl Selection {
    pub fn new(year: i32) -> Self {
        Self {
            year,
            entities: Vec::new(),
            attributes: Vec::new(),
        }
    }

    pub fn with_entities<I, T>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.entities = entities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_attributes<I, T>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.attributes = attributes.into_iter().map(Into::into).collect();
        self
    }

    /// Selected entities with duplicates removed, first occurrence kept.
    pub fn distinct_entities(&self) -> Vec<&str> {
        distinct(&self.entities)
    }

    /// Selected attributes with duplicates removed, first occurrence kept.
    pub fn distinct_attributes(&self) -> Vec<&str> {
        distinct(&self.attributes)
    }

    /// Add `name` to the entities, or remove it if already selected.
    pub fn toggle_entity(&mut self, name: &str) {
        toggle(&mut self.entities, name);
    }

    pub fn toggle_attribute(&mut self, name: &str) {
        toggle(&mut self.attributes, name);
    }

    pub fn to_json(&self) -> Result<String, FilterFileError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, FilterFileError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), FilterFileError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Saved filters to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, FilterFileError> {
        let json = std::fs::read_to_string(path)?;
        let selection = Self::from_json(&json)?;
        log::info!(
            "Loaded filters from {}: year {}, {} counties, {} attributes",
            path.display(),
            selection.year,
            selection.entities.len(),
            selection.attributes.len()
        );
        Ok(selection)
    }
}

fn distinct(names: &[String]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .filter(|name| seen.insert(*name))
        .collect()
}

fn toggle(names: &mut Vec<String>, name: &str) {
    if let Some(pos) = names.iter().position(|n| n == name) {
        names.remove(pos);
    } else {
        names.push(name.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn saved_filters_reparse_to_the_same_selection() {
        let selection = Selection::new(2022)
            .with_entities(["Washington"])
            .with_attributes(["ObesityRate"]);

        let json = selection.to_json().unwrap();
        assert_eq!(
            json,
            r#"{"selected_year":2022,"selected_counties":["Washington"],"selected_attributes":["ObesityRate"]}"#
        );
        assert_eq!(Selection::from_json(&json).unwrap(), selection);
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let selection = Selection::from_json(r#"{"selected_year": 2015}"#).unwrap();
        assert_eq!(selection, Selection::new(2015));
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(matches!(
            Selection::from_json("{\"selected_counties\": [\"A\""),
            Err(FilterFileError::Json(_))
        ));
        assert!(Selection::from_json(r#"{"selected_counties": []}"#).is_err());
    }

    #[test]
    fn duplicates_collapse_in_selection_order() {
        let selection = Selection::new(2020)
            .with_entities(["B", "A", "B", "C", "A"])
            .with_attributes(["X", "X"]);
        assert_eq!(selection.distinct_entities(), vec!["B", "A", "C"]);
        assert_eq!(selection.distinct_attributes(), vec!["X"]);
    }

    #[test]
    fn toggling_adds_then_removes() {
        let mut selection = Selection::new(2020);
        selection.toggle_entity("Adams");
        selection.toggle_entity("Baker");
        selection.toggle_entity("Adams");
        assert_eq!(selection.entities, vec!["Baker"]);
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filters.json");
        let selection = Selection::new(2019)
            .with_entities(["Adams", "Baker"])
            .with_attributes(["Smoking"]);

        selection.save(&path).unwrap();
        assert_eq!(Selection::load(&path).unwrap(), selection);
        assert!(matches!(
            Selection::load(&dir.path().join("absent.json")),
            Err(FilterFileError::Io(_))
        ));
    }
}
