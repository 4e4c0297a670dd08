//! Dashboard Configuration
//! Where the yearly files live and how they are laid out.

use crate::data::{YearWindow, FIRST_YEAR};
use std::path::PathBuf;

pub const DATA_DIR_VAR: &str = "CHR_DATA_DIR";
pub const FILE_PREFIX_VAR: &str = "CHR_FILE_PREFIX";
pub const ENTITY_COLUMN_VAR: &str = "CHR_ENTITY_COLUMN";
pub const FIRST_YEAR_VAR: &str = "CHR_FIRST_YEAR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Directory holding the `<prefix><year>.csv` files.
    pub data_dir: PathBuf,
    pub file_prefix: String,
    /// Column identifying each row's county.
    pub entity_column: String,
    pub first_year: i32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            file_prefix: "chr".to_string(),
            entity_column: "County".to_string(),
            first_year: FIRST_YEAR,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by `CHR_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for each `CHR_*` key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(DATA_DIR_VAR).filter(|v| !v.is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup(FILE_PREFIX_VAR) {
            config.file_prefix = prefix;
        }
        if let Some(column) = lookup(ENTITY_COLUMN_VAR).filter(|v| !v.is_empty()) {
            config.entity_column = column;
        }
        if let Some(raw) = lookup(FIRST_YEAR_VAR) {
            match raw.trim().parse::<i32>() {
                Ok(year) => config.first_year = year,
                Err(e) => log::warn!("Ignoring {}={:?}: {}", FIRST_YEAR_VAR, raw, e),
            }
        }

        config
    }

    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// First supported year through the current calendar year.
    pub fn year_window(&self) -> YearWindow {
        YearWindow::through_current_year(self.first_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_published_layout() {
        let config = DashboardConfig::from_lookup(lookup(&[]));
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.file_prefix, "chr");
        assert_eq!(config.entity_column, "County");
        assert_eq!(config.first_year, 2010);
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = DashboardConfig::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/srv/chr"),
            (FILE_PREFIX_VAR, "rankings_"),
            (ENTITY_COLUMN_VAR, "Parish"),
            (FIRST_YEAR_VAR, " 2014 "),
        ]));
        assert_eq!(config.data_dir, PathBuf::from("/srv/chr"));
        assert_eq!(config.file_prefix, "rankings_");
        assert_eq!(config.entity_column, "Parish");
        assert_eq!(config.first_year, 2014);
        assert_eq!(config.year_window().first(), 2014);
    }

    #[test]
    fn unparseable_first_year_is_ignored() {
        let config = DashboardConfig::from_lookup(lookup(&[(FIRST_YEAR_VAR, "twenty-ten")]));
        assert_eq!(config.first_year, FIRST_YEAR);
    }

    #[test]
    fn data_dir_can_be_overridden_after_lookup() {
        let config = DashboardConfig::default().with_data_dir("fixtures");
        assert_eq!(config.data_dir, PathBuf::from("fixtures"));
    }
}
