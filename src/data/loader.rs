//! CSV Data Loader Module
//! Resolves yearly County Health Rankings tables from disk, through the cache.

use super::{TableCache, YearWindow, YearlyTable};
use crate::config::DashboardConfig;
use polars::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
    #[error("Failed to read data file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Data file for year {year} has no '{column}' column")]
    MissingEntityColumn { year: i32, column: String },
}

/// Backing storage for yearly tables.
pub trait TableSource: Send + Sync {
    /// Read the raw table for `year`. `Ok(None)` means the year has no data.
    fn read_year(&self, year: i32) -> Result<Option<DataFrame>, LoaderError>;

    /// Whether a table exists for `year`, without reading it.
    fn has_year(&self, year: i32) -> bool;
}

/// Directory of `<prefix><year>.csv` files.
#[derive(Debug, Clone)]
pub struct CsvDirectory {
    dir: PathBuf,
    prefix: String,
}

impl CsvDirectory {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
        }
    }

    /// Path of the file backing `year`, e.g. `data/chr2022.csv`.
    pub fn path_for(&self, year: i32) -> PathBuf {
        self.dir.join(format!("{}{}.csv", self.prefix, year))
    }
}

impl TableSource for CsvDirectory {
    fn read_year(&self, year: i32) -> Result<Option<DataFrame>, LoaderError> {
        let path = self.path_for(year);
        match std::fs::metadata(&path) {
            Ok(meta) if meta.is_file() => {}
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No data file at {}", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        log::debug!("Reading {}", path.display());
        let df = LazyCsvReader::new(&path)
            .with_infer_schema_length(Some(10000))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        Ok(Some(df))
    }

    fn has_year(&self, year: i32) -> bool {
        self.path_for(year).is_file()
    }
}

/// Loads yearly tables by year number, caching each year after its first read.
pub struct DatasetAccessor<S = CsvDirectory> {
    source: S,
    entity_column: String,
    cache: Arc<TableCache>,
}

impl DatasetAccessor<CsvDirectory> {
    /// Accessor over the CSV directory described by `config`.
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(
            CsvDirectory::new(&config.data_dir, config.file_prefix.as_str()),
            config.entity_column.as_str(),
        )
    }
}

impl<S: TableSource> DatasetAccessor<S> {
    pub fn new(source: S, entity_column: impl Into<String>) -> Self {
        Self::with_cache(source, entity_column, Arc::new(TableCache::new()))
    }

    pub fn with_cache(source: S, entity_column: impl Into<String>, cache: Arc<TableCache>) -> Self {
        Self {
            source,
            entity_column: entity_column.into(),
            cache,
        }
    }

    /// Load the table for `year`.
    ///
    /// A year without a backing file yields the empty table, not an error.
    /// Rows and values are passed through unmodified; only the presence of the
    /// entity column is checked.
    pub fn load_year(&self, year: i32) -> Result<Arc<YearlyTable>, LoaderError> {
        self.cache.get_or_try_insert_with::<LoaderError, _>(year, || {
            let table = match self.source.read_year(year)? {
                Some(df) => YearlyTable::from_frame(year, df, &self.entity_column)?,
                None => YearlyTable::empty(year),
            };

            if table.is_empty() {
                log::info!("No data for year {}", year);
            } else {
                log::info!(
                    "Loaded data for year {}: {} rows, {} columns",
                    year,
                    table.row_count(),
                    table.columns().len()
                );
            }
            Ok(table)
        })
    }

    /// Years in `window` that have a backing table.
    pub fn available_years(&self, window: YearWindow) -> Vec<i32> {
        window
            .years()
            .filter(|&year| self.source.has_year(year))
            .collect()
    }

    pub fn cache(&self) -> &TableCache {
        &self.cache
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory source that counts reads.
    #[derive(Default)]
    pub(crate) struct MemorySource {
        pub tables: HashMap<i32, DataFrame>,
        pub reads: AtomicUsize,
    }

    impl MemorySource {
        pub fn with(mut self, year: i32, df: DataFrame) -> Self {
            self.tables.insert(year, df);
            self
        }

        pub fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl TableSource for MemorySource {
        fn read_year(&self, year: i32) -> Result<Option<DataFrame>, LoaderError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.tables.get(&year).cloned())
        }

        fn has_year(&self, year: i32) -> bool {
            self.tables.contains_key(&year)
        }
    }

    fn frame() -> DataFrame {
        df!(
            "FIPS" => [1i64, 2],
            "County" => ["Adams", "Baker"],
            "X" => [1.0, 2.0],
        )
        .unwrap()
    }

    #[test]
    fn missing_year_is_the_empty_table() {
        let accessor = DatasetAccessor::new(MemorySource::default(), "County");
        let table = accessor.load_year(2013).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.year(), 2013);
    }

    #[test]
    fn repeated_loads_read_the_source_once() {
        let accessor = DatasetAccessor::new(MemorySource::default().with(2020, frame()), "County");

        let first = accessor.load_year(2020).unwrap();
        let second = accessor.load_year(2020).unwrap();
        accessor.load_year(2021).unwrap();
        accessor.load_year(2021).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.row_count(), 2);
        assert_eq!(accessor.source().reads(), 2);
        assert_eq!(accessor.cache().cached_years(), vec![2020, 2021]);
    }

    #[test]
    fn injected_cache_is_shared_between_accessors() {
        let cache = Arc::new(TableCache::new());
        let a = DatasetAccessor::with_cache(
            MemorySource::default().with(2020, frame()),
            "County",
            Arc::clone(&cache),
        );
        a.load_year(2020).unwrap();

        let b = DatasetAccessor::with_cache(MemorySource::default(), "County", cache);
        assert_eq!(b.load_year(2020).unwrap().row_count(), 2);
        assert_eq!(b.source().reads(), 0);
    }

    #[test]
    fn wrong_entity_column_is_an_error_and_not_cached() {
        let accessor = DatasetAccessor::new(MemorySource::default().with(2020, frame()), "Parish");
        assert!(matches!(
            accessor.load_year(2020),
            Err(LoaderError::MissingEntityColumn { year: 2020, .. })
        ));
        assert!(accessor.cache().is_empty());
    }

    #[test]
    fn available_years_lists_backed_years() {
        let accessor = DatasetAccessor::new(
            MemorySource::default().with(2010, frame()).with(2012, frame()),
            "County",
        );
        assert_eq!(accessor.available_years(YearWindow::new(2010, 2014)), vec![2010, 2012]);
    }

    #[test]
    fn csv_paths_embed_the_year() {
        let source = CsvDirectory::new("data", "chr");
        assert_eq!(source.path_for(2022), PathBuf::from("data").join("chr2022.csv"));
    }
}
