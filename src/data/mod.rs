//! Data module - yearly CSV loading and caching

mod cache;
mod loader;
mod table;
mod years;

pub use cache::TableCache;
pub use loader::{CsvDirectory, DatasetAccessor, LoaderError, TableSource};
pub use table::YearlyTable;
pub use years::{current_year, YearWindow, FIRST_YEAR};

#[cfg(test)]
pub(crate) use loader::tests::MemorySource;
