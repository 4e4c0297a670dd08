//! Table Cache Module
//! Per-year cache of loaded tables, shared across threads.

use super::YearlyTable;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

type Slot = Arc<Mutex<Option<Arc<YearlyTable>>>>;

/// Lazily populated map from year to table.
///
/// Each year has its own slot lock, so the first load of a year is performed
/// once even under concurrent access, while different years load in parallel.
/// Entries are never invalidated.
#[derive(Default)]
pub struct TableCache {
    slots: Mutex<HashMap<i32, Slot>>,
}

impl TableCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `year`, running `load` to populate it on a
    /// miss. Failed loads are not cached.
    pub fn get_or_try_insert_with<E, F>(&self, year: i32, load: F) -> Result<Arc<YearlyTable>, E>
    where
        F: FnOnce() -> Result<YearlyTable, E>,
    {
        let slot = self.lock_slots().entry(year).or_default().clone();

        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = guard.as_ref() {
            log::debug!("Cache hit for {}", year);
            return Ok(Arc::clone(table));
        }

        log::debug!("Cache miss for {}", year);
        let table = Arc::new(load()?);
        *guard = Some(Arc::clone(&table));
        Ok(table)
    }

    /// Years with a populated entry, ascending.
    pub fn cached_years(&self) -> Vec<i32> {
        let mut years: Vec<i32> = self
            .lock_slots()
            .iter()
            .filter(|(_, slot)| {
                slot.lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .is_some()
            })
            .map(|(year, _)| *year)
            .collect();
        years.sort_unstable();
        years
    }

    pub fn len(&self) -> usize {
        self.cached_years().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<i32, Slot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn second_lookup_does_not_reload() {
        let cache = TableCache::new();
        let loads = AtomicUsize::new(0);

        for _ in 0..3 {
            let table = cache
                .get_or_try_insert_with::<(), _>(2015, || {
                    loads.fetch_add(1, Ordering::SeqCst);
                    Ok(YearlyTable::empty(2015))
                })
                .unwrap();
            assert_eq!(table.year(), 2015);
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(cache.cached_years(), vec![2015]);
    }

    #[test]
    fn failed_load_is_retried() {
        let cache = TableCache::new();
        let first: Result<_, &str> = cache.get_or_try_insert_with(2016, || Err("unreadable"));
        assert!(first.is_err());
        assert!(cache.cached_years().is_empty());
        assert!(cache.is_empty());

        let second: Result<_, &str> =
            cache.get_or_try_insert_with(2016, || Ok(YearlyTable::empty(2016)));
        assert!(second.is_ok());
        assert_eq!(cache.cached_years(), vec![2016]);
    }

    #[test]
    fn concurrent_first_population_loads_once() {
        let cache = Arc::new(TableCache::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let loads = Arc::clone(&loads);
                std::thread::spawn(move || {
                    cache
                        .get_or_try_insert_with::<(), _>(2018, || {
                            loads.fetch_add(1, Ordering::SeqCst);
                            Ok(YearlyTable::empty(2018))
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }
}
