//! Year Window Module
//! Inclusive range of dataset years used by the trend chart.

use chrono::{Datelike, Local};
use std::ops::RangeInclusive;

/// Earliest year covered by the County Health Rankings files.
pub const FIRST_YEAR: i32 = 2010;

/// Inclusive, ascending range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    first: i32,
    last: i32,
}

impl YearWindow {
    pub fn new(first: i32, last: i32) -> Self {
        Self { first, last }
    }

    /// Window from `first` through the current calendar year.
    pub fn through_current_year(first: i32) -> Self {
        Self::new(first, current_year())
    }

    pub fn first(&self) -> i32 {
        self.first
    }

    pub fn last(&self) -> i32 {
        self.last
    }

    pub fn years(&self) -> RangeInclusive<i32> {
        self.first..=self.last
    }

    /// Number of years in the window (zero when `last < first`).
    pub fn len(&self) -> usize {
        usize::try_from(self.last - self.first + 1).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Years newest first, as offered by the year picker.
    pub fn descending(&self) -> Vec<i32> {
        self.years().rev().collect()
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self::through_current_year(FIRST_YEAR)
    }
}

pub fn current_year() -> i32 {
    Local::now().year()
}
