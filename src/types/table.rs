//! Calendar-dated raw table as produced by the CSSE parser.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One cumulative column per country, one row per calendar date.
///
/// Every column has exactly `dates.len()` entries; `None` marks a missing cell.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTable {
    pub dates: Vec<NaiveDate>,
    pub series: BTreeMap<String, Vec<Option<f64>>>,
}

impl RawTable {
    pub fn new(dates: Vec<NaiveDate>) -> Self {
        Self {
            dates,
            series: BTreeMap::new(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.dates.len()
    }

    pub fn country_count(&self) -> usize {
        self.series.len()
    }

    pub fn column(&self, country: &str) -> Option<&[Option<f64>]> {
        self.series.get(country).map(Vec::as_slice)
    }

    /// Every country's value on calendar row `row`.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (&str, Option<f64>)> {
        self.series
            .iter()
            .map(move |(country, values)| (country.as_str(), values.get(row).copied().flatten()))
    }

    /// Add `values` into the column for `country`, creating it if needed.
    ///
    /// A missing cell on either side makes the sum missing only when both
    /// sides are missing.
    pub fn accumulate(&mut self, country: &str, values: &[Option<f64>]) {
        let rows = self.dates.len();
        let column = self
            .series
            .entry(country.to_string())
            .or_insert_with(|| vec![None; rows]);
        for (slot, v) in column.iter_mut().zip(values.iter()) {
            *slot = match (*slot, *v) {
                (Some(a), Some(b)) => Some(a + b),
                (Some(a), None) => Some(a),
                (None, b) => b,
            };
        }
    }
}
