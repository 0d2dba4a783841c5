//! Day-zero alignment of raw per-country series
//!
//! Each country's cumulative series is cut so that day 0 is the first day its
//! count strictly exceeds the day-zero threshold. Countries without population
//! data, countries that never cross the threshold and countries with too few
//! observations afterwards are dropped. Dropping is a selection rule, not an
//! error: `align` simply omits them, `align_with_report` also says why.

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::config::defaults::{DAY_ZERO_THRESHOLD, MIN_ALIGNED_OBSERVATIONS};
use crate::types::{AlignedSeries, AlignedTable, PopulationTable};

/// Alignment tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentOptions {
    /// Day zero is the first day with a count strictly above this value
    pub day_zero_threshold: u64,
    /// Minimum non-missing observations from day zero onward
    pub min_observations: usize,
}

impl Default for AlignmentOptions {
    fn default() -> Self {
        Self {
            day_zero_threshold: DAY_ZERO_THRESHOLD,
            min_observations: MIN_ALIGNED_OBSERVATIONS,
        }
    }
}

/// Why a country was left out of the aligned table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Exclusion {
    MissingPopulation,
    NeverExceededThreshold,
    InsufficientHistory { observations: usize },
}

/// Aligned table plus the countries that were filtered out.
#[derive(Debug, Clone, Default)]
pub struct AlignmentReport {
    pub aligned: AlignedTable,
    pub excluded: BTreeMap<String, Exclusion>,
}

/// Align every country present in both `raw` and `population`.
pub fn align(
    raw: &BTreeMap<String, Vec<Option<f64>>>,
    population: &PopulationTable,
    day_zero_threshold: u64,
) -> AlignedTable {
    let options = AlignmentOptions {
        day_zero_threshold,
        ..AlignmentOptions::default()
    };
    align_with_report(raw, population, options).aligned
}

/// Same as [`align`], but also reports every exclusion and its reason.
pub fn align_with_report(
    raw: &BTreeMap<String, Vec<Option<f64>>>,
    population: &PopulationTable,
    options: AlignmentOptions,
) -> AlignmentReport {
    let mut report = AlignmentReport::default();

    for (country, values) in raw {
        match align_one(values, population.contains(country), options) {
            Ok(series) => {
                report.aligned.insert(country.clone(), series);
            }
            Err(reason) => {
                debug!(country = %country, ?reason, "Country excluded from alignment");
                report.excluded.insert(country.clone(), reason);
            }
        }
    }

    report
}

fn align_one(
    values: &[Option<f64>],
    has_population: bool,
    options: AlignmentOptions,
) -> Result<AlignedSeries, Exclusion> {
    if !has_population {
        return Err(Exclusion::MissingPopulation);
    }

    let threshold = options.day_zero_threshold as f64;
    let day_zero = values
        .iter()
        .position(|v| v.is_some_and(|x| x > threshold))
        .ok_or(Exclusion::NeverExceededThreshold)?;

    let mut shifted = values[day_zero..].to_vec();
    while shifted.last().is_some_and(Option::is_none) {
        shifted.pop();
    }

    let series = AlignedSeries {
        day_zero,
        values: shifted,
    };
    let observations = series.valid_count();
    if observations < options.min_observations {
        return Err(Exclusion::InsufficientHistory { observations });
    }
    Ok(series)
}

/// Shift a companion series (e.g. deaths) onto the day numbering of an
/// already aligned table.
///
/// Only countries in `aligned` are kept, and each is cut at that country's
/// `day_zero`. A country missing from `raw` gets an empty series.
pub fn shift_companion(
    raw: &BTreeMap<String, Vec<Option<f64>>>,
    aligned: &AlignedTable,
) -> AlignedTable {
    aligned
        .iter()
        .map(|(country, reference)| {
            let values = raw
                .get(country)
                .map(|column| column.get(reference.day_zero..).unwrap_or_default().to_vec())
                .unwrap_or_default();
            (
                country.clone(),
                AlignedSeries {
                    day_zero: reference.day_zero,
                    values,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn population(countries: &[&str]) -> PopulationTable {
        countries
            .iter()
            .map(|c| ((*c).to_string(), 5_000_000.0))
            .collect()
    }

    fn raw(entries: &[(&str, Vec<Option<f64>>)]) -> BTreeMap<String, Vec<Option<f64>>> {
        entries
            .iter()
            .map(|(c, v)| ((*c).to_string(), v.clone()))
            .collect()
    }

    fn dense(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn day_zero_is_first_value_strictly_above_threshold() {
        let raw = raw(&[(
            "Norway",
            dense(&[0.0, 5.0, 20.0, 21.0, 30.0, 45.0, 60.0, 80.0]),
        )]);
        let aligned = align(&raw, &population(&["Norway"]), 20);
        let norway = &aligned["Norway"];
        assert_eq!(norway.day_zero, 3);
        assert_eq!(norway.values, dense(&[21.0, 30.0, 45.0, 60.0, 80.0]));
    }

    #[test]
    fn country_below_threshold_is_dropped() {
        let raw = raw(&[("Capped", dense(&[1.0, 5.0, 10.0, 15.0, 15.0, 15.0, 15.0]))]);
        let report = align_with_report(&raw, &population(&["Capped"]), AlignmentOptions::default());
        assert!(report.aligned.is_empty());
        assert_eq!(
            report.excluded.get("Capped"),
            Some(&Exclusion::NeverExceededThreshold)
        );
    }

    #[test]
    fn trailing_missing_values_do_not_count_as_history() {
        let mut values = dense(&[10.0, 25.0, 30.0, 35.0]);
        values.extend([None, None, None]);
        let raw = raw(&[("Short", values)]);
        let report = align_with_report(&raw, &population(&["Short"]), AlignmentOptions::default());
        assert!(report.aligned.is_empty());
        assert_eq!(
            report.excluded.get("Short"),
            Some(&Exclusion::InsufficientHistory { observations: 3 })
        );
    }

    #[test]
    fn trailing_missing_values_are_trimmed() {
        let mut values = dense(&[25.0, 30.0, 35.0, 40.0, 50.0]);
        values.extend([None, None]);
        let aligned = align(&raw(&[("Iceland", values)]), &population(&["Iceland"]), 20);
        assert_eq!(aligned["Iceland"].values.len(), 5);
    }

    #[test]
    fn country_without_population_is_dropped() {
        let raw = raw(&[
            ("Atlantis", dense(&[30.0, 40.0, 50.0, 60.0, 70.0, 80.0])),
            ("Norway", dense(&[30.0, 40.0, 50.0, 60.0, 70.0, 80.0])),
        ]);
        let report = align_with_report(&raw, &population(&["Norway"]), AlignmentOptions::default());
        assert_eq!(report.aligned.keys().collect::<Vec<_>>(), vec!["Norway"]);
        assert_eq!(
            report.excluded.get("Atlantis"),
            Some(&Exclusion::MissingPopulation)
        );
    }

    #[test]
    fn lengths_may_differ_between_countries() {
        let raw = raw(&[
            ("A", dense(&[21.0, 22.0, 23.0, 24.0, 25.0, 26.0, 27.0])),
            ("B", dense(&[0.0, 0.0, 21.0, 22.0, 23.0, 24.0, 25.0])),
        ]);
        let aligned = align(&raw, &population(&["A", "B"]), 20);
        assert_eq!(aligned["A"].values.len(), 7);
        assert_eq!(aligned["B"].values.len(), 5);
    }

    #[test]
    fn companion_series_uses_reference_day_zero() {
        let infected = raw(&[("Norway", dense(&[1.0, 10.0, 25.0, 40.0, 60.0, 90.0, 120.0]))]);
        let deaths = raw(&[("Norway", dense(&[0.0, 0.0, 0.0, 1.0, 1.0, 3.0, 4.0]))]);
        let aligned = align(&infected, &population(&["Norway"]), 20);
        let shifted = shift_companion(&deaths, &aligned);
        assert_eq!(shifted["Norway"].day_zero, 2);
        assert_eq!(shifted["Norway"].values, dense(&[0.0, 1.0, 1.0, 3.0, 4.0]));
    }

    #[test]
    fn companion_missing_country_is_empty() {
        let infected = raw(&[("Norway", dense(&[25.0, 40.0, 60.0, 90.0, 120.0]))]);
        let aligned = align(&infected, &population(&["Norway"]), 20);
        let shifted = shift_companion(&BTreeMap::new(), &aligned);
        assert!(shifted["Norway"].values.is_empty());
    }
}
