//! Read-only data snapshot shared by every request.
//!
//! The refresher builds a complete [`DataSnapshot`] off to the side and
//! publishes it through [`SnapshotStore`]; handlers take an `Arc` of whatever
//! snapshot is current and never see a half-built one.

pub mod refresher;
mod views;

pub use refresher::{refresh_once, run_refresher};
pub use views::{MapEntry, MapError, MapFrame};

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::alignment::{align_with_report, shift_companion, AlignmentOptions, Exclusion};
use crate::types::{AlignedTable, PopulationTable, RawTable};

/// Everything the API serves, computed once per refresh.
#[derive(Debug, Clone)]
pub struct DataSnapshot {
    /// Calendar-dated confirmed cases, for the map
    pub infected_raw: RawTable,
    /// Confirmed cases aligned on day zero
    pub infected: AlignedTable,
    /// Deaths shifted by each country's infected day zero
    pub deaths: AlignedTable,
    pub population: Arc<PopulationTable>,
    /// Countries left out of `infected`, and why
    pub excluded: BTreeMap<String, Exclusion>,
    pub options: AlignmentOptions,
    pub built_at: DateTime<Utc>,
}

/// Align infected cases, then cut deaths at the same day zero.
pub fn build_snapshot(
    infected_raw: RawTable,
    deaths_raw: &RawTable,
    population: Arc<PopulationTable>,
    options: AlignmentOptions,
) -> DataSnapshot {
    let report = align_with_report(&infected_raw.series, &population, options);
    let deaths = shift_companion(&deaths_raw.series, &report.aligned);

    info!(
        countries = report.aligned.len(),
        excluded = report.excluded.len(),
        dates = infected_raw.row_count(),
        threshold = options.day_zero_threshold,
        "Snapshot built"
    );

    DataSnapshot {
        infected_raw,
        infected: report.aligned,
        deaths,
        population,
        excluded: report.excluded,
        options,
        built_at: Utc::now(),
    }
}

impl DataSnapshot {
    /// Sorted names of the aligned countries.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.infected.keys().map(String::as_str)
    }

    pub fn contains(&self, country: &str) -> bool {
        self.infected.contains_key(country)
    }

    /// Last calendar date in the source data.
    pub fn latest_date(&self) -> Option<NaiveDate> {
        self.infected_raw.dates.last().copied()
    }

    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.built_at
    }
}

// ============================================================================
// Snapshot Store
// ============================================================================

/// Atomically swappable holder for the current snapshot.
///
/// Empty until the first successful refresh.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: ArcSwapOption<DataSnapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(snapshot: DataSnapshot) -> Self {
        let store = Self::new();
        store.swap(snapshot);
        store
    }

    /// The current snapshot, if one has been published.
    pub fn load(&self) -> Option<Arc<DataSnapshot>> {
        self.current.load_full()
    }

    /// Publish `snapshot`, returning the one it replaced.
    pub fn swap(&self, snapshot: DataSnapshot) -> Option<Arc<DataSnapshot>> {
        self.current.swap(Some(Arc::new(snapshot)))
    }

    pub fn is_loaded(&self) -> bool {
        self.current.load().is_some()
    }
}

// ============================================================================
// Upstream Schedule
// ============================================================================

/// Next daily upstream publication at `update_time` (UTC), strictly after
/// `now` unless `now` is earlier on the same day.
pub fn next_source_update(now: DateTime<Utc>, update_time: NaiveTime) -> DateTime<Utc> {
    let today = now.date_naive();
    let date = if now.time() < update_time {
        today
    } else {
        today + Duration::days(1)
    };
    date.and_time(update_time).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(dates: usize, series: &[(&str, Vec<Option<f64>>)]) -> RawTable {
        let start = NaiveDate::from_ymd_opt(2020, 3, 1).unwrap();
        let mut table = RawTable::new((0..dates as i64).map(|d| start + Duration::days(d)).collect());
        for (country, values) in series {
            table.accumulate(country, values);
        }
        table
    }

    fn population() -> Arc<PopulationTable> {
        Arc::new(
            [("Norway".to_string(), 5_000_000.0), ("Denmark".to_string(), 6_000_000.0)]
                .into_iter()
                .collect(),
        )
    }

    fn sample_snapshot() -> DataSnapshot {
        let infected = raw(
            8,
            &[
                ("Norway", [5.0, 10.0, 21.0, 30.0, 40.0, 55.0, 70.0, 90.0].map(Some).to_vec()),
                ("Denmark", [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0].map(Some).to_vec()),
            ],
        );
        let deaths = raw(
            8,
            &[("Norway", [0.0, 0.0, 1.0, 1.0, 2.0, 3.0, 3.0, 4.0].map(Some).to_vec())],
        );
        build_snapshot(infected, &deaths, population(), AlignmentOptions::default())
    }

    #[test]
    fn deaths_are_shifted_by_infected_day_zero() {
        let snapshot = sample_snapshot();
        assert_eq!(snapshot.infected["Norway"].day_zero, 2);
        assert_eq!(snapshot.deaths["Norway"].values[0], Some(1.0));
        assert_eq!(snapshot.deaths["Norway"].values.len(), 6);
    }

    #[test]
    fn excluded_countries_are_recorded() {
        let snapshot = sample_snapshot();
        assert!(!snapshot.contains("Denmark"));
        assert_eq!(
            snapshot.excluded.get("Denmark"),
            Some(&Exclusion::NeverExceededThreshold)
        );
        assert_eq!(snapshot.countries().collect::<Vec<_>>(), vec!["Norway"]);
    }

    #[test]
    fn store_is_empty_until_first_swap() {
        let store = SnapshotStore::new();
        assert!(!store.is_loaded());
        assert!(store.load().is_none());
        assert!(store.swap(sample_snapshot()).is_none());
        assert!(store.is_loaded());
    }

    #[test]
    fn readers_keep_their_snapshot_across_a_swap() {
        let store = SnapshotStore::with_snapshot(sample_snapshot());
        let held = store.load().unwrap();
        let mut next = sample_snapshot();
        next.excluded.clear();
        let previous = store.swap(next).unwrap();
        assert!(Arc::ptr_eq(&held, &previous));
        assert!(!held.excluded.is_empty());
        assert!(store.load().unwrap().excluded.is_empty());
    }

    #[test]
    fn next_update_today_before_publication() {
        let at = NaiveTime::from_hms_opt(1, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2020, 4, 1, 0, 30, 0).unwrap();
        assert_eq!(
            next_source_update(now, at),
            Utc.with_ymd_and_hms(2020, 4, 1, 1, 0, 0).unwrap()
        );
    }

    #[test]
    fn next_update_tomorrow_after_publication() {
        let at = NaiveTime::from_hms_opt(1, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2020, 4, 1, 1, 0, 0).unwrap();
        assert_eq!(
            next_source_update(now, at),
            Utc.with_ymd_and_hms(2020, 4, 2, 1, 0, 0).unwrap()
        );
    }
}
