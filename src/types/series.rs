//! Day-indexed series types shared by the aligner, forecast engine and API.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single (day, value) observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayPoint {
    /// Days since the country's day zero
    pub day: i64,
    /// Cumulative value on that day
    pub value: f64,
}

/// A projected integer count on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCount {
    pub day: i64,
    pub value: i64,
}

/// Observed cumulative series with missing values already dropped.
///
/// Day indices are strictly increasing. They are usually contiguous, but a
/// missing value in the middle of an aligned series leaves a gap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySeries {
    points: Vec<DayPoint>,
}

impl DaySeries {
    /// Build from an aligned, zero-based sequence, dropping missing entries.
    ///
    /// Non-finite values count as missing.
    pub fn from_aligned(values: &[Option<f64>]) -> Self {
        let points = values
            .iter()
            .enumerate()
            .filter_map(|(day, v)| match v {
                Some(value) if value.is_finite() => Some(DayPoint {
                    day: day as i64,
                    value: *value,
                }),
                _ => None,
            })
            .collect();
        Self { points }
    }

    /// Build from a dense slice where index `i` is day `i`.
    pub fn from_values(values: &[f64]) -> Self {
        let aligned: Vec<Option<f64>> = values.iter().copied().map(Some).collect();
        Self::from_aligned(&aligned)
    }

    /// Build from explicit points. Points that do not strictly increase in
    /// day, or carry a non-finite value, are skipped.
    pub fn from_points(points: impl IntoIterator<Item = DayPoint>) -> Self {
        let mut out: Vec<DayPoint> = Vec::new();
        for p in points {
            if !p.value.is_finite() {
                continue;
            }
            if out.last().is_some_and(|last| last.day >= p.day) {
                continue;
            }
            out.push(p);
        }
        Self { points: out }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[DayPoint] {
        &self.points
    }

    pub fn get(&self, index: usize) -> Option<&DayPoint> {
        self.points.get(index)
    }

    pub fn days(&self) -> impl Iterator<Item = i64> + '_ {
        self.points.iter().map(|p| p.day)
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn first_day(&self) -> Option<i64> {
        self.points.first().map(|p| p.day)
    }

    pub fn last_day(&self) -> Option<i64> {
        self.points.last().map(|p| p.day)
    }

    /// Latest value at or before `day`, or `None` if `day` precedes the series.
    pub fn value_at_or_before(&self, day: i64) -> Option<f64> {
        let idx = self.points.partition_point(|p| p.day <= day);
        idx.checked_sub(1).map(|i| self.points[i].value)
    }

    /// Multiply every value by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| DayPoint {
                    day: p.day,
                    value: p.value * factor,
                })
                .collect(),
        }
    }
}

/// One country's series after day-zero alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignedSeries {
    /// Row index into the raw (calendar) table where day 0 falls
    pub day_zero: usize,
    /// Zero-based values; trailing missing entries are trimmed
    pub values: Vec<Option<f64>>,
}

impl AlignedSeries {
    /// Number of non-missing observations.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Observed series with missing values dropped.
    pub fn observed(&self) -> DaySeries {
        DaySeries::from_aligned(&self.values)
    }
}

/// Country name → aligned series.
pub type AlignedTable = BTreeMap<String, AlignedSeries>;
