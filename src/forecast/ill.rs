//! Currently-ill estimate: cumulative cases minus those old enough to have
//! recovered.
//!
//! Deaths are not subtracted. Death data exists in the snapshot but the
//! model deliberately leaves mortality out of this estimate.

use crate::types::{DayPoint, DaySeries};

/// Join the observed points before `anchor_day` with the projected points.
///
/// The projection starts on the anchor day itself, so that day appears once.
pub fn combine(observed: &DaySeries, anchor_day: i64, projected: &[DayPoint]) -> DaySeries {
    let head = observed.points().iter().copied().filter(|p| p.day < anchor_day);
    DaySeries::from_points(head.chain(projected.iter().copied()))
}

/// `ill(t) = combined(t) - combined(t - days_to_recover)`.
///
/// A lookup before the first day of `combined` is 0. A lookup that lands in
/// a gap between observed days uses the latest value before it.
pub fn being_ill(combined: &DaySeries, days_to_recover: i64) -> Vec<DayPoint> {
    combined
        .points()
        .iter()
        .map(|p| {
            let recovered = combined
                .value_at_or_before(p.day - days_to_recover)
                .unwrap_or(0.0);
            DayPoint {
                day: p.day,
                value: p.value - recovered,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_day_is_not_duplicated() {
        let observed = DaySeries::from_values(&[1.0, 2.0, 3.0, 4.0]);
        let projected = [
            DayPoint { day: 2, value: 3.0 },
            DayPoint { day: 3, value: 3.5 },
            DayPoint { day: 4, value: 3.8 },
        ];
        let combined = combine(&observed, 2, &projected);
        assert_eq!(combined.days().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
        assert_eq!(combined.get(3).map(|p| p.value), Some(3.5));
    }

    #[test]
    fn early_days_are_not_reduced() {
        let combined = DaySeries::from_values(&[10.0, 20.0, 30.0, 40.0, 50.0]);
        let ill = being_ill(&combined, 3);
        let values: Vec<f64> = ill.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![10.0, 20.0, 30.0, 30.0, 30.0]);
    }

    #[test]
    fn gap_lookup_uses_previous_value() {
        let combined = DaySeries::from_aligned(&[Some(10.0), None, Some(30.0), Some(40.0)]);
        let ill = being_ill(&combined, 2);
        // day 3 looks back to day 1, which is a gap → day 0's value
        assert_eq!(ill.last().map(|p| p.value), Some(30.0));
    }
}
