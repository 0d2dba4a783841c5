//! Growth-decay Forecast Engine
//!
//! Projects one country's cumulative case count forward:
//!
//! 1. **Anchor**: pick the observed point the forecast starts from
//!    (second-to-last by default).
//! 2. **Growth rate**: exponentially weighted average of day-over-day
//!    ratios, read at the anchor.
//! 3. **Decay**: the ratio relaxes exponentially toward 1.0, reaching it
//!    (nearly) on the day of control.
//! 4. **Compounding**: cumulative product of the ratios from the anchor value.
//! 5. **Being ill**: cumulative count minus the count `days_to_recover` days
//!    earlier.
//!
//! Every call is a pure function of its arguments.
//!
//! ## Usage
//!
//! ```ignore
//! let observed = aligned["Norway"].observed();
//! let result = create_forecast(&observed, 120, &ForecastParams::default())?;
//! assert_eq!(result.forecast[0].value, result.anchor_value as i64);
//! ```

pub mod decay;
mod errors;
pub mod growth;
pub mod ill;

pub use errors::ForecastError;

use serde::Serialize;
use tracing::debug;

use crate::config::defaults::{DEFAULT_DAYS_TO_RECOVER, DEFAULT_RATIO_AVG_DAYS};
use crate::types::{DayCount, DayPoint, DaySeries};

/// Minimum observed points: one ratio needs two values.
pub const MIN_OBSERVATIONS: usize = 2;

/// Longest accepted distance from the anchor to the day of control (days).
pub const MAX_HORIZON_DAYS: i64 = 3650;

/// Largest projected value that still truncates to an `i64` count.
const MAX_PROJECTED_COUNT: f64 = i64::MAX as f64;

/// Forecast tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastParams {
    /// Index into the observed points to anchor on. `None` selects the
    /// second-to-last point; any index is capped at `len - 2`.
    pub forecast_start: Option<usize>,
    /// Days from infection to recovery
    pub days_to_recover: usize,
    /// EWMA span for the initial growth ratio
    pub ratio_avg_days: usize,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            forecast_start: None,
            days_to_recover: DEFAULT_DAYS_TO_RECOVER,
            ratio_avg_days: DEFAULT_RATIO_AVG_DAYS,
        }
    }
}

/// The three plot segments plus the quantities they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Observed series as given
    pub observed: DaySeries,
    /// Projected cumulative counts, starting on the anchor day
    pub forecast: Vec<DayCount>,
    /// Estimated currently-ill counts over observed head + forecast
    pub ill_population: Vec<DayCount>,
    /// Smoothed growth ratio at the anchor
    pub initial_ratio: f64,
    pub anchor_day: i64,
    pub anchor_value: f64,
    /// Projected daily growth ratios, one per forecast step after the anchor
    pub growth_ratios: Vec<f64>,
}

impl ForecastResult {
    /// Multiply every segment by `factor`, e.g. to account for unrecorded cases.
    pub fn scaled(&self, factor: f64) -> Self {
        let scale = |counts: &[DayCount]| -> Vec<DayCount> {
            counts
                .iter()
                .map(|c| DayCount {
                    day: c.day,
                    value: to_count(c.value as f64 * factor),
                })
                .collect()
        };
        Self {
            observed: self.observed.scaled(factor),
            forecast: scale(&self.forecast),
            ill_population: scale(&self.ill_population),
            initial_ratio: self.initial_ratio,
            anchor_day: self.anchor_day,
            anchor_value: self.anchor_value * factor,
            growth_ratios: self.growth_ratios.clone(),
        }
    }
}

/// Resolve the anchor index for a series of `len` points.
pub fn resolve_anchor(len: usize, requested: Option<usize>) -> Result<usize, ForecastError> {
    if len == 0 {
        return Err(ForecastError::EmptySeries);
    }
    if len < MIN_OBSERVATIONS {
        return Err(ForecastError::InsufficientObservations {
            got: len,
            needed: MIN_OBSERVATIONS,
        });
    }
    let latest = len - 2;
    match requested {
        None => Ok(latest),
        Some(index) if index >= len => Err(ForecastError::AnchorOutOfRange { index, len }),
        Some(index) => Ok(index.min(latest)),
    }
}

/// Forecast `observed` until `day_of_control`, the day the growth ratio
/// should have decayed (close) to 1.0.
pub fn create_forecast(
    observed: &DaySeries,
    day_of_control: i64,
    params: &ForecastParams,
) -> Result<ForecastResult, ForecastError> {
    validate_params(params)?;
    let anchor = resolve_anchor(observed.len(), params.forecast_start)?;
    let anchor_point = observed.points()[anchor];
    let (anchor_day, anchor_value) = (anchor_point.day, anchor_point.value);

    let horizon = match day_of_control.checked_sub(anchor_day) {
        Some(h) if h > 0 => h,
        _ => {
            return Err(ForecastError::DegenerateHorizon {
                day_of_control,
                anchor_day,
            })
        }
    };
    if horizon > MAX_HORIZON_DAYS {
        return Err(ForecastError::InvalidParameter {
            name: "day_of_control",
            reason: format!(
                "{day_of_control} is {horizon} days after the anchor, at most {MAX_HORIZON_DAYS} allowed"
            ),
        });
    }

    let values: Vec<f64> = observed.values().collect();
    let smoothed = growth::ewma(&growth::growth_ratios(&values), params.ratio_avg_days);
    let initial_ratio = smoothed[anchor].ok_or(ForecastError::UndefinedGrowthRatio { anchor_day })?;

    let growth_ratios = decay::growth_rate_exp_decay(initial_ratio, horizon);

    let mut running = anchor_value;
    let mut projected = Vec::with_capacity(growth_ratios.len() + 1);
    projected.push(DayPoint {
        day: anchor_day,
        value: running,
    });
    for (step, ratio) in growth_ratios.iter().enumerate() {
        running *= ratio;
        let day = anchor_day + step as i64 + 1;
        if !running.is_finite() || running.abs() >= MAX_PROJECTED_COUNT {
            return Err(ForecastError::ProjectionOverflow { day });
        }
        projected.push(DayPoint {
            day,
            value: running,
        });
    }

    let combined = ill::combine(observed, anchor_day, &projected);
    let ill_population = ill::being_ill(&combined, params.days_to_recover as i64)
        .into_iter()
        .map(to_day_count)
        .collect();

    debug!(
        anchor_day,
        anchor_value,
        initial_ratio,
        horizon,
        steps = growth_ratios.len(),
        "Forecast computed"
    );

    Ok(ForecastResult {
        observed: observed.clone(),
        forecast: projected.into_iter().map(to_day_count).collect(),
        ill_population,
        initial_ratio,
        anchor_day,
        anchor_value,
        growth_ratios,
    })
}

fn validate_params(params: &ForecastParams) -> Result<(), ForecastError> {
    if params.days_to_recover == 0 {
        return Err(ForecastError::InvalidParameter {
            name: "days_to_recover",
            reason: "must be at least 1".to_string(),
        });
    }
    if params.ratio_avg_days == 0 {
        return Err(ForecastError::InvalidParameter {
            name: "ratio_avg_days",
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(())
}

/// Counts are whole people: truncate toward zero.
fn to_count(value: f64) -> i64 {
    value.trunc() as i64
}

fn to_day_count(point: DayPoint) -> DayCount {
    DayCount {
        day: point.day,
        value: to_count(point.value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> DaySeries {
        DaySeries::from_values(&[20.0, 25.0, 30.0, 42.0, 50.0, 65.0])
    }

    #[test]
    fn default_anchor_is_second_to_last() {
        assert_eq!(resolve_anchor(6, None), Ok(4));
        assert_eq!(resolve_anchor(2, None), Ok(0));
    }

    #[test]
    fn requested_anchor_is_capped() {
        assert_eq!(resolve_anchor(6, Some(5)), Ok(4));
        assert_eq!(resolve_anchor(6, Some(2)), Ok(2));
    }

    #[test]
    fn anchor_out_of_range_is_rejected() {
        assert_eq!(
            resolve_anchor(6, Some(6)),
            Err(ForecastError::AnchorOutOfRange { index: 6, len: 6 })
        );
    }

    #[test]
    fn empty_and_single_point_series_are_rejected() {
        assert_eq!(resolve_anchor(0, None), Err(ForecastError::EmptySeries));
        assert_eq!(
            resolve_anchor(1, None),
            Err(ForecastError::InsufficientObservations { got: 1, needed: 2 })
        );
    }

    #[test]
    fn forecast_starts_at_anchor_value() {
        let result = create_forecast(&scenario(), 15, &ForecastParams::default()).unwrap();
        assert_eq!(result.anchor_day, 4);
        assert_eq!(result.anchor_value, 50.0);
        assert_eq!(result.forecast[0], DayCount { day: 4, value: 50 });
    }

    #[test]
    fn scenario_lengths() {
        let result = create_forecast(&scenario(), 15, &ForecastParams::default()).unwrap();
        // horizon 11, tau 2.75, ceil(16.5) = 17 ratios, plus the anchor
        assert_eq!(result.growth_ratios.len(), 17);
        assert_eq!(result.forecast.len(), 18);
        assert_eq!(result.forecast.last().map(|c| c.day), Some(21));
        // days 0..=3 observed, then 4..=21 projected
        assert_eq!(result.ill_population.len(), 22);
    }

    #[test]
    fn initial_ratio_is_ewma_at_anchor() {
        let result = create_forecast(&scenario(), 15, &ForecastParams::default()).unwrap();
        let ratios = [25.0 / 20.0, 30.0 / 25.0, 42.0 / 30.0, 50.0 / 42.0];
        let mut num = 0.0;
        let mut den = 0.0;
        for (age, r) in ratios.iter().rev().enumerate() {
            let w = 0.6_f64.powi(age as i32);
            num += w * r;
            den += w;
        }
        assert!((result.initial_ratio - num / den).abs() < 1e-12);
    }

    #[test]
    fn degenerate_horizon_is_an_error() {
        let err = create_forecast(&scenario(), 4, &ForecastParams::default()).unwrap_err();
        assert_eq!(
            err,
            ForecastError::DegenerateHorizon {
                day_of_control: 4,
                anchor_day: 4
            }
        );
        assert!(create_forecast(&scenario(), -3, &ForecastParams::default()).is_err());
    }

    #[test]
    fn extreme_day_of_control_is_an_error_not_a_panic() {
        let params = ForecastParams::default();
        assert_eq!(
            create_forecast(&scenario(), i64::MIN, &params),
            Err(ForecastError::DegenerateHorizon {
                day_of_control: i64::MIN,
                anchor_day: 4
            })
        );
        assert!(matches!(
            create_forecast(&scenario(), i64::MAX, &params),
            Err(ForecastError::InvalidParameter { name: "day_of_control", .. })
        ));
        let slow = DaySeries::from_values(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        assert!(create_forecast(&slow, 4 + MAX_HORIZON_DAYS, &params).is_ok());
        assert!(create_forecast(&slow, 5 + MAX_HORIZON_DAYS, &params).is_err());
    }

    #[test]
    fn runaway_growth_is_reported() {
        let observed = DaySeries::from_values(&[1.0, 1e3, 1e6, 1e9, 1e12]);
        let err = create_forecast(&observed, 180, &ForecastParams::default()).unwrap_err();
        assert!(matches!(err, ForecastError::ProjectionOverflow { day } if day > 3));
    }

    #[test]
    fn undefined_ratios_up_to_anchor_is_an_error() {
        let observed = DaySeries::from_values(&[0.0, 0.0, 0.0]);
        let err = create_forecast(&observed, 30, &ForecastParams::default()).unwrap_err();
        assert_eq!(err, ForecastError::UndefinedGrowthRatio { anchor_day: 1 });
    }

    #[test]
    fn zero_denominator_does_not_poison_the_average() {
        let observed = DaySeries::from_values(&[0.0, 10.0, 12.0, 14.0, 16.0]);
        let result = create_forecast(&observed, 40, &ForecastParams::default()).unwrap();
        assert!(result.initial_ratio.is_finite());
        assert!(result.forecast.iter().all(|c| c.value >= 0));
    }

    #[test]
    fn zero_parameters_are_rejected() {
        let params = ForecastParams {
            days_to_recover: 0,
            ..ForecastParams::default()
        };
        assert!(matches!(
            create_forecast(&scenario(), 15, &params),
            Err(ForecastError::InvalidParameter { name: "days_to_recover", .. })
        ));
    }

    #[test]
    fn scaling_multiplies_every_segment() {
        let result = create_forecast(&scenario(), 15, &ForecastParams::default()).unwrap();
        let scaled = result.scaled(3.0);
        assert_eq!(scaled.forecast[0].value, 150);
        assert_eq!(scaled.observed.get(0).map(|p| p.value), Some(60.0));
        assert_eq!(scaled.ill_population[0].value, 60);
        assert_eq!(scaled.initial_ratio, result.initial_ratio);
    }
}
