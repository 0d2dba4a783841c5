//! Forecast engine errors.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ForecastError {
    #[error("observed series is empty")]
    EmptySeries,

    #[error("observed series has {got} points, at least {needed} are required")]
    InsufficientObservations { got: usize, needed: usize },

    #[error("forecast start index {index} is outside the observed series (length {len})")]
    AnchorOutOfRange { index: usize, len: usize },

    #[error("day of control {day_of_control} is not after the anchor day {anchor_day}")]
    DegenerateHorizon { day_of_control: i64, anchor_day: i64 },

    #[error("no defined growth ratio up to the anchor day {anchor_day}")]
    UndefinedGrowthRatio { anchor_day: i64 },

    #[error("projected count on day {day} exceeds the representable range")]
    ProjectionOverflow { day: i64 },

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}
