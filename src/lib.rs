//! EPICAST: Epidemic Dashboard Service
//!
//! Downloads cumulative case and death counts, aligns every country on its
//! own "day zero" and serves plot-ready series plus a growth-decay forecast.
//!
//! ## Architecture
//!
//! - **Acquisition**: CSSE time-series CSVs (HTTP or local files) and the
//!   population table
//! - **Alignment**: per-country cut at the first day above the threshold
//! - **Forecast**: smoothed growth ratio decaying to 1.0, plus a
//!   currently-ill estimate
//! - **Snapshot**: immutable data set, swapped atomically by the refresher
//! - **API**: axum JSON endpoints under `/api/v2`

pub mod acquisition;
pub mod alignment;
pub mod api;
pub mod config;
pub mod forecast;
pub mod snapshot;
pub mod types;

// Re-export configuration
pub use config::DashboardConfig;

// Re-export the core model
pub use alignment::{align, align_with_report, AlignmentOptions, AlignmentReport, Exclusion};
pub use forecast::{create_forecast, ForecastError, ForecastParams, ForecastResult};

// Re-export commonly used types
pub use types::{
    AlignedSeries, AlignedTable, DayCount, DayPoint, DaySeries, PopulationRecord,
    PopulationTable, RawTable,
};

// Re-export the service layer
pub use acquisition::{AcquisitionError, DataSource, Dataset};
pub use snapshot::{build_snapshot, DataSnapshot, SnapshotStore};
