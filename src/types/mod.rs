//! Shared data structures for the epidemic dashboard
//!
//! - `RawTable`: calendar-dated cumulative counts per country (acquisition output)
//! - `AlignedSeries` / `AlignedTable`: day-zero aligned series (aligner output)
//! - `DaySeries`: observed series with missing values dropped (forecast input)
//! - `PopulationTable`: country → population lookup

mod population;
mod series;
mod table;

pub use population::*;
pub use series::*;
pub use table::*;
