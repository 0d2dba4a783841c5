//! Case data acquisition
//!
//! Fetches the CSSE global time-series CSVs (over HTTP or from a local
//! directory) and parses them, together with the population table, into the
//! types the aligner consumes.

pub mod csse;
pub mod population;
mod source;

pub use csse::parse_global_csv;
pub use population::{load_population, parse_population_csv};
pub use source::{from_config, DataSource, FileSource, HttpSource};

use std::path::PathBuf;

/// The two cumulative series the dashboard needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Infected,
    Deaths,
}

impl Dataset {
    pub const ALL: [Dataset; 2] = [Dataset::Infected, Dataset::Deaths];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dataset::Infected => "infected",
            Dataset::Deaths => "deaths",
        }
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Acquisition errors
#[derive(Debug, thiserror::Error)]
pub enum AcquisitionError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned status {status}")]
    ServerError {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Missing column '{0}' in CSV header")]
    MissingColumn(&'static str),
    #[error("Invalid date column '{0}' in CSV header")]
    InvalidDate(String),
    #[error("CSV has no data rows")]
    Empty,
}
