//! Data source abstraction for the CSSE time series.
//!
//! Provides a unified trait for fetching the raw CSV text either from the
//! upstream repository over HTTP or from a directory of local copies.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

use super::{AcquisitionError, Dataset};
use crate::config::{defaults, DataConfig};

/// Trait abstracting where the raw CSVs come from.
///
/// The refresher holds one source for its whole lifetime and calls
/// [`fetch`](DataSource::fetch) once per dataset per refresh.
#[async_trait]
pub trait DataSource: Send + Sync + 'static {
    /// Fetch the raw CSV text for `dataset`.
    async fn fetch(&self, dataset: Dataset) -> Result<String, AcquisitionError>;

    /// Human-readable name for logging (e.g. "HTTP", "file").
    fn source_name(&self) -> &str;
}

/// Build the source the config asks for: local files when `data_dir` is
/// set, HTTP otherwise.
pub fn from_config(data: &DataConfig) -> Result<Box<dyn DataSource>, AcquisitionError> {
    match &data.data_dir {
        Some(dir) => Ok(Box::new(FileSource::new(dir.clone()))),
        None => Ok(Box::new(HttpSource::new(
            data.infected_url.clone(),
            data.deaths_url.clone(),
            Duration::from_secs(data.http_timeout_secs),
        )?)),
    }
}

// ============================================================================
// HTTP Source
// ============================================================================

/// Downloads the CSVs with a shared reqwest client.
#[derive(Clone)]
pub struct HttpSource {
    http: reqwest::Client,
    infected_url: String,
    deaths_url: String,
}

impl HttpSource {
    pub fn new(
        infected_url: String,
        deaths_url: String,
        timeout: Duration,
    ) -> Result<Self, AcquisitionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("epicast/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            infected_url,
            deaths_url,
        })
    }

    /// Source pointing at the public CSSE repository.
    pub fn csse() -> Result<Self, AcquisitionError> {
        Self::new(
            defaults::INFECTED_SOURCE_GLOBAL.to_string(),
            defaults::DEATHS_SOURCE_GLOBAL.to_string(),
            Duration::from_secs(defaults::HTTP_TIMEOUT_SECS),
        )
    }

    fn url(&self, dataset: Dataset) -> &str {
        match dataset {
            Dataset::Infected => &self.infected_url,
            Dataset::Deaths => &self.deaths_url,
        }
    }
}

#[async_trait]
impl DataSource for HttpSource {
    async fn fetch(&self, dataset: Dataset) -> Result<String, AcquisitionError> {
        let url = self.url(dataset);
        debug!(%dataset, url, "Downloading time series");

        let resp = self.http.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(AcquisitionError::ServerError {
                url: url.to_string(),
                status: resp.status(),
            });
        }
        let body = resp.text().await?;
        info!(%dataset, bytes = body.len(), "Downloaded time series");
        Ok(body)
    }

    fn source_name(&self) -> &str {
        "HTTP"
    }
}

// ============================================================================
// File Source
// ============================================================================

/// Reads `time_series_covid19_{confirmed,deaths}_global.csv` from a directory.
#[derive(Debug, Clone)]
pub struct FileSource {
    dir: PathBuf,
}

impl FileSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, dataset: Dataset) -> PathBuf {
        let name = match dataset {
            Dataset::Infected => defaults::INFECTED_FILE_NAME,
            Dataset::Deaths => defaults::DEATHS_FILE_NAME,
        };
        self.dir.join(name)
    }
}

#[async_trait]
impl DataSource for FileSource {
    async fn fetch(&self, dataset: Dataset) -> Result<String, AcquisitionError> {
        let path = self.path(dataset);
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| AcquisitionError::Io {
                path: path.clone(),
                source,
            })?;
        debug!(%dataset, path = %path.display(), bytes = text.len(), "Read time series");
        Ok(text)
    }

    fn source_name(&self) -> &str {
        "file"
    }
}
