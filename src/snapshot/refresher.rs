//! Timer-driven snapshot refresh.
//!
//! The refresher is the only writer of the [`SnapshotStore`]. A failed
//! refresh is logged and the previous snapshot stays in place.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::{build_snapshot, DataSnapshot, SnapshotStore};
use crate::acquisition::{parse_global_csv, AcquisitionError, DataSource, Dataset};
use crate::alignment::AlignmentOptions;
use crate::types::PopulationTable;

/// Fetch both datasets, parse them and build a snapshot.
pub async fn refresh_once(
    source: &dyn DataSource,
    population: Arc<PopulationTable>,
    options: AlignmentOptions,
) -> Result<DataSnapshot, AcquisitionError> {
    let (infected_csv, deaths_csv) = tokio::try_join!(
        source.fetch(Dataset::Infected),
        source.fetch(Dataset::Deaths)
    )?;
    let infected = parse_global_csv(&infected_csv)?;
    let deaths = parse_global_csv(&deaths_csv)?;
    Ok(build_snapshot(infected, &deaths, population, options))
}

/// Refresh immediately, then every `interval`, until `cancel` fires.
pub async fn run_refresher(
    store: Arc<SnapshotStore>,
    source: Arc<dyn DataSource>,
    population: Arc<PopulationTable>,
    options: AlignmentOptions,
    interval: Duration,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    info!(
        source = source.source_name(),
        interval_secs = interval.as_secs(),
        "[Refresher] Task starting"
    );

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut refreshes = 0u64;
    let mut failures = 0u64;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                info!(refreshes, failures, "[Refresher] Received shutdown signal");
                return Ok(());
            }
            _ = ticker.tick() => {
                let started = Instant::now();
                let result = tokio::select! {
                    _ = cancel.cancelled() => {
                        info!(refreshes, failures, "[Refresher] Shutdown during refresh");
                        return Ok(());
                    }
                    r = refresh_once(source.as_ref(), Arc::clone(&population), options) => r,
                };
                match result {
                    Ok(snapshot) => {
                        let countries = snapshot.infected.len();
                        store.swap(snapshot);
                        refreshes += 1;
                        info!(
                            countries,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "[Refresher] Snapshot published"
                        );
                    }
                    Err(e) => {
                        failures += 1;
                        warn!(
                            error = %e,
                            kept_previous = store.is_loaded(),
                            "[Refresher] Refresh failed"
                        );
                    }
                }
            }
        }
    }
}
