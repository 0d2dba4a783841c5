//! Acquisition Pipeline Tests
//!
//! Local CSV files through `FileSource`, the CSSE parser, the population
//! loader and the snapshot refresh, the same path the service takes at
//! runtime.

mod common;

use std::sync::Arc;

use epicast::acquisition::{load_population, DataSource, Dataset, FileSource};
use epicast::alignment::{AlignmentOptions, Exclusion};
use epicast::config::defaults::{DEATHS_FILE_NAME, INFECTED_FILE_NAME};
use epicast::snapshot::{refresh_once, SnapshotStore};

fn write_fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(INFECTED_FILE_NAME), common::INFECTED_CSV).unwrap();
    std::fs::write(dir.path().join(DEATHS_FILE_NAME), common::DEATHS_CSV).unwrap();
    std::fs::write(dir.path().join("world_population.csv"), common::POPULATION_CSV).unwrap();
    dir
}

#[tokio::test]
async fn file_source_serves_both_datasets() {
    let dir = write_fixture_dir();
    let source = FileSource::new(dir.path());
    for dataset in Dataset::ALL {
        let text = source.fetch(dataset).await.unwrap();
        assert!(text.starts_with("Province/State,Country/Region"));
    }
}

#[tokio::test]
async fn refresh_from_files_builds_expected_snapshot() {
    let dir = write_fixture_dir();
    let population = Arc::new(load_population(&dir.path().join("world_population.csv")).unwrap());

    let snapshot = refresh_once(
        &FileSource::new(dir.path()),
        population,
        AlignmentOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(snapshot.countries().collect::<Vec<_>>(), vec!["Denmark", "Norway"]);
    assert_eq!(snapshot.excluded.get("Sweden"), Some(&Exclusion::MissingPopulation));
    assert_eq!(
        snapshot.excluded.get("Greenland"),
        Some(&Exclusion::NeverExceededThreshold)
    );
    assert_eq!(snapshot.infected["Denmark"].day_zero, 3);
    assert_eq!(snapshot.deaths["Denmark"].values[0], Some(0.0));
    assert_eq!(snapshot.infected_raw.row_count(), 10);
}

#[tokio::test]
async fn higher_threshold_excludes_short_histories() {
    let dir = write_fixture_dir();
    let options = AlignmentOptions {
        day_zero_threshold: 100,
        ..AlignmentOptions::default()
    };
    let snapshot = refresh_once(&FileSource::new(dir.path()), common::population(), options)
        .await
        .unwrap();

    // Norway passes 100 on 3/7: 130, 180, 240, 300 is only four days
    assert!(!snapshot.contains("Norway"));
    assert_eq!(
        snapshot.excluded.get("Norway"),
        Some(&Exclusion::InsufficientHistory { observations: 4 })
    );
}

#[tokio::test]
async fn missing_file_fails_refresh_and_keeps_store() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(INFECTED_FILE_NAME), common::INFECTED_CSV).unwrap();

    let store = SnapshotStore::with_snapshot(common::snapshot());
    let result = refresh_once(
        &FileSource::new(dir.path()),
        common::population(),
        AlignmentOptions::default(),
    )
    .await;
    assert!(result.is_err());
    assert!(store.is_loaded());
}

#[tokio::test]
async fn malformed_csv_fails_refresh() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(INFECTED_FILE_NAME), "not,a,csse,file\n1,2,3,4\n").unwrap();
    std::fs::write(dir.path().join(DEATHS_FILE_NAME), common::DEATHS_CSV).unwrap();

    let err = refresh_once(
        &FileSource::new(dir.path()),
        common::population(),
        AlignmentOptions::default(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Province/State"));
}

/// The shipped population table covers the names the CSSE parser emits.
#[test]
fn bundled_population_table_matches_case_data_names() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join(epicast::config::defaults::POPULATION_PATH);
    let table = load_population(&path).unwrap();
    assert!(table.len() > 180, "only {} countries", table.len());

    for name in [
        "United States of America",
        "South Korea",
        "Taiwan",
        "Macedonia",
        "Russia",
        "Iran",
        "Vietnam",
        "Congo",
        "Côte d'Ivoire",
        "Greenland",
        "China - Hubei",
        "China - Others",
    ] {
        assert!(table.contains(name), "missing population for {name}");
    }

    let normalized = epicast::acquisition::csse::normalize_country("", "Korea, South");
    assert!(table.contains(&normalized));
}
