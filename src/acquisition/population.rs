//! World population table loader.
//!
//! Expects a CSV with at least `Country` and `Population` columns;
//! `PopulationDensity` and `ISO3` are picked up when present.

use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

use super::csse::{CHINA_OTHERS, HUBEI};
use super::AcquisitionError;
use crate::types::{PopulationRecord, PopulationTable};

/// Hubei province population
const HUBEI_POPULATION: f64 = 58_500_000.0;
/// Hubei province area (km²)
const HUBEI_AREA_KM2: f64 = 185_900.0;
/// Total area of China (km²)
const CHINA_AREA_KM2: f64 = 9_597_000.0;

/// UN names shortened to what the case data uses.
const COUNTRY_RENAMES: &[(&str, &str)] = &[
    ("Bolivia (Plurinational State of)", "Bolivia"),
    ("Brunei Darussalam", "Brunei"),
    ("Iran (Islamic Republic of)", "Iran"),
    ("Republic of Korea", "South Korea"),
    ("Republic of Moldova", "Moldova"),
    ("North Macedonia", "Macedonia"),
    ("Russian Federation", "Russia"),
    ("China, Taiwan Province of China", "Taiwan"),
    ("United Republic of Tanzania", "Tanzania"),
    ("Venezuela (Bolivarian Republic of)", "Venezuela"),
    ("Viet Nam", "Vietnam"),
];

fn simplify_name(name: &str) -> String {
    COUNTRY_RENAMES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| name.to_string())
}

/// One row of the population CSV. Unparsable numbers read as missing.
#[derive(Debug, Deserialize)]
struct PopulationRow {
    #[serde(rename = "Country")]
    country: String,
    #[serde(rename = "Population", deserialize_with = "csv::invalid_option")]
    population: Option<f64>,
    #[serde(rename = "PopulationDensity", default, deserialize_with = "csv::invalid_option")]
    density: Option<f64>,
    #[serde(rename = "ISO3", default)]
    iso3: Option<String>,
}

/// Parse the population CSV, then add the two China sub-regions.
pub fn parse_population_csv(text: &str) -> Result<PopulationTable, AcquisitionError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let header = reader.headers()?;
    for required in ["Country", "Population"] {
        if !header.iter().any(|h| h == required) {
            return Err(AcquisitionError::MissingColumn(required));
        }
    }

    let mut table = PopulationTable::new();
    let mut skipped = 0usize;

    for row in reader.deserialize::<PopulationRow>() {
        let row = row?;
        let Some(population) = row.population.filter(|p| p.is_finite() && *p > 0.0) else {
            skipped += 1;
            continue;
        };
        if row.country.is_empty() {
            skipped += 1;
            continue;
        }

        table.insert(PopulationRecord {
            country: simplify_name(&row.country),
            population,
            density: row.density.filter(|d| d.is_finite()),
            iso3: row.iso3.filter(|code| !code.is_empty()),
        });
    }

    if table.is_empty() {
        return Err(AcquisitionError::Empty);
    }
    add_china_regions(&mut table);

    debug!(countries = table.len(), skipped, "Parsed population table");
    Ok(table)
}

/// `China - Hubei` gets a fixed population; `China - Others` is the rest.
fn add_china_regions(table: &mut PopulationTable) {
    table.insert(PopulationRecord {
        country: HUBEI.to_string(),
        population: HUBEI_POPULATION,
        density: Some(HUBEI_POPULATION / HUBEI_AREA_KM2),
        iso3: None,
    });

    if let Some(china) = table.population("China") {
        let others = china - HUBEI_POPULATION;
        if others > 0.0 {
            table.insert(PopulationRecord {
                country: CHINA_OTHERS.to_string(),
                population: others,
                density: Some(others / (CHINA_AREA_KM2 - HUBEI_AREA_KM2)),
                iso3: None,
            });
        }
    }
}

/// Read and parse the population CSV at `path`.
pub fn load_population(path: &Path) -> Result<PopulationTable, AcquisitionError> {
    let text = std::fs::read_to_string(path).map_err(|source| AcquisitionError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_population_csv(&text)?;
    info!(path = %path.display(), countries = table.len(), "Loaded population table");
    Ok(table)
}
