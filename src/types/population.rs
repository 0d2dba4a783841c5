//! Country population lookup.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Population of a country, plus the map metadata the source table carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationRecord {
    pub country: String,
    pub population: f64,
    /// Inhabitants per km²
    pub density: Option<f64>,
    /// ISO 3166-1 alpha-3 code, used for choropleth maps
    pub iso3: Option<String>,
}

/// Read-only country → population table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationTable {
    records: BTreeMap<String, PopulationRecord>,
}

impl PopulationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a record, keyed by its country name.
    pub fn insert(&mut self, record: PopulationRecord) {
        self.records.insert(record.country.clone(), record);
    }

    pub fn get(&self, country: &str) -> Option<&PopulationRecord> {
        self.records.get(country)
    }

    pub fn population(&self, country: &str) -> Option<f64> {
        self.records.get(country).map(|r| r.population)
    }

    pub fn contains(&self, country: &str) -> bool {
        self.records.contains_key(country)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PopulationRecord> {
        self.records.values()
    }
}

impl FromIterator<PopulationRecord> for PopulationTable {
    fn from_iter<I: IntoIterator<Item = PopulationRecord>>(iter: I) -> Self {
        let mut table = Self::new();
        for record in iter {
            table.insert(record);
        }
        table
    }
}

impl FromIterator<(String, f64)> for PopulationTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        iter.into_iter()
            .map(|(country, population)| PopulationRecord {
                country,
                population,
                density: None,
                iso3: None,
            })
            .collect()
    }
}
