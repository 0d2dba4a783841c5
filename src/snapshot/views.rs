//! Plot-ready views over a snapshot.

use serde::Serialize;

use super::DataSnapshot;
use crate::config::defaults::PER_CAPITA_BASE;
use crate::types::{AlignedSeries, DayPoint, DaySeries};

/// One country's value on one calendar date, for the choropleth map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapEntry {
    pub country: String,
    pub iso3: Option<String>,
    pub infected: f64,
    pub population: f64,
    /// Infected per 100 000 inhabitants
    pub per_capita: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapFrame {
    pub date_index: usize,
    pub date: chrono::NaiveDate,
    pub entries: Vec<MapEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MapError {
    #[error("date_index {index} out of range (0..{len})")]
    DateIndexOutOfRange { index: usize, len: usize },
    #[error("no dates in the source data")]
    NoDates,
}

impl DataSnapshot {
    fn series(
        &self,
        aligned: Option<&AlignedSeries>,
        country: &str,
        per_capita: bool,
    ) -> Option<DaySeries> {
        let observed = aligned?.observed();
        if !per_capita {
            return Some(observed);
        }
        let population = self.population.population(country)?;
        Some(observed.scaled(PER_CAPITA_BASE / population))
    }

    /// Aligned confirmed cases, optionally per 100 000 inhabitants.
    pub fn infected_series(&self, country: &str, per_capita: bool) -> Option<DaySeries> {
        self.series(self.infected.get(country), country, per_capita)
    }

    /// Aligned deaths, optionally per 100 000 inhabitants.
    pub fn deaths_series(&self, country: &str, per_capita: bool) -> Option<DaySeries> {
        self.series(self.deaths.get(country), country, per_capita)
    }

    /// Deaths per confirmed case on each aligned day where both are known.
    pub fn case_fatality_rate(&self, country: &str) -> Option<DaySeries> {
        let infected = self.infected.get(country)?;
        let deaths = self.deaths.get(country)?;
        let points = infected
            .values
            .iter()
            .zip(deaths.values.iter())
            .enumerate()
            .filter_map(|(day, pair)| match pair {
                (Some(i), Some(d)) if *i > 0.0 => Some(DayPoint {
                    day: day as i64,
                    value: d / i,
                }),
                _ => None,
            });
        Some(DaySeries::from_points(points))
    }

    /// Raw confirmed cases on calendar row `date_index` (latest when `None`),
    /// for countries with population data and a rounded count above zero.
    pub fn map_at(&self, date_index: Option<usize>) -> Result<MapFrame, MapError> {
        let len = self.infected_raw.row_count();
        if len == 0 {
            return Err(MapError::NoDates);
        }
        let index = date_index.unwrap_or(len - 1);
        let date = *self
            .infected_raw
            .dates
            .get(index)
            .ok_or(MapError::DateIndexOutOfRange { index, len })?;

        let entries = self
            .infected_raw
            .row(index)
            .filter_map(|(country, value)| {
                let infected = value.filter(|v| v.round() > 0.0)?;
                let record = self.population.get(country)?;
                Some(MapEntry {
                    country: country.to_string(),
                    iso3: record.iso3.clone(),
                    infected,
                    population: record.population,
                    per_capita: infected / record.population * PER_CAPITA_BASE,
                })
            })
            .collect();

        Ok(MapFrame {
            date_index: index,
            date,
            entries,
        })
    }
}
