//! CSSE global time-series CSV parser.
//!
//! Layout: `Province/State,Country/Region,Lat,Long,1/22/20,1/23/20,...`, one
//! row per reporting region, cumulative counts per calendar date. Regions are
//! summed per country after name normalization so the names match the
//! population table.

use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use super::AcquisitionError;
use crate::types::RawTable;

const PROVINCE_COLUMN: &str = "Province/State";
const COUNTRY_COLUMN: &str = "Country/Region";
/// Columns before the first date column
const LEADING_COLUMNS: usize = 4;

pub const HUBEI: &str = "China - Hubei";
pub const CHINA_OTHERS: &str = "China - Others";

/// CSSE names that differ from the population table.
const COUNTRY_RENAMES: &[(&str, &str)] = &[
    ("Congo (Brazzaville)", "Congo"),
    ("Congo (Kinshasa)", "Congo"),
    ("Bahamas, The", "Bahamas"),
    ("Cote d'Ivoire", "Côte d'Ivoire"),
    ("Gambia, The", "Gambia"),
    ("US", "United States of America"),
    ("Korea, South", "South Korea"),
    ("Taiwan*", "Taiwan"),
    ("North Macedonia", "Macedonia"),
];

/// Provinces reported as countries of their own.
const SEPARATE_PROVINCES: &[&str] = &["Greenland"];

/// Map a CSSE region onto the country name used everywhere else.
pub fn normalize_country(province: &str, country: &str) -> String {
    if SEPARATE_PROVINCES.contains(&province) {
        return province.to_string();
    }
    COUNTRY_RENAMES
        .iter()
        .find(|(from, _)| *from == country)
        .map(|(_, to)| (*to).to_string())
        .unwrap_or_else(|| country.to_string())
}

/// Parse a CSSE date header such as `3/15/20`.
fn parse_date(header: &str) -> Option<NaiveDate> {
    let header = header.trim();
    NaiveDate::parse_from_str(header, "%m/%d/%y")
        .or_else(|_| NaiveDate::parse_from_str(header, "%m/%d/%Y"))
        .ok()
}

/// Cumulative count cell. Empty or unparsable cells are missing.
fn parse_count(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn column(header: &StringRecord, name: &'static str) -> Result<usize, AcquisitionError> {
    header
        .iter()
        .position(|h| h == name)
        .ok_or(AcquisitionError::MissingColumn(name))
}

/// Parse a CSSE global time-series CSV into a per-country raw table.
///
/// Hubei is also emitted as `China - Hubei`, and `China - Others` is China
/// minus Hubei.
pub fn parse_global_csv(text: &str) -> Result<RawTable, AcquisitionError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(AcquisitionError::Empty);
    }
    let province_idx = column(&header, PROVINCE_COLUMN)?;
    let country_idx = column(&header, COUNTRY_COLUMN)?;

    let dates = header
        .iter()
        .skip(LEADING_COLUMNS)
        .map(|h| parse_date(h).ok_or_else(|| AcquisitionError::InvalidDate(h.to_string())))
        .collect::<Result<Vec<_>, _>>()?;

    let mut table = RawTable::new(dates);
    let mut region_count = 0usize;
    let mut missing_cells = 0usize;

    for record in reader.records() {
        let record = record?;
        let province = record.get(province_idx).unwrap_or("");
        let country = record.get(country_idx).unwrap_or("");
        if country.is_empty() {
            continue;
        }

        let values: Vec<Option<f64>> = (0..table.row_count())
            .map(|i| record.get(LEADING_COLUMNS + i).and_then(parse_count))
            .collect();
        missing_cells += values.iter().filter(|v| v.is_none()).count();

        table.accumulate(&normalize_country(province, country), &values);
        if province == "Hubei" {
            table.accumulate(HUBEI, &values);
        }
        region_count += 1;
    }

    if region_count == 0 {
        return Err(AcquisitionError::Empty);
    }

    if let (Some(china), Some(hubei)) = (table.column("China"), table.column(HUBEI)) {
        let others: Vec<Option<f64>> = china
            .iter()
            .zip(hubei.iter())
            .map(|(c, h)| match (c, h) {
                (Some(c), Some(h)) => Some(c - h),
                _ => None,
            })
            .collect();
        table.series.insert(CHINA_OTHERS.to_string(), others);
    }

    debug!(
        regions = region_count,
        countries = table.country_count(),
        dates = table.row_count(),
        missing_cells,
        "Parsed CSSE time series"
    );

    Ok(table)
}
