//! JSON response shapes produced by the query service

use crate::storage::{DatedValue, Station, TemperatureStats};
use serde::{Deserialize, Serialize};

/// `end_date` reported when a range has no upper bound
pub const OPEN_END_DATE: &str = "Present";

/// One precipitation reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationEntry {
    pub date: String,
    pub prcp: Option<f64>,
}

impl From<DatedValue> for PrecipitationEntry {
    fn from(row: DatedValue) -> Self {
        Self {
            date: row.date,
            prcp: row.value,
        }
    }
}

/// One temperature observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureObservation {
    pub date: String,
    pub tobs: Option<f64>,
}

impl From<DatedValue> for TemperatureObservation {
    fn from(row: DatedValue) -> Self {
        Self {
            date: row.date,
            tobs: row.value,
        }
    }
}

/// Station as listed by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StationSummary {
    pub station: String,
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

impl From<Station> for StationSummary {
    fn from(station: Station) -> Self {
        Self {
            station: station.station,
            name: station.name,
            latitude: station.latitude,
            longitude: station.longitude,
            elevation: station.elevation,
        }
    }
}

/// Temperature aggregates over a requested date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRangeStats {
    pub start_date: String,
    pub end_date: String,
    #[serde(rename = "TMIN")]
    pub tmin: Option<f64>,
    #[serde(rename = "TAVG")]
    pub tavg: Option<f64>,
    #[serde(rename = "TMAX")]
    pub tmax: Option<f64>,
}

impl TemperatureRangeStats {
    /// Build the response for `start[..end]`
    ///
    /// The labels are assigned in the aggregate's column order (min, max, avg):
    /// `TAVG` carries the maximum and `TMAX` the average.
    pub fn new(start: &str, end: Option<&str>, stats: TemperatureStats) -> Self {
        Self {
            start_date: start.to_string(),
            end_date: end.unwrap_or(OPEN_END_DATE).to_string(),
            tmin: stats.min,
            tavg: stats.max,
            tmax: stats.avg,
        }
    }
}
