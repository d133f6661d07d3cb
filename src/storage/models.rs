//! Record types for the station and measurement tables

use serde::{Deserialize, Serialize};

/// Table holding weather stations
pub const STATION_TABLE: &str = "station";

/// Table holding daily observations
pub const MEASUREMENT_TABLE: &str = "measurement";

/// Columns the station table must provide
pub const STATION_COLUMNS: [&str; 5] = ["station", "name", "latitude", "longitude", "elevation"];

/// Columns the measurement table must provide
pub const MEASUREMENT_COLUMNS: [&str; 4] = ["station", "date", "prcp", "tobs"];

/// A fixed weather-observation site
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Station {
    /// Unique station code (e.g., "USC00519281")
    pub station: String,
    /// Descriptive columns are nullable in the loaded dataset
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub elevation: Option<f64>,
}

/// A single day's observation at one station
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    /// Station code, not enforced against the station table
    pub station: String,
    /// Observation date as `YYYY-MM-DD`
    pub date: String,
    /// Precipitation amount, absent when not recorded
    pub prcp: Option<f64>,
    /// Observed temperature
    pub tobs: f64,
}

impl Measurement {
    pub fn new(station: &str, date: &str, prcp: Option<f64>, tobs: f64) -> Self {
        Self {
            station: station.to_string(),
            date: date.to_string(),
            prcp,
            tobs,
        }
    }

    /// Value of the requested column
    pub fn value(&self, column: MeasurementColumn) -> Option<f64> {
        match column {
            MeasurementColumn::Precipitation => self.prcp,
            MeasurementColumn::Temperature => Some(self.tobs),
        }
    }

    /// Whether the date lies in `[start, end]`, compared as ISO strings
    pub fn in_range(&self, start: &str, end: Option<&str>) -> bool {
        self.date.as_str() >= start && end.map_or(true, |end| self.date.as_str() <= end)
    }
}

/// Measurement column selectable in range queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasurementColumn {
    /// `prcp`
    Precipitation,
    /// `tobs`
    Temperature,
}

impl MeasurementColumn {
    /// Column name in the measurement table
    pub fn column_name(&self) -> &'static str {
        match self {
            MeasurementColumn::Precipitation => "prcp",
            MeasurementColumn::Temperature => "tobs",
        }
    }
}

/// One `(date, value)` row of a range query
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct DatedValue {
    pub date: String,
    pub value: Option<f64>,
}

/// Aggregates of observed temperature over a date range
///
/// All three are `None` when no row matched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemperatureStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub avg: Option<f64>,
}

impl TemperatureStats {
    /// Aggregate a sequence of observations
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;

        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }

        if count == 0 {
            return Self::default();
        }

        Self {
            min: Some(min),
            max: Some(max),
            avg: Some(sum / count as f64),
        }
    }
}
