//! Simple in-memory climate storage
//!
//! Holds stations and measurements in insertion order and answers the same
//! queries as the SQLite store. Useful for embedding and tests.

use super::models::{DatedValue, Measurement, MeasurementColumn, Station, TemperatureStats};
use super::ClimateStore;
use crate::error::{ClimateError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::debug;

/// Immutable in-memory dataset
#[derive(Debug, Clone, Default)]
pub struct InMemoryClimateStore {
    stations: Vec<Station>,
    measurements: Vec<Measurement>,
}

impl InMemoryClimateStore {
    /// Create a store over the given records
    pub fn new(stations: Vec<Station>, measurements: Vec<Measurement>) -> Self {
        debug!(
            "Initializing in-memory climate store with {} stations and {} measurements",
            stations.len(),
            measurements.len()
        );
        Self {
            stations,
            measurements,
        }
    }
}

#[async_trait]
impl ClimateStore for InMemoryClimateStore {
    async fn max_date(&self) -> Result<String> {
        self.measurements
            .iter()
            .map(|m| m.date.as_str())
            .max()
            .map(str::to_string)
            .ok_or_else(|| ClimateError::empty_dataset("no measurements recorded"))
    }

    async fn list_stations(&self) -> Result<Vec<Station>> {
        Ok(self.stations.clone())
    }

    async fn measurements_in_range(
        &self,
        station: Option<&str>,
        start: &str,
        end: Option<&str>,
        column: MeasurementColumn,
    ) -> Result<Vec<DatedValue>> {
        Ok(self
            .measurements
            .iter()
            .filter(|m| m.in_range(start, end))
            .filter(|m| station.map_or(true, |s| m.station == s))
            .map(|m| DatedValue {
                date: m.date.clone(),
                value: m.value(column),
            })
            .collect())
    }

    async fn most_active_station(&self) -> Result<String> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for measurement in &self.measurements {
            *counts.entry(measurement.station.as_str()).or_default() += 1;
        }

        counts
            .into_iter()
            .max_by(|(a_station, a_count), (b_station, b_count)| {
                // Higher count wins, then the smaller station code
                a_count.cmp(b_count).then_with(|| b_station.cmp(a_station))
            })
            .map(|(station, _)| station.to_string())
            .ok_or_else(|| ClimateError::empty_dataset("no measurements to rank stations by"))
    }

    async fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats> {
        Ok(TemperatureStats::from_values(
            self.measurements
                .iter()
                .filter(|m| m.in_range(start, end))
                .map(|m| m.tobs),
        ))
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}
