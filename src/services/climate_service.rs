//! Query service over the climate dataset
//!
//! Each operation is a stateless read: it asks the injected store for the
//! current data and shapes the answer for the API. Nothing is cached.

use super::models::{
    PrecipitationEntry, StationSummary, TemperatureObservation, TemperatureRangeStats,
};
use crate::error::{ClimateError, Result};
use crate::storage::{ClimateStore, MeasurementColumn};
use chrono::{Days, NaiveDate};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Date format of the `date` column
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the trailing window used by the series queries
pub const TRAILING_WINDOW_DAYS: u64 = 365;

/// Inclusive `[start, end]` date window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateWindow {
    pub start: String,
    pub end: String,
}

impl DateWindow {
    /// Window of [`TRAILING_WINDOW_DAYS`] calendar days ending at `end`
    // The start day itself is included, so `2016-08-23` rows count for `2017-08-23`
    pub fn trailing_year(end: &str) -> Result<Self> {
        let end_date = NaiveDate::parse_from_str(end, DATE_FORMAT).map_err(|e| {
            ClimateError::invalid_data(format!("most recent date '{end}' is not YYYY-MM-DD: {e}"))
        })?;

        let start_date = end_date
            .checked_sub_days(Days::new(TRAILING_WINDOW_DAYS))
            .ok_or_else(|| {
                ClimateError::invalid_data(format!("cannot go back a year from '{end}'"))
            })?;

        Ok(Self {
            start: start_date.format(DATE_FORMAT).to_string(),
            end: end.to_string(),
        })
    }
}

/// Whether `value` is a calendar date in `YYYY-MM-DD` form
pub fn is_iso_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, DATE_FORMAT).is_ok()
}

/// The four dataset queries exposed by the API
#[derive(Clone)]
pub struct ClimateService {
    store: Arc<dyn ClimateStore>,
}

impl ClimateService {
    /// Create a service over the given store
    pub fn new(store: Arc<dyn ClimateStore>) -> Self {
        Self { store }
    }

    /// Store this service reads from
    pub fn store(&self) -> &Arc<dyn ClimateStore> {
        &self.store
    }

    /// Trailing-year window ending at the most recent measurement
    pub async fn latest_window(&self) -> Result<DateWindow> {
        let max_date = self.store.max_date().await?;
        DateWindow::trailing_year(&max_date)
    }

    /// Precipitation of every station over the trailing year
    #[instrument(skip(self))]
    pub async fn precipitation_series(&self) -> Result<Vec<PrecipitationEntry>> {
        let window = self.latest_window().await?;
        debug!("Precipitation window {} to {}", window.start, window.end);

        let rows = self
            .store
            .measurements_in_range(
                None,
                &window.start,
                Some(&window.end),
                MeasurementColumn::Precipitation,
            )
            .await?;

        Ok(rows.into_iter().map(PrecipitationEntry::from).collect())
    }

    /// Every station in the dataset
    #[instrument(skip(self))]
    pub async fn station_list(&self) -> Result<Vec<StationSummary>> {
        let stations = self.store.list_stations().await?;
        Ok(stations.into_iter().map(StationSummary::from).collect())
    }

    /// Temperatures of the most active station over the trailing year
    #[instrument(skip(self))]
    pub async fn most_active_station_temperature_series(
        &self,
    ) -> Result<Vec<TemperatureObservation>> {
        let window = self.latest_window().await?;
        let station = self.store.most_active_station().await?;
        debug!(
            "Temperature window {} to {} for station {}",
            window.start, window.end, station
        );

        let rows = self
            .store
            .measurements_in_range(
                Some(&station),
                &window.start,
                Some(&window.end),
                MeasurementColumn::Temperature,
            )
            .await?;

        Ok(rows.into_iter().map(TemperatureObservation::from).collect())
    }

    /// Temperature aggregates from `start` to `end` (or open-ended)
    ///
    /// The bounds are compared as stored strings without validation, so input
    /// that is not `YYYY-MM-DD` simply matches whatever sorts inside it.
    #[instrument(skip(self))]
    pub async fn temperature_range_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureRangeStats> {
        if !is_iso_date(start) || end.is_some_and(|end| !is_iso_date(end)) {
            debug!("Non-ISO range bounds {:?}..{:?} compared as raw strings", start, end);
        }

        let stats = self.store.temperature_stats(start, end).await?;
        Ok(TemperatureRangeStats::new(start, end, stats))
    }
}
