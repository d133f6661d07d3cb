//! Storage layer for the station/measurement dataset
//!
//! The dataset is read-only. [`ClimateStore`] is the contract the query
//! service depends on. Two implementations are provided:
//! - SQLite storage (the pre-loaded dataset, opened read-only)
//! - In-memory storage (embedding and tests)

pub mod memory_store;
pub mod models;
pub mod sqlite_store;

use crate::error::Result;
use async_trait::async_trait;

pub use memory_store::InMemoryClimateStore;
pub use models::{DatedValue, Measurement, MeasurementColumn, Station, TemperatureStats};
pub use sqlite_store::SqliteClimateStore;

/// Read access to stations and measurements
#[async_trait]
pub trait ClimateStore: Send + Sync {
    /// Greatest measurement date; fails with `EmptyDataset` when there are no rows
    async fn max_date(&self) -> Result<String>;

    /// All stations, in storage order
    async fn list_stations(&self) -> Result<Vec<Station>>;

    /// `(date, value)` rows with `start <= date [<= end]`, optionally for one station
    async fn measurements_in_range(
        &self,
        station: Option<&str>,
        start: &str,
        end: Option<&str>,
        column: MeasurementColumn,
    ) -> Result<Vec<DatedValue>>;

    /// Station with the most measurements; ties go to the smallest station code
    async fn most_active_station(&self) -> Result<String>;

    /// Min, max and average observed temperature with `start <= date [<= end]`
    async fn temperature_stats(&self, start: &str, end: Option<&str>)
        -> Result<TemperatureStats>;

    /// Whether the store answers a trivial query
    async fn health_check(&self) -> Result<bool>;
}
