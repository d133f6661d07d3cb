//! Mock implementations for testing
//!
//! This module provides store doubles for exercising the service and HTTP
//! layers without a database.

use crate::error::{ClimateError, Result};
use crate::storage::{ClimateStore, DatedValue, MeasurementColumn, Station, TemperatureStats};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Store wrapper counting every storage call
pub struct CountingStore<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S: ClimateStore> CountingStore<S> {
    /// Wrap a store
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of storage calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl<S: ClimateStore> ClimateStore for CountingStore<S> {
    async fn max_date(&self) -> Result<String> {
        self.record();
        self.inner.max_date().await
    }

    async fn list_stations(&self) -> Result<Vec<Station>> {
        self.record();
        self.inner.list_stations().await
    }

    async fn measurements_in_range(
        &self,
        station: Option<&str>,
        start: &str,
        end: Option<&str>,
        column: MeasurementColumn,
    ) -> Result<Vec<DatedValue>> {
        self.record();
        self.inner
            .measurements_in_range(station, start, end, column)
            .await
    }

    async fn most_active_station(&self) -> Result<String> {
        self.record();
        self.inner.most_active_station().await
    }

    async fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats> {
        self.record();
        self.inner.temperature_stats(start, end).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.inner.health_check().await
    }
}

/// Store whose connection is always down
pub struct UnavailableStore;

impl UnavailableStore {
    fn error() -> ClimateError {
        ClimateError::storage_unavailable("mock storage is offline")
    }
}

#[async_trait]
impl ClimateStore for UnavailableStore {
    async fn max_date(&self) -> Result<String> {
        Err(Self::error())
    }

    async fn list_stations(&self) -> Result<Vec<Station>> {
        Err(Self::error())
    }

    async fn measurements_in_range(
        &self,
        _station: Option<&str>,
        _start: &str,
        _end: Option<&str>,
        _column: MeasurementColumn,
    ) -> Result<Vec<DatedValue>> {
        Err(Self::error())
    }

    async fn most_active_station(&self) -> Result<String> {
        Err(Self::error())
    }

    async fn temperature_stats(
        &self,
        _start: &str,
        _end: Option<&str>,
    ) -> Result<TemperatureStats> {
        Err(Self::error())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(false)
    }
}

/// Store whose queries fail inside the database
pub struct BrokenStore;

impl BrokenStore {
    fn error() -> ClimateError {
        ClimateError::database("mock disk I/O error")
    }
}

#[async_trait]
impl ClimateStore for BrokenStore {
    async fn max_date(&self) -> Result<String> {
        Err(Self::error())
    }

    async fn list_stations(&self) -> Result<Vec<Station>> {
        Err(Self::error())
    }

    async fn measurements_in_range(
        &self,
        _station: Option<&str>,
        _start: &str,
        _end: Option<&str>,
        _column: MeasurementColumn,
    ) -> Result<Vec<DatedValue>> {
        Err(Self::error())
    }

    async fn most_active_station(&self) -> Result<String> {
        Err(Self::error())
    }

    async fn temperature_stats(
        &self,
        _start: &str,
        _end: Option<&str>,
    ) -> Result<TemperatureStats> {
        Err(Self::error())
    }

    async fn health_check(&self) -> Result<bool> {
        Err(Self::error())
    }
}
