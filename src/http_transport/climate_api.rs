//! Dataset query endpoints
//!
//! Thin handlers mapping `/api/v1.0/*` routes onto [`ClimateService`]
//! operations and serializing their results.

use super::AppState;
use crate::error::Result;
use crate::services::{
    PrecipitationEntry, StationSummary, TemperatureObservation, TemperatureRangeStats,
};
use axum::{
    extract::{Path, State},
    response::Json,
};
use std::sync::Arc;
use tracing::debug;

/// Precipitation over the trailing year
pub async fn precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PrecipitationEntry>>> {
    let series = state.service.precipitation_series().await?;
    debug!("Returning {} precipitation entries", series.len());
    Ok(Json(series))
}

/// All stations
pub async fn stations(State(state): State<Arc<AppState>>) -> Result<Json<Vec<StationSummary>>> {
    Ok(Json(state.service.station_list().await?))
}

/// Temperature observations of the most active station over the trailing year
pub async fn tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureObservation>>> {
    let series = state
        .service
        .most_active_station_temperature_series()
        .await?;
    debug!("Returning {} temperature observations", series.len());
    Ok(Json(series))
}

/// Temperature statistics from `start` onwards
pub async fn temperature_from(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureRangeStats>> {
    Ok(Json(
        state.service.temperature_range_stats(&start, None).await?,
    ))
}

/// Temperature statistics between `start` and `end`
pub async fn temperature_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureRangeStats>> {
    Ok(Json(
        state
            .service
            .temperature_range_stats(&start, Some(&end))
            .await?,
    ))
}
