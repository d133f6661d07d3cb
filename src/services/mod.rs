//! Query services built on the storage layer

pub mod climate_service;
pub mod models;

pub use climate_service::{ClimateService, DateWindow};
pub use models::{
    PrecipitationEntry, StationSummary, TemperatureObservation, TemperatureRangeStats,
};
