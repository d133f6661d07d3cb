//! Read-only climate data API in Rust
//!
//! This crate serves a weather-station dataset (a `station` table and a
//! `measurement` table in SQLite) over a small JSON HTTP API.
//!
//! # Features
//!
//! - Trailing-year precipitation and temperature series
//! - Station listing
//! - Temperature min/max/average over arbitrary date ranges
//! - Pluggable storage behind the [`ClimateStore`] trait
//! - Layered configuration and structured logging

// Core modules
pub mod config;
pub mod error;
pub mod http_transport;
pub mod logging;
pub mod services;
pub mod storage;

// Test support modules - available for both unit tests and integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

// Re-export main types for convenience
pub use config::ServerConfig;
pub use error::{ClimateError, Result};
pub use services::ClimateService;
pub use storage::ClimateStore;
