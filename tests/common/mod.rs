//! Common test utilities
//!
//! Sample dataset shared by the integration tests and a SQLite seeding
//! helper. Failing stores live in `climate_api::mock`.

#![allow(dead_code)]

use climate_api::config::DatabaseConfig;
use climate_api::storage::{InMemoryClimateStore, Measurement, Station};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const STATION_SCHEMA: &str = "CREATE TABLE station (
    id INTEGER PRIMARY KEY,
    station TEXT,
    name TEXT,
    latitude FLOAT,
    longitude FLOAT,
    elevation FLOAT
)";

pub const MEASUREMENT_SCHEMA: &str = "CREATE TABLE measurement (
    id INTEGER PRIMARY KEY,
    station TEXT,
    date TEXT,
    prcp FLOAT,
    tobs FLOAT
)";

fn station(code: &str, name: &str, latitude: f64, longitude: f64, elevation: f64) -> Station {
    Station {
        station: code.to_string(),
        name: Some(name.to_string()),
        latitude: Some(latitude),
        longitude: Some(longitude),
        elevation: Some(elevation),
    }
}

/// Three Oahu stations
pub fn sample_stations() -> Vec<Station> {
    vec![
        station("USC00519397", "WAIKIKI 717.2, HI US", 21.2716, -157.8168, 3.0),
        station("USC00519281", "WAIHEE 837.5, HI US", 21.45167, -157.84889, 32.9),
        station(
            "USC00516128",
            "MANOA LYON ARBO 785.2, HI US",
            21.3331,
            -157.8025,
            152.4,
        ),
    ]
}

/// Nine measurements ending on 2017-08-23
///
/// USC00519281 is the most active station (four rows, one of them just
/// before the trailing-year window). Only USC00519397 reports on
/// 2017-08-22 and 2017-08-23, with temperatures 79 and 81.
pub fn sample_measurements() -> Vec<Measurement> {
    vec![
        Measurement::new("USC00519281", "2016-08-22", Some(0.4), 76.0),
        Measurement::new("USC00519281", "2016-08-23", Some(1.79), 77.0),
        Measurement::new("USC00519397", "2016-08-23", Some(0.0), 81.0),
        Measurement::new("USC00519281", "2017-08-17", Some(0.01), 76.0),
        Measurement::new("USC00519281", "2017-08-18", Some(0.06), 79.0),
        Measurement::new("USC00516128", "2017-08-20", None, 78.0),
        Measurement::new("USC00516128", "2017-08-21", Some(0.56), 76.0),
        Measurement::new("USC00519397", "2017-08-22", Some(0.0), 79.0),
        Measurement::new("USC00519397", "2017-08-23", Some(0.0), 81.0),
    ]
}

/// In-memory store over the sample dataset
pub fn memory_store() -> InMemoryClimateStore {
    InMemoryClimateStore::new(sample_stations(), sample_measurements())
}

/// Create a SQLite file at `path` holding the given rows
pub async fn seed_database(path: &Path, stations: &[Station], measurements: &[Measurement]) {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("open seed database");

    sqlx::query(STATION_SCHEMA).execute(&pool).await.unwrap();
    sqlx::query(MEASUREMENT_SCHEMA).execute(&pool).await.unwrap();

    for s in stations {
        sqlx::query(
            "INSERT INTO station (station, name, latitude, longitude, elevation) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&s.station)
        .bind(&s.name)
        .bind(s.latitude)
        .bind(s.longitude)
        .bind(s.elevation)
        .execute(&pool)
        .await
        .unwrap();
    }

    for m in measurements {
        sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?, ?, ?, ?)")
            .bind(&m.station)
            .bind(&m.date)
            .bind(m.prcp)
            .bind(m.tobs)
            .execute(&pool)
            .await
            .unwrap();
    }

    pool.close().await;
}

/// Database configuration pointing at `path`
pub fn database_config(path: &Path) -> DatabaseConfig {
    DatabaseConfig {
        url: format!("sqlite://{}", path.display()),
        ..DatabaseConfig::default()
    }
}

/// Temporary SQLite file seeded with the sample dataset
pub struct TestDatabase {
    _dir: TempDir,
    pub path: PathBuf,
}

impl TestDatabase {
    pub async fn new() -> Self {
        Self::with_rows(&sample_stations(), &sample_measurements()).await
    }

    pub async fn with_rows(stations: &[Station], measurements: &[Measurement]) -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("hawaii.sqlite");
        seed_database(&path, stations, measurements).await;
        Self { _dir: dir, path }
    }

    pub fn config(&self) -> DatabaseConfig {
        database_config(&self.path)
    }
}
