//! SQLite client for the pre-loaded climate dataset
//!
//! Opens the database read-only through a `sqlx` pool and validates the
//! declared station/measurement schema before serving any query.

use super::models::{
    DatedValue, MeasurementColumn, Station, TemperatureStats, MEASUREMENT_COLUMNS,
    MEASUREMENT_TABLE, STATION_COLUMNS, STATION_TABLE,
};
use super::ClimateStore;
use crate::config::DatabaseConfig;
use crate::error::{ClimateError, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Read-only SQLite store shared by all requests
#[derive(Clone)]
pub struct SqliteClimateStore {
    pool: SqlitePool,
}

impl SqliteClimateStore {
    /// Open the dataset described by `config`
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Opening climate dataset at {}", config.url);

        let options = SqliteConnectOptions::from_str(&config.url)
            .map_err(|e| ClimateError::config(format!("Invalid database URL {}: {e}", config.url)))?
            .read_only(true)
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect_with(options)
            .await
            .map_err(|e| {
                ClimateError::storage_unavailable(format!("Failed to open {}: {e}", config.url))
            })?;

        Self::from_pool(pool, config.validate_schema).await
    }

    /// Wrap an existing pool
    pub async fn from_pool(pool: SqlitePool, validate_schema: bool) -> Result<Self> {
        let store = Self { pool };

        if validate_schema {
            store.validate_schema().await?;
        } else {
            warn!("Schema validation disabled");
        }

        Ok(store)
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close all pooled connections
    pub async fn close(&self) {
        self.pool.close().await;
        debug!("Climate dataset pool closed");
    }

    async fn validate_schema(&self) -> Result<()> {
        self.require_columns(STATION_TABLE, &STATION_COLUMNS).await?;
        self.require_columns(MEASUREMENT_TABLE, &MEASUREMENT_COLUMNS)
            .await?;
        info!("Dataset schema validated");
        Ok(())
    }

    async fn require_columns(&self, table: &str, required: &[&str]) -> Result<()> {
        let columns = sqlx::query_scalar::<_, String>("SELECT name FROM pragma_table_info(?1)")
            .bind(table)
            .fetch_all(&self.pool)
            .await?;

        if columns.is_empty() {
            return Err(ClimateError::schema(format!("Table '{table}' not found")));
        }

        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|column| !columns.iter().any(|c| c.eq_ignore_ascii_case(column)))
            .collect();

        if !missing.is_empty() {
            return Err(ClimateError::schema(format!(
                "Table '{table}' is missing columns: {}",
                missing.join(", ")
            )));
        }

        debug!("Table '{}' provides {:?}", table, required);
        Ok(())
    }
}

/// Append `date >= start [AND date <= end]` to a query ending in `WHERE `
fn push_date_filter<'a>(query: &mut QueryBuilder<'a, Sqlite>, start: &'a str, end: Option<&'a str>) {
    query.push("date >= ");
    query.push_bind(start);
    if let Some(end) = end {
        query.push(" AND date <= ");
        query.push_bind(end);
    }
}

#[async_trait]
impl ClimateStore for SqliteClimateStore {
    async fn max_date(&self) -> Result<String> {
        let max_date =
            sqlx::query_scalar::<_, Option<String>>("SELECT MAX(date) FROM measurement")
                .fetch_one(&self.pool)
                .await?;

        max_date.ok_or_else(|| ClimateError::empty_dataset("no measurements recorded"))
    }

    async fn list_stations(&self) -> Result<Vec<Station>> {
        let stations = sqlx::query_as::<_, Station>(
            r#"
            SELECT station,
                   name,
                   CAST(latitude AS REAL) AS latitude,
                   CAST(longitude AS REAL) AS longitude,
                   CAST(elevation AS REAL) AS elevation
            FROM station
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!("Loaded {} stations", stations.len());
        Ok(stations)
    }

    async fn measurements_in_range(
        &self,
        station: Option<&str>,
        start: &str,
        end: Option<&str>,
        column: MeasurementColumn,
    ) -> Result<Vec<DatedValue>> {
        let mut query = QueryBuilder::<Sqlite>::new("SELECT date, CAST(");
        query.push(column.column_name());
        query.push(" AS REAL) AS value FROM measurement WHERE ");
        push_date_filter(&mut query, start, end);
        if let Some(station) = station {
            query.push(" AND station = ");
            query.push_bind(station);
        }

        let rows = query
            .build_query_as::<DatedValue>()
            .fetch_all(&self.pool)
            .await?;

        debug!(
            "Range query on {} from {} to {:?} (station {:?}) returned {} rows",
            column.column_name(),
            start,
            end,
            station,
            rows.len()
        );
        Ok(rows)
    }

    async fn most_active_station(&self) -> Result<String> {
        let busiest = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT station, COUNT(*) AS total
            FROM measurement
            GROUP BY station
            ORDER BY total DESC, station ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        match busiest {
            Some((station, total)) => {
                debug!("Most active station {} with {} measurements", station, total);
                Ok(station)
            }
            None => Err(ClimateError::empty_dataset(
                "no measurements to rank stations by",
            )),
        }
    }

    async fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats> {
        let mut query = QueryBuilder::<Sqlite>::new(
            "SELECT CAST(MIN(tobs) AS REAL), CAST(MAX(tobs) AS REAL), CAST(AVG(tobs) AS REAL) \
             FROM measurement WHERE ",
        );
        push_date_filter(&mut query, start, end);

        let (min, max, avg) = query
            .build_query_as::<(Option<f64>, Option<f64>, Option<f64>)>()
            .fetch_one(&self.pool)
            .await?;

        Ok(TemperatureStats { min, max, avg })
    }

    async fn health_check(&self) -> Result<bool> {
        match sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&self.pool)
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("Storage health check failed: {}", e);
                Ok(false)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: [&str; 2] = [
        "CREATE TABLE station (id INTEGER PRIMARY KEY, station TEXT, name TEXT, latitude FLOAT, longitude FLOAT, elevation FLOAT)",
        "CREATE TABLE measurement (id INTEGER PRIMARY KEY, station TEXT, date TEXT, prcp FLOAT, tobs FLOAT)",
    ];

    async fn memory_pool() -> SqlitePool {
        // One connection: every new `:memory:` connection is a separate database
        SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap()
    }

    async fn seeded_store(rows: &[(&str, &str, Option<f64>, f64)]) -> SqliteClimateStore {
        let pool = memory_pool().await;
        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await.unwrap();
        }

        sqlx::query(
            "INSERT INTO station (station, name, latitude, longitude, elevation) VALUES \
             ('USC00519397', 'WAIKIKI 717.2, HI US', 21.2716, -157.8168, 3), \
             ('USC00519281', 'WAIHEE 837.5, HI US', 21.45167, -157.84889, 32.9)",
        )
        .execute(&pool)
        .await
        .unwrap();

        for &(station, date, prcp, tobs) in rows {
            sqlx::query("INSERT INTO measurement (station, date, prcp, tobs) VALUES (?1, ?2, ?3, ?4)")
                .bind(station)
                .bind(date)
                .bind(prcp)
                .bind(tobs)
                .execute(&pool)
                .await
                .unwrap();
        }

        SqliteClimateStore::from_pool(pool, true).await.unwrap()
    }

    #[tokio::test]
    async fn test_max_date_and_stats() {
        let store = seeded_store(&[
            ("USC00519397", "2017-08-22", Some(0.5), 79.0),
            ("USC00519397", "2017-08-23", Some(0.0), 81.0),
            ("USC00519281", "2017-08-20", None, 70.0),
        ])
        .await;

        assert_eq!(store.max_date().await.unwrap(), "2017-08-23");

        let stats = store
            .temperature_stats("2017-08-22", Some("2017-08-23"))
            .await
            .unwrap();
        assert_eq!(stats.min, Some(79.0));
        assert_eq!(stats.max, Some(81.0));
        assert_eq!(stats.avg, Some(80.0));
    }

    #[tokio::test]
    async fn test_stats_without_matches_are_null() {
        let store = seeded_store(&[("USC00519397", "2017-08-22", Some(0.5), 79.0)]).await;
        let stats = store.temperature_stats("2018-01-01", None).await.unwrap();
        assert_eq!(stats, TemperatureStats::default());
    }

    #[tokio::test]
    async fn test_range_filters_and_keeps_nulls() {
        let store = seeded_store(&[
            ("USC00519397", "2017-08-21", Some(0.1), 75.0),
            ("USC00519281", "2017-08-22", None, 76.0),
            ("USC00519397", "2017-08-22", Some(0.2), 77.0),
            ("USC00519397", "2017-08-24", Some(0.3), 78.0),
        ])
        .await;

        let rows = store
            .measurements_in_range(
                None,
                "2017-08-22",
                Some("2017-08-23"),
                MeasurementColumn::Precipitation,
            )
            .await
            .unwrap();
        assert_eq!(
            rows,
            vec![
                DatedValue {
                    date: "2017-08-22".to_string(),
                    value: None
                },
                DatedValue {
                    date: "2017-08-22".to_string(),
                    value: Some(0.2)
                },
            ]
        );

        let rows = store
            .measurements_in_range(
                Some("USC00519397"),
                "2017-08-22",
                None,
                MeasurementColumn::Temperature,
            )
            .await
            .unwrap();
        let temps: Vec<_> = rows.iter().map(|r| r.value).collect();
        assert_eq!(temps, vec![Some(77.0), Some(78.0)]);
    }

    #[tokio::test]
    async fn test_most_active_station_tie_goes_to_smallest_code() {
        let store = seeded_store(&[
            ("USC00519397", "2017-08-22", None, 70.0),
            ("USC00519281", "2017-08-22", None, 70.0),
        ])
        .await;
        assert_eq!(store.most_active_station().await.unwrap(), "USC00519281");
    }

    #[tokio::test]
    async fn test_empty_dataset() {
        let store = seeded_store(&[]).await;
        assert!(matches!(
            store.max_date().await,
            Err(ClimateError::EmptyDataset(_))
        ));
        assert!(matches!(
            store.most_active_station().await,
            Err(ClimateError::EmptyDataset(_))
        ));
        assert_eq!(store.list_stations().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_null_station_attributes_are_listed() {
        let store = seeded_store(&[]).await;
        sqlx::query(
            "INSERT INTO station (station, name, latitude) VALUES ('USC00517948', NULL, 21.3934)",
        )
        .execute(store.pool())
        .await
        .unwrap();

        let stations = store.list_stations().await.unwrap();
        let pearl_city = stations
            .iter()
            .find(|s| s.station == "USC00517948")
            .unwrap();
        assert_eq!(pearl_city.name, None);
        assert_eq!(pearl_city.latitude, Some(21.3934));
        assert_eq!(pearl_city.elevation, None);
    }

    #[tokio::test]
    async fn test_schema_mismatch_fails_fast() {
        let pool = memory_pool().await;
        sqlx::query("CREATE TABLE station (station TEXT, name TEXT)")
            .execute(&pool)
            .await
            .unwrap();

        let result = SqliteClimateStore::from_pool(pool, true).await;
        match result {
            Err(ClimateError::Schema(msg)) => assert!(msg.contains("latitude")),
            other => panic!("expected schema error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_missing_table_fails_fast() {
        let pool = memory_pool().await;
        let result = SqliteClimateStore::from_pool(pool, true).await;
        assert!(matches!(result, Err(ClimateError::Schema(_))));
    }
}
