//! HTTP transport for the climate API
//!
//! This module provides the axum server exposing the dataset queries under
//! `/api/v1.0`, a route listing at `/` and a health check.

pub mod climate_api;

use crate::config::HttpConfig;
use crate::error::{ClimateError, ErrorReporter, Result};
use crate::services::ClimateService;
use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Prefix of the dataset query routes
pub const API_PREFIX: &str = "/api/v1.0";

/// Route listing served at `/`
pub const ROUTE_LISTING: &str = "Available Routes:<br/>\
/api/v1.0/precipitation<br/>\
/api/v1.0/stations<br/>\
/api/v1.0/tobs<br/>\
/api/v1.0/<start> and /api/v1.0/<start>/<end>";

/// Application state shared across all HTTP handlers
pub struct AppState {
    /// Query service over the shared store
    pub service: ClimateService,
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    timestamp: String,
    services: HealthServices,
}

#[derive(Debug, Serialize)]
struct HealthServices {
    storage: String,
}

/// HTTP transport server
pub struct HttpTransportServer {
    service: ClimateService,
    config: HttpConfig,
}

impl HttpTransportServer {
    /// Create new HTTP transport server with configuration
    pub fn new(service: ClimateService, config: HttpConfig) -> Self {
        Self { service, config }
    }

    /// Router with all endpoints
    pub fn router(&self) -> Router {
        create_router(self.service.clone(), self.config.enable_cors)
    }

    /// Start the HTTP server and run until Ctrl+C
    pub async fn start(&self) -> Result<()> {
        let address = self.config.bind_address();
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            ClimateError::config(format!("Failed to bind to {address}: {e}"))
        })?;

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(&self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local_addr = listener.local_addr()?;
        info!("🌐 Climate API listening on http://{}", local_addr);
        info!("📋 Route listing: http://{}/", local_addr);
        info!("🏥 Health check: http://{}/health", local_addr);
        if self.config.enable_cors {
            info!("CORS enabled (permissive)");
        }

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the application router over `service`
pub fn create_router(service: ClimateService, enable_cors: bool) -> Router {
    let state = Arc::new(AppState { service });

    let api_routes = Router::new()
        .route("/precipitation", get(climate_api::precipitation))
        .route("/stations", get(climate_api::stations))
        .route("/tobs", get(climate_api::tobs))
        .route("/:start", get(climate_api::temperature_from))
        .route("/:start/:end", get(climate_api::temperature_between));

    let app = Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check))
        .nest(API_PREFIX, api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Root handler
async fn root_handler() -> Html<&'static str> {
    Html(ROUTE_LISTING)
}

/// Health check endpoint
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    debug!("Health check requested");

    let storage_healthy = match state.service.store().health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            warn!("Health check failed: {}", e);
            false
        }
    };

    let response = HealthResponse {
        status: if storage_healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        services: HealthServices {
            storage: if storage_healthy {
                "healthy"
            } else {
                "unhealthy"
            }
            .to_string(),
        },
    };

    let status = if storage_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(response))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutting down...");
}

impl ClimateError {
    /// HTTP status reported for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClimateError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ClimateError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ClimateError {
    fn into_response(self) -> Response {
        crate::log_structured_error!(self, "http_transport", "handle_request");

        // Debug builds also report the severity
        (
            self.status_code(),
            Json(ErrorReporter::format_api_error(
                &self,
                cfg!(debug_assertions),
            )),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::UnavailableStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_unavailable_storage_is_503() {
        let app = create_router(ClimateService::new(Arc::new(UnavailableStore)), false);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1.0/stations")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_error_body_carries_code() {
        let response = ClimateError::empty_dataset("no measurements recorded").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"]["code"], 1101);
        assert_eq!(body["error"]["category"], "data");

        #[cfg(debug_assertions)]
        assert_eq!(body["error"]["severity"], "Warning");
    }

    #[tokio::test]
    async fn test_serve_returns_after_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = HttpTransportServer::new(
            ClimateService::new(Arc::new(UnavailableStore)),
            HttpConfig::default(),
        );

        server.serve(listener, async {}).await.unwrap();
    }

    #[tokio::test]
    async fn test_start_reports_bind_failure() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let config = HttpConfig {
            host: "127.0.0.1".to_string(),
            port: taken.local_addr().unwrap().port(),
            enable_cors: false,
        };
        let server =
            HttpTransportServer::new(ClimateService::new(Arc::new(UnavailableStore)), config);

        let result = tokio::time::timeout(std::time::Duration::from_secs(5), server.start())
            .await
            .expect("bind failure should return immediately");
        assert!(matches!(result, Err(ClimateError::Config(_))));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ClimateError::empty_dataset("none").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ClimateError::invalid_input("bad").status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
